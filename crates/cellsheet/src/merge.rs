//! Writing a settings config back into snippet text.
//!
//! The output is the `@settings` block (the encoded schema, without any
//! derived CSS), a blank line, then the body: the formatted global CSS
//! followed by one fragment per setting with CSS, depth-first, each scoped,
//! re-indented and wrapped in the config's [`BlockFormat`] markers.
//!
//! Scoping is idempotent, so a merged document extracts and merges again to
//! the same text.

use cellsheet_scope::{format_block, scope_class_for, scope_css};

use crate::error::MergeError;
use crate::extract::settings_block_range;
use crate::model::{BlockFormat, Setting, SettingsConfig};
use crate::schema::encode_config;

/// Fewest asterisks a separator line may have and still be recognised.
pub const MIN_SEPARATOR_STARS: usize = 20;

/// Asterisks in an emitted separator line unless configured otherwise.
pub const DEFAULT_SEPARATOR_WIDTH: usize = 36;

/// Which class scopes a setting's fragment in the cell format.
///
/// Asterisk fragments are always scoped with `.{setting.id}`: extraction
/// attributes them by that token alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScopeStrategy {
    /// `.{config.id}` for every fragment.
    #[default]
    Namespace,
    /// `.{setting.id}` for each setting's own fragment.
    Setting,
}

/// Options for [`merge_config_with`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    pub scope: ScopeStrategy,
    /// Asterisks per separator line; values below [`MIN_SEPARATOR_STARS`] are raised to it.
    pub separator_width: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            scope: ScopeStrategy::default(),
            separator_width: DEFAULT_SEPARATOR_WIDTH,
        }
    }
}

impl MergeOptions {
    fn separator(&self) -> String {
        format!("/{}/", "*".repeat(self.separator_width.max(MIN_SEPARATOR_STARS)))
    }

    fn scope_class(&self, config: &SettingsConfig, setting: &Setting) -> String {
        match self.scope {
            ScopeStrategy::Namespace => config.scope_class(),
            ScopeStrategy::Setting => scope_class_for(&setting.id),
        }
    }
}

/// Renders `config` as snippet text with default options.
pub fn merge_config(config: &SettingsConfig) -> Result<String, MergeError> {
    merge_config_with(config, &MergeOptions::default())
}

/// Renders `config` as snippet text.
pub fn merge_config_with(
    config: &SettingsConfig,
    options: &MergeOptions,
) -> Result<String, MergeError> {
    let block = settings_block(config)?;
    let body = render_body(config, options);
    if body.is_empty() {
        Ok(format!("{}\n", block))
    } else {
        Ok(format!("{}\n\n{}\n", block, body))
    }
}

/// Replaces the settings block and body of `original` with `config`.
///
/// Text before the original settings block (a license comment, say) is kept.
pub fn update_config(original: &str, config: &SettingsConfig) -> Result<String, MergeError> {
    update_config_with(original, config, &MergeOptions::default())
}

/// [`update_config`] with explicit options.
pub fn update_config_with(
    original: &str,
    config: &SettingsConfig,
    options: &MergeOptions,
) -> Result<String, MergeError> {
    let merged = merge_config_with(config, options)?;
    match settings_block_range(original) {
        Some(range) if range.start > 0 => {
            Ok(format!("{}\n\n{}", original[..range.start].trim_end(), merged))
        }
        _ => Ok(merged),
    }
}

/// Scopes every selector after the settings block with `.{id}`.
///
/// The settings block, and anything before it, is left as is. Text without a
/// block is scoped entirely.
pub fn scope_document(text: &str, id: &str) -> String {
    let start = settings_block_range(text).map_or(0, |range| range.end);
    let class = scope_class_for(id);
    format!("{}{}", &text[..start], scope_css(&text[start..], &class))
}

fn settings_block(config: &SettingsConfig) -> Result<String, MergeError> {
    let yaml = serde_yaml::to_string(&encode_config(config))?;
    if yaml.contains("*/") {
        tracing::warn!(id = %config.id, "refusing to write settings containing '*/'");
        return Err(MergeError::CommentTerminator);
    }
    Ok(format!("/* @settings\n{}\n*/", yaml.trim_end()))
}

fn render_body(config: &SettingsConfig, options: &MergeOptions) -> String {
    let mut parts = Vec::new();

    let global = config.global_css.trim();
    if !global.is_empty() {
        parts.push(format_block(global));
    }

    let format = config.effective_format();
    for setting in config.iter_settings() {
        let Some(css) = setting.css_fragment() else {
            continue;
        };
        let class = match format {
            BlockFormat::Cell => options.scope_class(config, setting),
            BlockFormat::Asterisk => scope_class_for(&setting.id),
        };
        let formatted = format_block(&scope_css(css, &class));
        parts.push(match format {
            BlockFormat::Cell => cell_fragment(setting, &formatted),
            BlockFormat::Asterisk => asterisk_fragment(setting, &formatted, options),
        });
    }

    parts.join("\n\n")
}

fn cell_fragment(setting: &Setting, css: &str) -> String {
    if !is_cell_id(&setting.id) {
        tracing::warn!(setting = %setting.id, "id cannot be read back from a cell marker");
    }
    format!("/* @cell: {} */\n{}\n/* @cell-end */", setting.id, css)
}

fn asterisk_fragment(setting: &Setting, css: &str, options: &MergeOptions) -> String {
    let separator = options.separator();
    let title = setting
        .display_title()
        .replace("*/", "* /")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    format!("{sep}\n/* {} */\n{sep}\n{}", title, css, sep = separator)
}

fn is_cell_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_config;
    use crate::model::SettingType;

    fn color_config() -> SettingsConfig {
        let mut config = SettingsConfig::new("test").with_name("Test");
        config.settings.push(
            Setting::new(SettingType::VariableColor, "my-color")
                .with_title("My Color")
                .with_css(".my-color { color: red; }"),
        );
        config
    }

    #[test]
    fn test_settings_block_shape() {
        let text = merge_config(&SettingsConfig::new("empty")).unwrap();
        assert_eq!(text, "/* @settings\nid: empty\nsettings: []\n*/\n");
    }

    #[test]
    fn test_cell_fragment_is_scoped_with_namespace() {
        let text = merge_config(&color_config()).unwrap();
        assert!(text.contains(
            "/* @cell: my-color */\n.test .my-color { color: red; }\n/* @cell-end */"
        ));
        assert!(!text.contains("css:"));
    }

    #[test]
    fn test_setting_scope_strategy() {
        let options = MergeOptions {
            scope: ScopeStrategy::Setting,
            ..MergeOptions::default()
        };
        let mut config = color_config();
        config.settings[0].css = Some("body { --my-color: red; }".into());
        let text = merge_config_with(&config, &options).unwrap();
        assert!(text.contains(".my-color body { --my-color: red; }"));
    }

    #[test]
    fn test_global_css_comes_first_and_is_formatted() {
        let mut config = color_config();
        config.global_css = "body {\nmargin: 0;\n}".into();
        let text = merge_config(&config).unwrap();
        let global = text.find("body {\n    margin: 0;\n}").unwrap();
        let cell = text.find("/* @cell:").unwrap();
        assert!(global < cell);
    }

    #[test]
    fn test_global_css_is_not_scoped() {
        let mut config = SettingsConfig::new("test");
        config.global_css = ".a { b: c; }".into();
        let text = merge_config(&config).unwrap();
        assert!(text.ends_with("*/\n\n.a { b: c; }\n"));
    }

    #[test]
    fn test_asterisk_fragment() {
        let mut config = color_config();
        config.format = Some(BlockFormat::Asterisk);
        let text = merge_config(&config).unwrap();
        let sep = format!("/{}/", "*".repeat(DEFAULT_SEPARATOR_WIDTH));
        assert!(text.contains(&format!(
            "{sep}\n/* My Color */\n{sep}\n.my-color {{ color: red; }}"
        )));
    }

    #[test]
    fn test_asterisk_fragment_is_scoped_with_setting_id() {
        let mut config = color_config();
        config.format = Some(BlockFormat::Asterisk);
        config.settings[0].title = "Wide  Layout".into();
        config.settings[0].css = Some("body { max-width: none; }".into());

        let text = merge_config(&config).unwrap();
        assert!(text.contains(".my-color body { max-width: none; }"));

        let back = extract_config(&text).unwrap();
        assert_eq!(
            back.settings[0].css.as_deref(),
            Some(".my-color body { max-width: none; }")
        );
        assert_eq!(back.global_css, "");
        assert_eq!(merge_config(&back).unwrap(), text);
    }

    #[test]
    fn test_separator_width_is_clamped() {
        let mut config = color_config();
        config.format = Some(BlockFormat::Asterisk);
        let options = MergeOptions {
            separator_width: 3,
            ..MergeOptions::default()
        };
        let text = merge_config_with(&config, &options).unwrap();
        assert!(text.contains(&format!("/{}/\n", "*".repeat(MIN_SEPARATOR_STARS))));
    }

    #[test]
    fn test_blank_css_is_skipped() {
        let mut config = color_config();
        config.settings[0].css = Some("   ".into());
        let text = merge_config(&config).unwrap();
        assert!(!text.contains("@cell"));
    }

    #[test]
    fn test_nested_fragments_follow_parent() {
        let mut parent = Setting::new(SettingType::Heading, "group").with_css(".group {}");
        parent
            .settings
            .push(Setting::new(SettingType::ClassToggle, "inner").with_css(".inner {}"));
        let mut config = SettingsConfig::new("n");
        config.settings.push(parent);
        config
            .settings
            .push(Setting::new(SettingType::ClassToggle, "after").with_css(".after {}"));

        let text = merge_config(&config).unwrap();
        let group = text.find("@cell: group").unwrap();
        let inner = text.find("@cell: inner").unwrap();
        let after = text.find("@cell: after").unwrap();
        assert!(group < inner && inner < after);
    }

    #[test]
    fn test_comment_terminator_is_rejected() {
        let mut config = color_config();
        config.settings[0].title = "evil */ title".into();
        assert!(matches!(
            merge_config(&config),
            Err(MergeError::CommentTerminator)
        ));
    }

    #[test]
    fn test_merge_then_extract() {
        let text = merge_config(&color_config()).unwrap();
        let config = extract_config(&text).unwrap();
        assert_eq!(config.id, "test");
        assert_eq!(
            config.settings[0].css.as_deref(),
            Some(".test .my-color { color: red; }")
        );
        assert_eq!(config.global_css, "");
        assert_eq!(merge_config(&config).unwrap(), text);
    }

    #[test]
    fn test_update_config_keeps_leading_text() {
        let original = "/* (c) someone */\n/* @settings\nid: old\n*/\n.old {}";
        let text = update_config(original, &color_config()).unwrap();
        assert!(text.starts_with("/* (c) someone */\n\n/* @settings\n"));
        assert!(!text.contains(".old"));
    }

    #[test]
    fn test_scope_document() {
        let text = "/* @settings\nid: x\n*/\n\n.a { b: c; }\n@media print { .d { e: f; } }";
        assert_eq!(
            scope_document(text, "x"),
            "/* @settings\nid: x\n*/\n\n.x .a { b: c; }\n@media print { .x .d { e: f; } }"
        );
        assert_eq!(scope_document(".a {}", "x"), ".x .a {}");
    }
}
