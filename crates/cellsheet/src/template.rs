//! Starting text for new snippets.

/// Content of a snippet created from scratch: one color setting and a body
/// that declares its variable.
pub const DEFAULT_TEMPLATE: &str = "/* @settings\n\
name: New Section\n\
id: new-section\n\
settings:\n    \
- \n        \
id: my-color\n        \
title: My Color\n        \
type: variable-color\n        \
default: '#ff0000'\n\
*/\n\
\n\
body {\n    \
/* Use your variables here */\n    \
--my-color: #ff0000;\n\
}\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract_config;
    use crate::model::SettingType;

    #[test]
    fn test_template_layout() {
        assert!(DEFAULT_TEMPLATE.starts_with("/* @settings\nname: New Section\n"));
        assert!(DEFAULT_TEMPLATE.contains("settings:\n    - \n        id: my-color\n"));
        assert!(DEFAULT_TEMPLATE.ends_with("body {\n    /* Use your variables here */\n    --my-color: #ff0000;\n}\n"));
    }

    #[test]
    fn test_template_extracts() {
        let config = extract_config(DEFAULT_TEMPLATE).unwrap();
        assert_eq!(config.id, "new-section");
        assert_eq!(config.name.as_deref(), Some("New Section"));
        assert_eq!(config.settings.len(), 1);
        assert_eq!(config.settings[0].setting_type(), SettingType::VariableColor);
        assert!(config.global_css.starts_with("body {"));
    }
}
