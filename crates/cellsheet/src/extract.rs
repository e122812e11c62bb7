//! Reading a settings config out of snippet text.
//!
//! A snippet is a `/* @settings ... */` comment holding YAML, followed by a
//! CSS body. The body is split into per-setting fragments using one of two
//! conventions (see [`BlockFormat`]):
//!
//! - **cell**: `/* @cell: <id> */ ... /* @cell-end */` spans, keyed by id.
//! - **asterisk**: a title comment between two lines of asterisks, followed
//!   by the fragment. The fragment is attributed to the first non-heading
//!   setting whose id appears in it as a `.id` or `#id` token. The header
//!   title plays no part, and a fragment naming no setting stays global.
//!
//! Whatever is not attributed becomes the config's `global_css`.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_yaml::Value;

use crate::error::ExtractError;
use crate::model::{find_first_mut, BlockFormat, Setting, SettingsConfig};
use crate::schema::decode_config;

/// Tabs are not valid YAML indentation; each one is replaced by this.
pub const TAB_REPLACEMENT: &str = "    ";

pub(crate) static SETTINGS_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\* @settings([\s\S]*?)\*/").expect("valid settings regex"));

static ASTERISK_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\*{20,}/\s*\n\s*/\*(.*?)\*/\s*\n\s*/\*{20,}/").expect("valid header regex")
});

static CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/\* @cell: ([\w-]+) \*/([\s\S]*?)/\* @cell-end \*/").expect("valid cell regex")
});

/// Extracts the config of `text`, or `None` when it has no usable settings block.
///
/// Callers usually fall back to [`SettingsConfig::fallback`].
pub fn extract_config(text: &str) -> Option<SettingsConfig> {
    try_extract_config(text).ok()
}

/// Extracts the config of `text`, telling a missing block from a broken one.
pub fn try_extract_config(text: &str) -> Result<SettingsConfig, ExtractError> {
    let block = SETTINGS_BLOCK
        .captures(text)
        .ok_or(ExtractError::MissingSchema)?;
    let (whole, yaml) = match (block.get(0), block.get(1)) {
        (Some(whole), Some(yaml)) => (whole, yaml.as_str()),
        _ => return Err(ExtractError::MissingSchema),
    };

    let mut config = parse_settings(yaml).map_err(|err| {
        tracing::warn!(error = %err, "ignoring unreadable @settings block");
        err
    })?;

    let body = text[whole.end()..].trim();
    let format = detect_format(body);
    tracing::debug!(id = %config.id, %format, "classified snippet body");

    config.global_css = match format {
        BlockFormat::Asterisk => split_asterisk(body, &mut config.settings),
        BlockFormat::Cell => split_cells(body, &mut config.settings),
    };
    config.format = Some(format);

    Ok(config)
}

/// Classifies a CSS body. Asterisk when it has at least one full asterisk
/// header, cell otherwise.
pub fn detect_format(body: &str) -> BlockFormat {
    if ASTERISK_HEADER.is_match(body) {
        BlockFormat::Asterisk
    } else {
        BlockFormat::Cell
    }
}

/// Range of the settings block in `text`, if any.
pub(crate) fn settings_block_range(text: &str) -> Option<std::ops::Range<usize>> {
    SETTINGS_BLOCK.find(text).map(|m| m.range())
}

fn parse_settings(yaml: &str) -> Result<SettingsConfig, ExtractError> {
    let yaml = yaml.replace('\t', TAB_REPLACEMENT);
    let value: Value = serde_yaml::from_str(&yaml)?;
    if value.is_null() {
        return Err(ExtractError::MalformedSchema {
            message: "empty @settings block".to_string(),
        });
    }
    Ok(decode_config(&value)?)
}

fn split_asterisk(body: &str, settings: &mut [Setting]) -> String {
    let headers: Vec<Captures<'_>> = ASTERISK_HEADER.captures_iter(body).collect();
    let mut global = Vec::new();

    let first_start = headers
        .first()
        .and_then(|caps| caps.get(0))
        .map_or(body.len(), |m| m.start());
    global.push(body[..first_start].trim());

    for (i, caps) in headers.iter().enumerate() {
        let (header, title) = match (caps.get(0), caps.get(1)) {
            (Some(header), Some(title)) => (header, title.as_str().trim()),
            _ => continue,
        };
        let end = headers
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(body.len(), |m| m.start());
        let content = body[header.end()..end].trim();

        match attribute_fragment(settings, content) {
            Some(setting) => {
                tracing::debug!(setting = %setting.id, title, "attributed fragment");
                append_css(setting, content);
            }
            None => {
                tracing::debug!(title, "fragment left in global css");
                global.push(body[header.start()..end].trim());
            }
        }
    }

    join_nonempty(&global)
}

/// Picks the owner of an asterisk fragment. Empty fragments stay global.
fn attribute_fragment<'a>(settings: &'a mut [Setting], content: &str) -> Option<&'a mut Setting> {
    if content.is_empty() {
        return None;
    }
    find_first_mut(settings, &mut |s: &Setting| {
        !s.is_heading() && mentions_id(content, &s.id)
    })
}

/// True when `content` has `.id` or `#id` as a whole token.
pub fn mentions_id(content: &str, id: &str) -> bool {
    if id.is_empty() {
        return false;
    }
    content.match_indices(id).any(|(at, _)| {
        let before = content[..at].chars().next_back();
        let after = content[at + id.len()..].chars().next();
        matches!(before, Some('.') | Some('#')) && !after.is_some_and(is_ident_char)
    })
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn split_cells(body: &str, settings: &mut [Setting]) -> String {
    let mut global = String::new();
    let mut copied = 0;

    for caps in CELL.captures_iter(body) {
        let (span, id, content) = match (caps.get(0), caps.get(1), caps.get(2)) {
            (Some(span), Some(id), Some(content)) => (span, id.as_str(), content.as_str().trim()),
            _ => continue,
        };

        match find_first_mut(settings, &mut |s: &Setting| s.id == id) {
            Some(setting) => {
                tracing::debug!(setting = %id, "attributed cell");
                append_css(setting, content);
                global.push_str(&body[copied..span.start()]);
                copied = span.end();
            }
            None => tracing::debug!(cell = %id, "cell names no setting, left in global css"),
        }
    }

    global.push_str(&body[copied..]);
    global.trim().to_string()
}

/// Sets the setting's css, keeping an earlier fragment ahead of this one.
fn append_css(setting: &mut Setting, content: &str) {
    setting.css = match setting.css_fragment() {
        Some(existing) if !content.is_empty() => Some(format!("{}\n\n{}", existing, content)),
        Some(existing) => Some(existing.to_string()),
        None => Some(content.to_string()),
    };
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n\n")
}
