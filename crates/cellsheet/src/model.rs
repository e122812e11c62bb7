//! Settings schema types.
//!
//! A [`SettingsConfig`] is the structured form of the `@settings` block of a
//! snippet, plus the CSS that extraction attributed to it. Settings form a
//! flat, ordered sequence: a `heading` owns the run of settings that follows
//! it up to the next heading.
//!
//! Each setting is a [`Setting`] holding the fields every type shares and a
//! [`SettingKind`] carrying the fields of its `type`. Keys the schema does not
//! know (localized titles such as `title.zh`, plugin-specific flags) are kept
//! verbatim in an `extra` side table and written back after the known keys.

use std::fmt;
use std::str::FromStr;

use serde_yaml::{Mapping, Number};

use crate::error::SchemaError;

/// The `type` discriminant of a setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingType {
    Heading,
    ClassToggle,
    ClassSelect,
    VariableText,
    VariableNumber,
    VariableNumberSlider,
    VariableSelect,
    VariableColor,
    InfoText,
}

impl SettingType {
    pub const ALL: [SettingType; 9] = [
        SettingType::Heading,
        SettingType::ClassToggle,
        SettingType::ClassSelect,
        SettingType::VariableText,
        SettingType::VariableNumber,
        SettingType::VariableNumberSlider,
        SettingType::VariableSelect,
        SettingType::VariableColor,
        SettingType::InfoText,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SettingType::Heading => "heading",
            SettingType::ClassToggle => "class-toggle",
            SettingType::ClassSelect => "class-select",
            SettingType::VariableText => "variable-text",
            SettingType::VariableNumber => "variable-number",
            SettingType::VariableNumberSlider => "variable-number-slider",
            SettingType::VariableSelect => "variable-select",
            SettingType::VariableColor => "variable-color",
            SettingType::InfoText => "info-text",
        }
    }

    /// True for the `variable-*` types, which drive a CSS custom property.
    pub fn is_variable(self) -> bool {
        self.as_str().starts_with("variable-")
    }
}

impl fmt::Display for SettingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SettingType {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SettingType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == s)
            .ok_or_else(|| SchemaError::new("type", format!("unknown setting type '{}'", s)))
    }
}

/// One entry of a select setting's `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectOption {
    /// A bare value, used as its own label.
    Value(String),
    /// A value with a display label.
    Labeled { label: String, value: String },
}

impl SelectOption {
    pub fn value(&self) -> &str {
        match self {
            SelectOption::Value(v) => v,
            SelectOption::Labeled { value, .. } => value,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            SelectOption::Value(v) => v,
            SelectOption::Labeled { label, .. } => label,
        }
    }
}

/// Numeric bounds shared by `variable-number` and `variable-number-slider`.
///
/// Numbers keep their YAML representation, so `16` stays an integer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberSpec {
    pub default: Option<Number>,
    pub min: Option<Number>,
    pub max: Option<Number>,
    pub step: Option<Number>,
}

/// Type-specific fields of a setting, one variant per `type` value.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingKind {
    Heading {
        level: u8,
        collapsed: Option<bool>,
    },
    ClassToggle {
        default: Option<bool>,
        add_command: Option<bool>,
    },
    ClassSelect {
        allow_empty: Option<bool>,
        default: Option<String>,
        options: Vec<SelectOption>,
    },
    VariableText {
        default: Option<String>,
        quotes: Option<bool>,
    },
    VariableNumber(NumberSpec),
    VariableNumberSlider {
        spec: NumberSpec,
        format: Option<String>,
    },
    VariableSelect {
        default: Option<String>,
        options: Vec<SelectOption>,
    },
    VariableColor {
        default: Option<String>,
        format: Option<String>,
        opacity: Option<bool>,
    },
    InfoText {
        markdown: Option<bool>,
    },
}

impl SettingKind {
    /// Fields a freshly added setting of type `ty` starts with.
    pub fn default_for(ty: SettingType) -> Self {
        match ty {
            SettingType::Heading => SettingKind::Heading {
                level: 3,
                collapsed: None,
            },
            SettingType::ClassToggle => SettingKind::ClassToggle {
                default: None,
                add_command: None,
            },
            SettingType::ClassSelect => SettingKind::ClassSelect {
                allow_empty: None,
                default: None,
                options: Vec::new(),
            },
            SettingType::VariableText => SettingKind::VariableText {
                default: None,
                quotes: None,
            },
            SettingType::VariableNumber => SettingKind::VariableNumber(NumberSpec {
                default: Some(Number::from(0i64)),
                ..NumberSpec::default()
            }),
            SettingType::VariableNumberSlider => SettingKind::VariableNumberSlider {
                spec: NumberSpec::default(),
                format: None,
            },
            SettingType::VariableSelect => SettingKind::VariableSelect {
                default: None,
                options: Vec::new(),
            },
            SettingType::VariableColor => SettingKind::VariableColor {
                default: Some("#000000".to_string()),
                format: Some("hex".to_string()),
                opacity: None,
            },
            SettingType::InfoText => SettingKind::InfoText { markdown: None },
        }
    }

    pub fn setting_type(&self) -> SettingType {
        match self {
            SettingKind::Heading { .. } => SettingType::Heading,
            SettingKind::ClassToggle { .. } => SettingType::ClassToggle,
            SettingKind::ClassSelect { .. } => SettingType::ClassSelect,
            SettingKind::VariableText { .. } => SettingType::VariableText,
            SettingKind::VariableNumber(_) => SettingType::VariableNumber,
            SettingKind::VariableNumberSlider { .. } => SettingType::VariableNumberSlider,
            SettingKind::VariableSelect { .. } => SettingType::VariableSelect,
            SettingKind::VariableColor { .. } => SettingType::VariableColor,
            SettingKind::InfoText { .. } => SettingType::InfoText,
        }
    }
}

/// A single entry of the settings sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    /// Unique id; also the token matched against CSS when attributing fragments.
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub kind: SettingKind,
    /// Raw, unscoped CSS owned by this setting. Never written to the YAML.
    pub css: Option<String>,
    /// Nested settings (`settings:` under a setting).
    pub settings: Vec<Setting>,
    /// Keys outside the schema, preserved in their original order.
    pub extra: Mapping,
}

impl Setting {
    /// Creates a setting of type `ty` with the defaults of a newly added entry.
    pub fn new(ty: SettingType, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: "New Setting".to_string(),
            description: Some(String::new()),
            kind: SettingKind::default_for(ty),
            css: None,
            settings: Vec::new(),
            extra: Mapping::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_css(mut self, css: impl Into<String>) -> Self {
        self.css = Some(css.into());
        self
    }

    pub fn setting_type(&self) -> SettingType {
        self.kind.setting_type()
    }

    pub fn is_heading(&self) -> bool {
        matches!(self.kind, SettingKind::Heading { .. })
    }

    /// The trimmed CSS fragment, or `None` when absent or blank.
    pub fn css_fragment(&self) -> Option<&str> {
        self.css.as_deref().map(str::trim).filter(|css| !css.is_empty())
    }

    /// Title used in fragment headers: the title, or the id when untitled.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.id
        } else {
            &self.title
        }
    }

    /// `var(--id)` for variable settings.
    pub fn css_variable(&self) -> Option<String> {
        self.setting_type()
            .is_variable()
            .then(|| format!("var(--{})", self.id))
    }
}

/// Which convention delimits per-setting fragments in the CSS body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlockFormat {
    /// `/* @cell: id */ ... /* @cell-end */` markers.
    #[default]
    Cell,
    /// Asterisk-bordered title comments, attributed by selector content.
    Asterisk,
}

impl fmt::Display for BlockFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockFormat::Cell => f.write_str("cell"),
            BlockFormat::Asterisk => f.write_str("asterisk"),
        }
    }
}

/// The settings schema of one snippet plus its attributed CSS.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsConfig {
    pub name: Option<String>,
    /// Namespace of the snippet; `.{id}` is its scope class.
    pub id: String,
    pub settings: Vec<Setting>,
    /// Body CSS that belongs to no setting. Empty when there is none.
    pub global_css: String,
    /// Fragment convention detected at extraction; `None` for new configs.
    pub format: Option<BlockFormat>,
    /// Top-level keys outside the schema.
    pub extra: Mapping,
}

impl SettingsConfig {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            name: None,
            id: id.into(),
            settings: Vec::new(),
            global_css: String::new(),
            format: None,
            extra: Mapping::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Config presented when a document has no usable settings block.
    pub fn fallback() -> Self {
        Self::new("my-style-settings").with_name("My Style Settings")
    }

    /// The fragment convention used when writing this config.
    pub fn effective_format(&self) -> BlockFormat {
        self.format.unwrap_or_default()
    }

    pub fn scope_class(&self) -> String {
        cellsheet_scope::scope_class_for(&self.id)
    }

    /// Depth-first iterator over all settings, nested ones included.
    pub fn iter_settings(&self) -> DepthFirst<'_> {
        DepthFirst::new(&self.settings)
    }

    /// Finds a setting by exact id, depth-first. The first match wins.
    pub fn find_setting(&self, id: &str) -> Option<&Setting> {
        self.iter_settings().find(|s| s.id == id)
    }

    pub fn find_setting_mut(&mut self, id: &str) -> Option<&mut Setting> {
        find_first_mut(&mut self.settings, &mut |s: &Setting| s.id == id)
    }
}

/// Depth-first, pre-order traversal of a settings tree.
#[derive(Debug, Clone)]
pub struct DepthFirst<'a> {
    stack: Vec<std::slice::Iter<'a, Setting>>,
}

impl<'a> DepthFirst<'a> {
    fn new(settings: &'a [Setting]) -> Self {
        Self {
            stack: vec![settings.iter()],
        }
    }
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = &'a Setting;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some(setting) => {
                    if !setting.settings.is_empty() {
                        self.stack.push(setting.settings.iter());
                    }
                    return Some(setting);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Returns the first setting, depth-first, for which `pred` holds.
pub(crate) fn find_first_mut<'a, P>(
    settings: &'a mut [Setting],
    pred: &mut P,
) -> Option<&'a mut Setting>
where
    P: FnMut(&Setting) -> bool,
{
    for setting in settings.iter_mut() {
        if pred(setting) {
            return Some(setting);
        }
        if let Some(found) = find_first_mut(&mut setting.settings, pred) {
            return Some(found);
        }
    }
    None
}
