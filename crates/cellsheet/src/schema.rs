//! YAML codec for the settings schema.
//!
//! Decoding walks a parsed [`serde_yaml::Value`] by hand, the way stylesheet
//! definitions are parsed: each setting's `type` selects which keys are
//! schema fields, every other key lands in the setting's `extra` table in its
//! original order. Encoding writes the known keys first (`id`, `title`,
//! `description`, `type`, type fields), then the extras, then nested
//! `settings`.
//!
//! Derived data (`css`, `global_css`, `format`) is never encoded.

use serde_yaml::{Mapping, Number, Value};

use crate::error::SchemaError;
use crate::model::{
    NumberSpec, SelectOption, Setting, SettingKind, SettingType, SettingsConfig,
};

const ROOT_KEYS: &[&str] = &["name", "id", "settings"];
const COMMON_KEYS: &[&str] = &["id", "title", "description", "type", "css", "settings"];

/// Keys that belong to the schema for a setting of type `ty`, besides the common ones.
fn kind_keys(ty: SettingType) -> &'static [&'static str] {
    match ty {
        SettingType::Heading => &["level", "collapsed"],
        SettingType::ClassToggle => &["default", "addCommand"],
        SettingType::ClassSelect => &["allowEmpty", "default", "options"],
        SettingType::VariableText => &["default", "quotes"],
        SettingType::VariableNumber => &["default", "min", "max", "step"],
        SettingType::VariableNumberSlider => &["default", "min", "max", "step", "format"],
        SettingType::VariableSelect => &["default", "options"],
        SettingType::VariableColor => &["default", "format", "opacity"],
        SettingType::InfoText => &["markdown"],
    }
}

/// Decodes the root of an `@settings` block.
pub fn decode_config(value: &Value) -> Result<SettingsConfig, SchemaError> {
    let map = value.as_mapping().ok_or_else(|| {
        SchemaError::new("<root>", format!("expected a mapping, found {}", describe(value)))
    })?;
    let fields = Fields { map, path: "" };

    Ok(SettingsConfig {
        name: fields.string("name")?,
        id: fields.required_string("id")?,
        settings: decode_settings(fields.get("settings"), "settings")?,
        global_css: String::new(),
        format: None,
        extra: fields.extra(ROOT_KEYS, &[]),
    })
}

fn decode_settings(value: Option<&Value>, path: &str) -> Result<Vec<Setting>, SchemaError> {
    match value {
        None => Ok(Vec::new()),
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| decode_setting(item, &format!("{}[{}]", path, i)))
            .collect(),
        Some(other) => Err(SchemaError::new(
            path,
            format!("expected a list, found {}", describe(other)),
        )),
    }
}

fn decode_setting(value: &Value, path: &str) -> Result<Setting, SchemaError> {
    let map = value.as_mapping().ok_or_else(|| {
        SchemaError::new(path, format!("expected a mapping, found {}", describe(value)))
    })?;
    let fields = Fields { map, path };

    let type_name = fields.required_string("type")?;
    let ty: SettingType = type_name
        .parse()
        .map_err(|e: SchemaError| SchemaError::new(fields.at("type"), e.message))?;

    let kind = match ty {
        SettingType::Heading => SettingKind::Heading {
            level: fields.level("level")?.unwrap_or(1),
            collapsed: fields.bool("collapsed")?,
        },
        SettingType::ClassToggle => SettingKind::ClassToggle {
            default: fields.bool("default")?,
            add_command: fields.bool("addCommand")?,
        },
        SettingType::ClassSelect => SettingKind::ClassSelect {
            allow_empty: fields.bool("allowEmpty")?,
            default: fields.string("default")?,
            options: fields.options("options")?,
        },
        SettingType::VariableText => SettingKind::VariableText {
            default: fields.string("default")?,
            quotes: fields.bool("quotes")?,
        },
        SettingType::VariableNumber => SettingKind::VariableNumber(fields.number_spec()?),
        SettingType::VariableNumberSlider => SettingKind::VariableNumberSlider {
            spec: fields.number_spec()?,
            format: fields.string("format")?,
        },
        SettingType::VariableSelect => SettingKind::VariableSelect {
            default: fields.string("default")?,
            options: fields.options("options")?,
        },
        SettingType::VariableColor => SettingKind::VariableColor {
            default: fields.string("default")?,
            format: fields.string("format")?,
            opacity: fields.bool("opacity")?,
        },
        SettingType::InfoText => SettingKind::InfoText {
            markdown: fields.bool("markdown")?,
        },
    };

    Ok(Setting {
        id: fields.required_string("id")?,
        title: fields.string("title")?.unwrap_or_default(),
        description: fields.string("description")?,
        kind,
        css: fields.string("css")?,
        settings: decode_settings(fields.get("settings"), &fields.at("settings"))?,
        extra: fields.extra(COMMON_KEYS, kind_keys(ty)),
    })
}

fn decode_option(value: &Value, path: &str) -> Result<SelectOption, SchemaError> {
    if let Some(text) = scalar_string(value) {
        return Ok(SelectOption::Value(text));
    }

    let map = value.as_mapping().ok_or_else(|| {
        SchemaError::new(
            path,
            format!("expected a string or a label/value pair, found {}", describe(value)),
        )
    })?;
    let fields = Fields { map, path };
    let value = fields.required_string("value")?;
    let label = fields.string("label")?.unwrap_or_else(|| value.clone());
    Ok(SelectOption::Labeled { label, value })
}

/// Encodes a config as the YAML tree written into the `@settings` block.
pub fn encode_config(config: &SettingsConfig) -> Value {
    let mut map = Mapping::new();
    if let Some(name) = &config.name {
        insert_str(&mut map, "name", name);
    }
    insert_str(&mut map, "id", &config.id);
    extend(&mut map, &config.extra);
    map.insert(
        key("settings"),
        Value::Sequence(config.settings.iter().map(encode_setting).collect()),
    );
    Value::Mapping(map)
}

fn encode_setting(setting: &Setting) -> Value {
    let mut map = Mapping::new();
    insert_str(&mut map, "id", &setting.id);
    insert_str(&mut map, "title", &setting.title);
    if let Some(description) = &setting.description {
        insert_str(&mut map, "description", description);
    }
    insert_str(&mut map, "type", setting.setting_type().as_str());

    match &setting.kind {
        SettingKind::Heading { level, collapsed } => {
            map.insert(key("level"), Value::Number(Number::from(u64::from(*level))));
            insert_opt_bool(&mut map, "collapsed", *collapsed);
        }
        SettingKind::ClassToggle {
            default,
            add_command,
        } => {
            insert_opt_bool(&mut map, "default", *default);
            insert_opt_bool(&mut map, "addCommand", *add_command);
        }
        SettingKind::ClassSelect {
            allow_empty,
            default,
            options,
        } => {
            insert_opt_bool(&mut map, "allowEmpty", *allow_empty);
            insert_opt_str(&mut map, "default", default.as_deref());
            insert_options(&mut map, options);
        }
        SettingKind::VariableText { default, quotes } => {
            insert_opt_str(&mut map, "default", default.as_deref());
            insert_opt_bool(&mut map, "quotes", *quotes);
        }
        SettingKind::VariableNumber(spec) => insert_number_spec(&mut map, spec),
        SettingKind::VariableNumberSlider { spec, format } => {
            insert_number_spec(&mut map, spec);
            insert_opt_str(&mut map, "format", format.as_deref());
        }
        SettingKind::VariableSelect { default, options } => {
            insert_opt_str(&mut map, "default", default.as_deref());
            insert_options(&mut map, options);
        }
        SettingKind::VariableColor {
            default,
            format,
            opacity,
        } => {
            insert_opt_str(&mut map, "default", default.as_deref());
            insert_opt_str(&mut map, "format", format.as_deref());
            insert_opt_bool(&mut map, "opacity", *opacity);
        }
        SettingKind::InfoText { markdown } => {
            insert_opt_bool(&mut map, "markdown", *markdown);
        }
    }

    extend(&mut map, &setting.extra);

    if !setting.settings.is_empty() {
        map.insert(
            key("settings"),
            Value::Sequence(setting.settings.iter().map(encode_setting).collect()),
        );
    }

    Value::Mapping(map)
}

// =========================================================================
// Decoding helpers
// =========================================================================

/// Typed access to the keys of one YAML mapping, with error paths.
struct Fields<'a> {
    map: &'a Mapping,
    path: &'a str,
}

impl<'a> Fields<'a> {
    fn at(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", self.path, key)
        }
    }

    /// The value under `key`; an explicit `null` counts as absent.
    fn get(&self, key: &str) -> Option<&'a Value> {
        match self.map.get(key) {
            None | Some(Value::Null) => None,
            found => found,
        }
    }

    fn mismatch(&self, key: &str, expected: &str, found: &Value) -> SchemaError {
        SchemaError::new(
            self.at(key),
            format!("expected {}, found {}", expected, describe(found)),
        )
    }

    /// Reads a string. Plain number and boolean scalars are taken as their text.
    fn string(&self, key: &str) -> Result<Option<String>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(value) => scalar_string(value)
                .map(Some)
                .ok_or_else(|| self.mismatch(key, "a string", value)),
        }
    }

    fn required_string(&self, key: &str) -> Result<String, SchemaError> {
        self.string(key)?
            .ok_or_else(|| SchemaError::new(self.at(key), "missing required field"))
    }

    fn bool(&self, key: &str) -> Result<Option<bool>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mismatch(key, "a boolean", other)),
        }
    }

    fn number(&self, key: &str) -> Result<Option<Number>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(other) => Err(self.mismatch(key, "a number", other)),
        }
    }

    fn level(&self, key: &str) -> Result<Option<u8>, SchemaError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|v| u8::try_from(v).ok())
                .map(Some)
                .ok_or_else(|| {
                    SchemaError::new(
                        self.at(key),
                        format!("expected a level between 0 and 255, found {}", n),
                    )
                }),
            Some(other) => Err(self.mismatch(key, "a number", other)),
        }
    }

    fn number_spec(&self) -> Result<NumberSpec, SchemaError> {
        Ok(NumberSpec {
            default: self.number("default")?,
            min: self.number("min")?,
            max: self.number("max")?,
            step: self.number("step")?,
        })
    }

    fn options(&self, key: &str) -> Result<Vec<SelectOption>, SchemaError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Sequence(items)) => {
                let path = self.at(key);
                items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| decode_option(item, &format!("{}[{}]", path, i)))
                    .collect()
            }
            Some(other) => Err(self.mismatch(key, "a list", other)),
        }
    }

    /// Every entry whose key is not in `common` or `specific`, in order.
    fn extra(&self, common: &[&str], specific: &[&str]) -> Mapping {
        self.map
            .iter()
            .filter(|(k, _)| {
                k.as_str()
                    .map_or(true, |k| !common.contains(&k) && !specific.contains(&k))
            })
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

// =========================================================================
// Encoding helpers
// =========================================================================

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn insert_str(map: &mut Mapping, name: &str, value: &str) {
    map.insert(key(name), Value::String(value.to_string()));
}

fn insert_opt_str(map: &mut Mapping, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        insert_str(map, name, value);
    }
}

fn insert_opt_bool(map: &mut Mapping, name: &str, value: Option<bool>) {
    if let Some(value) = value {
        map.insert(key(name), Value::Bool(value));
    }
}

fn insert_opt_number(map: &mut Mapping, name: &str, value: Option<&Number>) {
    if let Some(value) = value {
        map.insert(key(name), Value::Number(value.clone()));
    }
}

fn insert_number_spec(map: &mut Mapping, spec: &NumberSpec) {
    insert_opt_number(map, "default", spec.default.as_ref());
    insert_opt_number(map, "min", spec.min.as_ref());
    insert_opt_number(map, "max", spec.max.as_ref());
    insert_opt_number(map, "step", spec.step.as_ref());
}

fn insert_options(map: &mut Mapping, options: &[SelectOption]) {
    let items = options
        .iter()
        .map(|option| match option {
            SelectOption::Value(v) => Value::String(v.clone()),
            SelectOption::Labeled { label, value } => {
                let mut pair = Mapping::new();
                insert_str(&mut pair, "label", label);
                insert_str(&mut pair, "value", value);
                Value::Mapping(pair)
            }
        })
        .collect();
    map.insert(key("options"), Value::Sequence(items));
}

fn extend(map: &mut Mapping, extra: &Mapping) {
    for (k, v) in extra {
        map.insert(k.clone(), v.clone());
    }
}
