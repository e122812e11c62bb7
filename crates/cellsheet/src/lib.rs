//! CSS snippets with an embedded settings schema.
//!
//! A snippet starts with a `/* @settings ... */` comment holding a YAML
//! schema (a namespace `id` and an ordered list of typed settings), followed
//! by a CSS body. This crate keeps the two in sync:
//!
//! - [`extract_config`] reads the schema and splits the body into global CSS
//!   plus one fragment per setting, using either `@cell` markers or
//!   asterisk-bordered headers ([`BlockFormat`]).
//! - [`merge_config`] writes a config back: the schema without derived CSS,
//!   then the global CSS and each fragment, scoped (to the namespace class
//!   for cells, to the setting's own class for asterisk headers) and
//!   re-indented. Extracting the output yields the same config again.
//! - [`SettingsConfig`] tree operations (delete, move, add, [`sections`])
//!   treat a `heading` and the settings after it as one unit.
//! - [`EditSession`] and [`SnippetStorage`] load, edit and save snippets.
//!
//! Selector scoping and formatting live in [`cellsheet_scope`].
//!
//! [`sections`]: SettingsConfig::sections
//!
//! # Example
//!
//! ```rust
//! use cellsheet::{extract_config, merge_config};
//!
//! let text = "/* @settings\n\
//! name: Test\n\
//! id: test\n\
//! settings:\n\
//! \x20   - id: my-color\n\
//! \x20     title: My Color\n\
//! \x20     type: variable-color\n\
//! \x20     default: '#ff0000'\n\
//! */\n\
//! \n\
//! .my-color { color: red; }";
//!
//! let mut config = extract_config(text).unwrap();
//! assert_eq!(config.global_css, ".my-color { color: red; }");
//! assert_eq!(config.settings[0].css, None);
//!
//! config.settings[0].css = Some(std::mem::take(&mut config.global_css));
//! let merged = merge_config(&config).unwrap();
//! assert!(merged.contains("/* @cell: my-color */\n.test .my-color { color: red; }\n/* @cell-end */"));
//! ```

mod error;
mod extract;
mod merge;
mod model;
mod schema;
mod session;
mod storage;
mod template;
mod tree;

pub use error::{ExtractError, MergeError, Result, SchemaError, SessionError, StoreError};
pub use extract::{detect_format, extract_config, mentions_id, try_extract_config, TAB_REPLACEMENT};
pub use merge::{
    merge_config, merge_config_with, scope_document, update_config, update_config_with,
    MergeOptions, ScopeStrategy, DEFAULT_SEPARATOR_WIDTH, MIN_SEPARATOR_STARS,
};
pub use model::{
    BlockFormat, DepthFirst, NumberSpec, SelectOption, Setting, SettingKind, SettingType,
    SettingsConfig,
};
pub use schema::{decode_config, encode_config};
pub use session::{snippet_file_name, EditSession};
pub use storage::{
    DirStorage, NoopNotifier, ReloadNotifier, SnippetStorage, StoreConfig, SNIPPET_EXTENSION,
};
pub use template::DEFAULT_TEMPLATE;
pub use tree::{chunk_range, Direction, Section};

pub use cellsheet_scope;
