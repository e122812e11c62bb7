//! Editing one snippet.
//!
//! An [`EditSession`] holds the text of a snippet while it is edited, either
//! through the structured config ([`EditSession::config`] /
//! [`EditSession::apply`]) or as raw text ([`EditSession::set_content`]).
//! Nothing touches storage until [`EditSession::save`].

use crate::error::{ExtractError, Result, StoreError};
use crate::extract::{settings_block_range, try_extract_config};
use crate::merge::{update_config_with, MergeOptions};
use crate::model::SettingsConfig;
use crate::storage::{SnippetStorage, SNIPPET_EXTENSION};
use crate::template::DEFAULT_TEMPLATE;

/// The snippet being edited and the storage it came from.
#[derive(Debug)]
pub struct EditSession<S> {
    storage: S,
    /// Name the snippet is stored under, `None` until first saved.
    stored_name: Option<String>,
    content: String,
    options: MergeOptions,
}

impl<S: SnippetStorage> EditSession<S> {
    /// Starts a new snippet from [`DEFAULT_TEMPLATE`].
    pub fn create(storage: S) -> Self {
        Self {
            storage,
            stored_name: None,
            content: DEFAULT_TEMPLATE.to_string(),
            options: MergeOptions::default(),
        }
    }

    /// Opens the stored snippet `name`. A missing snippet opens empty.
    pub fn open(storage: S, name: &str) -> Result<Self> {
        let content = storage.read(name)?;
        Ok(Self {
            storage,
            stored_name: Some(name.to_string()),
            content,
            options: MergeOptions::default(),
        })
    }

    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.stored_name.as_deref()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replaces the text wholesale, as a code editor would.
    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// The config of the current text.
    ///
    /// Without a usable settings block this is [`SettingsConfig::fallback`]
    /// holding the CSS after the block (or the whole text) as `global_css`.
    pub fn config(&self) -> SettingsConfig {
        try_extract_config(&self.content).unwrap_or_else(|_| {
            let body = settings_block_range(&self.content)
                .map_or(self.content.as_str(), |range| &self.content[range.end..]);
            let mut config = SettingsConfig::fallback();
            config.global_css = body.trim().to_string();
            config
        })
    }

    /// Rewrites the text from an edited config.
    ///
    /// Fails with [`ExtractError::MalformedSchema`] and leaves the text alone
    /// when its settings block is present but unreadable.
    pub fn apply(&mut self, config: &SettingsConfig) -> Result<()> {
        if let Err(err @ ExtractError::MalformedSchema { .. }) = try_extract_config(&self.content) {
            return Err(err.into());
        }
        self.content = update_config_with(&self.content, config, &self.options)?;
        Ok(())
    }

    /// Stores the text as `name` (`.css` appended if missing) and returns the
    /// name used. When the snippet was stored under another name, that one is
    /// deleted once the new one is written.
    pub fn save(&mut self, name: &str) -> Result<String> {
        let name = snippet_file_name(name)?;
        self.storage.write(&name, &self.content)?;

        let previous = self.stored_name.replace(name.clone());
        if let Some(previous) = previous.filter(|previous| *previous != name) {
            self.storage.delete(&previous)?;
        }

        tracing::debug!(name = %name, "saved snippet");
        Ok(name)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }
}

/// `name` trimmed, with the snippet extension appended when missing.
pub fn snippet_file_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() || name == SNIPPET_EXTENSION {
        return Err(StoreError::InvalidName {
            name: name.to_string(),
        });
    }
    if name.ends_with(SNIPPET_EXTENSION) {
        Ok(name.to_string())
    } else {
        Ok(format!("{}{}", name, SNIPPET_EXTENSION))
    }
}
