//! Snippet storage.
//!
//! [`SnippetStorage`] is the set of operations an editing session needs from
//! wherever snippets live: list, read, write, delete and rename named text
//! documents in one flat namespace. [`DirStorage`] implements it over a
//! single directory, keeping only files with the configured extension.
//!
//! Missing documents are not errors: reading one yields empty text, deleting
//! or renaming one does nothing, and listing a missing directory yields
//! nothing. The directory is created on first write.
//!
//! After every write, delete or rename that touched the disk, the storage
//! calls its [`ReloadNotifier`] so the host can re-apply snippets.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Extension of snippet documents.
pub const SNIPPET_EXTENSION: &str = ".css";

/// Named text documents in one flat namespace.
pub trait SnippetStorage {
    /// Names of all documents, sorted.
    fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Content of `name`, or an empty string when it does not exist.
    fn read(&self, name: &str) -> Result<String, StoreError>;

    fn write(&self, name: &str, content: &str) -> Result<(), StoreError>;

    /// Removes `name`. Does nothing when it does not exist.
    fn delete(&self, name: &str) -> Result<(), StoreError>;

    /// Renames `from` to `to`. Does nothing when `from` does not exist.
    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError>;
}

/// Told when stored snippets changed.
pub trait ReloadNotifier {
    fn reload(&self);
}

/// A notifier that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl ReloadNotifier for NoopNotifier {
    fn reload(&self) {}
}

impl<F: Fn()> ReloadNotifier for F {
    fn reload(&self) {
        self()
    }
}

/// Where [`DirStorage`] keeps its documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub dir: PathBuf,
    /// Suffix of listed documents, including the dot.
    pub extension: String,
}

impl StoreConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: SNIPPET_EXTENSION.to_string(),
        }
    }
}

/// Directory-backed [`SnippetStorage`].
#[derive(Debug)]
pub struct DirStorage<N = NoopNotifier> {
    config: StoreConfig,
    notifier: N,
}

impl DirStorage<NoopNotifier> {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_notifier(config, NoopNotifier)
    }
}

impl<N: ReloadNotifier> DirStorage<N> {
    pub fn with_notifier(config: StoreConfig, notifier: N) -> Self {
        Self { config, notifier }
    }

    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Path of `name` inside the directory. The name must be a plain file name.
    pub fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\', '\0']);
        if valid {
            Ok(self.config.dir.join(name))
        } else {
            Err(StoreError::InvalidName {
                name: name.to_string(),
            })
        }
    }
}

impl<N: ReloadNotifier> SnippetStorage for DirStorage<N> {
    fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.config.dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&self.config.dir, err)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.config.dir, e))?;
            let is_file = entry
                .file_type()
                .map_err(|e| StoreError::io(entry.path(), e))?
                .is_file();
            if !is_file {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(&self.config.extension) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String, StoreError> {
        let path = self.path_for(name)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(content),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(String::new()),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    fn write(&self, name: &str, content: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        fs::create_dir_all(&self.config.dir).map_err(|e| StoreError::io(&self.config.dir, e))?;
        fs::write(&path, content).map_err(|e| StoreError::io(&path, e))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote snippet");
        self.notifier.reload();
        Ok(())
    }

    fn delete(&self, name: &str) -> Result<(), StoreError> {
        let path = self.path_for(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "deleted snippet");
                self.notifier.reload();
                Ok(())
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), StoreError> {
        let source = self.path_for(from)?;
        let target = self.path_for(to)?;
        if !source.exists() {
            return Ok(());
        }
        fs::rename(&source, &target).map_err(|e| StoreError::io(&source, e))?;
        tracing::debug!(from = %source.display(), to = %target.display(), "renamed snippet");
        self.notifier.reload();
        Ok(())
    }
}
