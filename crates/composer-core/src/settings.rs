//! Workspace settings access through the file-system capability.
//!
//! Settings are re-read at the start of every operation; nothing is cached.

use std::path::{Path, PathBuf};

use composer_config::{ComposerConfig, ConfigError, SETTINGS_FILE};
use tracing::warn;

use crate::fs::FileSystem;

/// Reads and writes `<project>/.copilot-composer.toml`.
pub struct SettingsStore<'a> {
    fs: &'a dyn FileSystem,
    root: &'a Path,
}

impl<'a> SettingsStore<'a> {
    pub fn new(fs: &'a dyn FileSystem, root: &'a Path) -> Self {
        Self { fs, root }
    }

    pub fn path(&self) -> PathBuf {
        self.root.join(SETTINGS_FILE)
    }

    /// Current settings. A missing file means defaults; a broken one is
    /// logged and also treated as defaults.
    pub async fn load(&self) -> ComposerConfig {
        let path = self.path();
        if !self.fs.exists(&path).await {
            return ComposerConfig::default();
        }
        let parsed = match self.fs.read_to_string(&path).await {
            Ok(text) => ComposerConfig::parse(&text),
            Err(e) => Err(ConfigError::Io(e)),
        };
        parsed.unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring unusable settings file, using defaults");
            ComposerConfig::default()
        })
    }

    /// Validate and persist `config`.
    pub async fn save(&self, config: &ComposerConfig) -> Result<PathBuf, ConfigError> {
        let text = config.to_toml()?;
        let path = self.path();
        self.fs.write(&path, &text).await?;
        Ok(path)
    }
}
