#![deny(unsafe_code)]

//! Workspace settings for Copilot Composer.
//!
//! Settings are stored per project in a TOML file (see [`SETTINGS_FILE`]) and
//! hold the repo-relative locations the composer reads from and writes to.
//! [`ComposerConfig`] is the central structure; every table and key is
//! optional and falls back to the defaults below.

use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// File name of the workspace settings file, relative to the project root.
pub const SETTINGS_FILE: &str = ".copilot-composer.toml";

/// Default location of the optional instruction mapping document.
pub const DEFAULT_REPO_CONFIG_PATH: &str = ".github/instruction-config.json";

/// Default directory holding project-local instruction-set overrides.
pub const DEFAULT_REPO_SETS_DIR: &str = ".github/instruction-sets";

/// Default location of the merged instructions file.
pub const DEFAULT_OUTPUT_PATH: &str = ".github/copilot-instructions.md";

/// Errors that can occur during settings loading, saving, and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

/// Top-level workspace settings.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComposerConfig {
    /// Paths and apply behaviour.
    #[serde(default)]
    pub composer: ComposerSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// The four user-settable composer values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposerSettings {
    /// Repo-relative path of the mapping document.
    #[serde(default = "default_repo_config_path")]
    pub repo_config_path: String,

    /// Repo-relative directory of instruction-set override files.
    #[serde(default = "default_repo_sets_dir")]
    pub repo_sets_dir: String,

    /// Repo-relative path the merged document is written to.
    #[serde(default = "default_output_path")]
    pub output_path: String,

    /// Whether to stage and commit the output file after a successful apply.
    #[serde(default)]
    pub auto_commit: bool,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            repo_config_path: default_repo_config_path(),
            repo_sets_dir: default_repo_sets_dir(),
            output_path: default_output_path(),
            auto_commit: false,
        }
    }
}

fn default_repo_config_path() -> String {
    DEFAULT_REPO_CONFIG_PATH.to_string()
}

fn default_repo_sets_dir() -> String {
    DEFAULT_REPO_SETS_DIR.to_string()
}

fn default_output_path() -> String {
    DEFAULT_OUTPUT_PATH.to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "debug", "trace").
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ComposerConfig {
    /// Load settings from a TOML file at the given path using async I/O.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded workspace settings");
        Ok(config)
    }

    /// Parse settings from a TOML string.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: ComposerConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Render the settings as pretty TOML, validating them first.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        self.validate()?;
        Ok(toml::to_string_pretty(self)?)
    }

    /// Write the settings to `path`, creating parent directories as needed.
    pub async fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = self.to_toml()?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, text).await?;
        debug!(path = %path.display(), "Saved workspace settings");
        Ok(())
    }

    /// Log level from the settings file under `root`, `info` when there is no
    /// project or the file is missing or invalid.
    pub async fn log_level_in(root: Option<&Path>) -> String {
        let Some(root) = root else {
            return default_log_level();
        };
        match Self::load(&root.join(SETTINGS_FILE)).await {
            Ok(config) => config.logging.level,
            Err(_) => default_log_level(),
        }
    }

    /// Validate the settings.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.composer;
        validate_repo_path("composer.repo_config_path", &c.repo_config_path)?;
        validate_repo_path("composer.repo_sets_dir", &c.repo_sets_dir)?;
        validate_repo_path("composer.output_path", &c.output_path)?;

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "logging.level must be one of {:?}, got {:?}",
                valid_levels, self.logging.level
            )));
        }

        Ok(())
    }
}

/// Paths must stay inside the project root.
fn validate_repo_path(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{key} must not be empty")));
    }
    let path = Path::new(value);
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(ConfigError::Validation(format!(
                    "{key} must not contain '..', got {value:?}"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ConfigError::Validation(format!(
                    "{key} must be relative to the project root, got {value:?}"
                )));
            }
        }
    }
    Ok(())
}
