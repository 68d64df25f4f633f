//! Path Config controller: edits the workspace settings and writes the
//! sample mapping document.

use std::path::PathBuf;

use composer_config::ComposerSettings;
use tracing::info;

use super::{ControllerError, Workspace};
use crate::mapping::{InstructionMapping, MappingStatus, read_mapping};

/// Everything the path config panel renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigView {
    pub settings: ComposerSettings,
    /// Where the settings live, `None` outside a project.
    pub settings_path: Option<PathBuf>,
    pub mapping_status: MappingStatus,
}

pub struct PathConfigController {
    workspace: Workspace,
}

impl PathConfigController {
    pub fn new(workspace: Workspace) -> Self {
        Self { workspace }
    }

    /// Validate and persist `settings`, keeping the rest of the settings
    /// file as it was. Also makes sure the output directory exists.
    pub async fn save(&self, settings: ComposerSettings) -> Result<PathBuf, ControllerError> {
        let root = self.workspace.require_root()?;
        let store = self.workspace.settings().ok_or(ControllerError::NoProject)?;

        let mut config = store.load().await;
        config.composer = settings;
        let path = store.save(&config).await?;

        let output = root.join(&config.composer.output_path);
        if let Some(parent) = output.parent() {
            self.workspace
                .fs()
                .create_dir_all(parent)
                .await
                .map_err(ControllerError::io("create directory", parent))?;
        }
        info!(path = %path.display(), "Saved workspace settings");
        Ok(path)
    }

    /// Write a sample mapping to the configured mapping path, replacing any
    /// existing file.
    pub async fn create_sample_mapping(&self) -> Result<PathBuf, ControllerError> {
        let root = self.workspace.require_root()?;
        let config = self.workspace.load_config().await;
        let fs = self.workspace.fs();
        let path = root.join(&config.composer.repo_config_path);

        if let Some(parent) = path.parent() {
            fs.create_dir_all(parent)
                .await
                .map_err(ControllerError::io("create directory", parent))?;
        }
        let sample = InstructionMapping::sample(&config.composer.repo_sets_dir);
        fs.write(&path, &sample.to_pretty_json())
            .await
            .map_err(ControllerError::io("write", &path))?;
        info!(path = %path.display(), "Wrote sample mapping");
        Ok(path)
    }

    pub async fn view(&self) -> ConfigView {
        let config = self.workspace.load_config().await;
        let mapping = read_mapping(
            self.workspace.fs(),
            self.workspace.root(),
            &config.composer.repo_config_path,
        )
        .await;
        ConfigView {
            settings: config.composer,
            settings_path: self.workspace.settings().map(|s| s.path()),
            mapping_status: MappingStatus::of(mapping.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;

    use crate::bundle::Bundle;
    use crate::controller::HostServices;
    use crate::fs::LocalFs;
    use crate::instruction::InstructionId;
    use crate::vcs::VcsCapability;
    use composer_config::{ComposerConfig, SETTINGS_FILE};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn controller(root: Option<&Path>) -> PathConfigController {
        let host = HostServices::new(Arc::new(LocalFs), VcsCapability::Unavailable, Bundle::empty());
        PathConfigController::new(Workspace::new(root.map(Path::to_path_buf), host))
    }

    fn custom_settings() -> ComposerSettings {
        ComposerSettings {
            repo_config_path: "ai/mapping.json".to_string(),
            repo_sets_dir: "ai/sets".to_string(),
            output_path: "ai/out/instructions.md".to_string(),
            auto_commit: true,
        }
    }

    #[tokio::test]
    async fn test_save_persists_and_creates_output_dir() {
        let tmp = TempDir::new().unwrap();
        let ctl = controller(Some(tmp.path()));

        let path = ctl.save(custom_settings()).await.unwrap();
        assert_eq!(path, tmp.path().join(SETTINGS_FILE));

        let loaded = ComposerConfig::load(&path).await.unwrap();
        assert_eq!(loaded.composer, custom_settings());
        assert!(tmp.path().join("ai/out").is_dir());
    }

    #[tokio::test]
    async fn test_save_keeps_logging_section() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(SETTINGS_FILE),
            "[logging]\nlevel = \"debug\"\n",
        )
        .await
        .unwrap();

        let ctl = controller(Some(tmp.path()));
        let path = ctl.save(custom_settings()).await.unwrap();
        let loaded = ComposerConfig::load(&path).await.unwrap();
        assert_eq!(loaded.logging.level, "debug");
    }

    #[tokio::test]
    async fn test_save_rejects_invalid_paths() {
        let tmp = TempDir::new().unwrap();
        let ctl = controller(Some(tmp.path()));
        let mut settings = custom_settings();
        settings.output_path = "../outside.md".to_string();

        let err = ctl.save(settings).await.unwrap_err();
        assert!(matches!(err, ControllerError::Config(_)));
        assert!(!tmp.path().join(SETTINGS_FILE).exists());
    }

    #[tokio::test]
    async fn test_no_project() {
        let ctl = controller(None);
        assert!(matches!(
            ctl.save(custom_settings()).await,
            Err(ControllerError::NoProject)
        ));
        assert!(matches!(
            ctl.create_sample_mapping().await,
            Err(ControllerError::NoProject)
        ));
        let view = ctl.view().await;
        assert_eq!(view.settings_path, None);
        assert_eq!(view.mapping_status, MappingStatus::Absent);
    }

    #[tokio::test]
    async fn test_create_sample_mapping_uses_configured_paths() {
        let tmp = TempDir::new().unwrap();
        let ctl = controller(Some(tmp.path()));
        ctl.save(custom_settings()).await.unwrap();

        let path = ctl.create_sample_mapping().await.unwrap();
        assert_eq!(path, tmp.path().join("ai/mapping.json"));

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        let mapping: InstructionMapping = serde_json::from_str(&text).unwrap();
        assert_eq!(mapping.path(InstructionId::Security), Some("ai/sets/security.md"));
        assert_eq!(mapping.version(InstructionId::BaseShort), Some("v1.0.0"));

        let view = ctl.view().await;
        assert_eq!(view.mapping_status, MappingStatus::Loaded { complete: true });
    }
}
