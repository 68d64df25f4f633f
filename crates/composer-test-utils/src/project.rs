//! Temporary projects on the real file system.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use composer_config::{ComposerConfig, SETTINGS_FILE};
use composer_core::{
    Bundle, HostServices, InstructionId, LocalFs, Session, VcsCapability, Workspace,
};
use tempfile::TempDir;

/// A project root in a temp directory, deleted on drop.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Write a repo-relative file, creating parent directories.
    pub async fn write(&self, relative: &str, contents: &str) {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .expect("failed to create test directory");
        }
        tokio::fs::write(&path, contents)
            .await
            .expect("failed to write test file");
    }

    /// Read a repo-relative file, `None` if it does not exist.
    pub async fn read(&self, relative: &str) -> Option<String> {
        tokio::fs::read_to_string(self.path(relative)).await.ok()
    }

    /// Write an override for `id` into the configured sets directory.
    pub async fn write_override(&self, config: &ComposerConfig, id: InstructionId, contents: &str) {
        let relative = format!("{}/{}", config.composer.repo_sets_dir, id.file_name());
        self.write(&relative, contents).await;
    }

    /// Write the settings file.
    pub async fn write_settings(&self, config: &ComposerConfig) {
        config
            .save(&self.path(SETTINGS_FILE))
            .await
            .expect("failed to save test settings");
    }

    /// Workspace rooted here on the real disk.
    pub fn workspace(&self, vcs: VcsCapability, bundle: Bundle) -> Workspace {
        let host = HostServices::new(Arc::new(LocalFs), vcs, bundle);
        Workspace::new(Some(self.root().to_path_buf()), host)
    }

    /// Session over [`TestProject::workspace`].
    pub fn session(&self, vcs: VcsCapability, bundle: Bundle) -> Session {
        Session::new(self.workspace(vcs, bundle))
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}
