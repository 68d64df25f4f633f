//! Panel controllers and the host services they run against.
//!
//! A controller owns one panel's in-memory state and performs the file
//! operations its messages ask for. Host capabilities (file system, version
//! control, bundled templates) are injected through [`HostServices`], so the
//! controllers run without a terminal or editor attached.

mod path_config;
mod selection;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use composer_config::ConfigError;

use crate::bundle::Bundle;
use crate::fs::{FileSystem, LocalFs};
use crate::settings::SettingsStore;
use crate::vcs::VcsCapability;

pub use path_config::{ConfigView, PathConfigController};
pub use selection::{ApplyOptions, ApplyReport, Preview, SelectionController, SelectionPhase, SelectionView};

/// Errors surfaced to the user by a controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    #[error("Open a folder first.")]
    NoProject,

    #[error("invalid settings: {0}")]
    Config(#[from] ConfigError),

    #[error("{message} cannot be handled by the {panel} panel")]
    Misrouted {
        message: &'static str,
        panel: &'static str,
    },

    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ControllerError {
    fn io<'a>(
        action: &'static str,
        path: &'a Path,
    ) -> impl FnOnce(std::io::Error) -> Self + 'a {
        move |source| ControllerError::Io {
            action,
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Capabilities provided by the host.
#[derive(Clone)]
pub struct HostServices {
    pub fs: Arc<dyn FileSystem>,
    pub vcs: VcsCapability,
    pub bundle: Arc<Bundle>,
}

impl HostServices {
    pub fn new(fs: Arc<dyn FileSystem>, vcs: VcsCapability, bundle: Bundle) -> Self {
        Self {
            fs,
            vcs,
            bundle: Arc::new(bundle),
        }
    }

    /// Real disk, `git` if installed, embedded templates.
    pub async fn local() -> Self {
        Self::new(Arc::new(LocalFs), VcsCapability::detect().await, Bundle::embedded())
    }
}

/// The open project, if any, plus the host it lives on.
#[derive(Clone)]
pub struct Workspace {
    root: Option<PathBuf>,
    host: HostServices,
}

impl Workspace {
    pub fn new(root: Option<PathBuf>, host: HostServices) -> Self {
        Self { root, host }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn host(&self) -> &HostServices {
        &self.host
    }

    pub fn fs(&self) -> &dyn FileSystem {
        self.host.fs.as_ref()
    }

    fn require_root(&self) -> Result<&Path, ControllerError> {
        self.root().ok_or(ControllerError::NoProject)
    }

    fn settings(&self) -> Option<SettingsStore<'_>> {
        self.root().map(|root| SettingsStore::new(self.fs(), root))
    }

    /// Current settings, or defaults outside a project.
    pub async fn load_config(&self) -> composer_config::ComposerConfig {
        match self.settings() {
            Some(store) => store.load().await,
            None => composer_config::ComposerConfig::default(),
        }
    }
}
