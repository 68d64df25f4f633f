//! Version-control capability for the optional auto-commit.
//!
//! [`VcsCapability`] is either `Unavailable` or wraps a [`VersionControl`]
//! backend, so callers handle absence as an explicit outcome. Commit
//! attempts are best-effort: [`VcsCapability::try_commit`] never fails, it
//! reports a [`CommitOutcome`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::process::Command;
use tracing::{debug, info};

use crate::BoxFuture;
use crate::instruction::SelectionState;

/// Errors from a version-control backend.
#[derive(Debug, thiserror::Error)]
pub enum VcsError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {stderr}")]
    Command { command: String, stderr: String },
}

/// Stage-and-commit operations keyed by project root.
pub trait VersionControl: Send + Sync {
    /// Backend display name (e.g. "git").
    fn name(&self) -> &str;

    /// Whether a repository is rooted exactly at `root`.
    fn is_repository(&self, root: &Path) -> BoxFuture<'_, bool>;

    /// Stage `file` in the repository at `root`.
    fn stage(&self, root: &Path, file: &Path) -> BoxFuture<'_, Result<(), VcsError>>;

    /// Commit whatever is staged with `message`.
    fn commit(&self, root: &Path, message: &str) -> BoxFuture<'_, Result<(), VcsError>>;
}

/// Result of a best-effort commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    Skipped(String),
}

/// Version control as seen by the controllers.
#[derive(Clone, Default)]
pub enum VcsCapability {
    #[default]
    Unavailable,
    Available(Arc<dyn VersionControl>),
}

impl std::fmt::Debug for VcsCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VcsCapability::Unavailable => f.write_str("Unavailable"),
            VcsCapability::Available(vcs) => write!(f, "Available({})", vcs.name()),
        }
    }
}

impl VcsCapability {
    pub fn available(vcs: impl VersionControl + 'static) -> Self {
        VcsCapability::Available(Arc::new(vcs))
    }

    /// Probe for a usable `git` executable.
    pub async fn detect() -> Self {
        let git = GitCli::default();
        if git.probe().await {
            Self::available(git)
        } else {
            debug!("git not found, auto-commit disabled");
            VcsCapability::Unavailable
        }
    }

    /// Stage `file` and commit it with `message`. Every failure is reported
    /// as [`CommitOutcome::Skipped`], never raised.
    pub async fn try_commit(&self, root: &Path, file: &Path, message: &str) -> CommitOutcome {
        let vcs = match self {
            VcsCapability::Unavailable => {
                return skipped("version control unavailable".to_string());
            }
            VcsCapability::Available(vcs) => vcs,
        };
        if !vcs.is_repository(root).await {
            return skipped(format!("no {} repository at {}", vcs.name(), root.display()));
        }
        if let Err(e) = vcs.stage(root, file).await {
            return skipped(e.to_string());
        }
        if let Err(e) = vcs.commit(root, message).await {
            return skipped(e.to_string());
        }
        info!(backend = vcs.name(), %message, "Committed instruction file");
        CommitOutcome::Committed
    }
}

fn skipped(reason: String) -> CommitOutcome {
    debug!(%reason, "Skipping commit");
    CommitOutcome::Skipped(reason)
}

/// Commit message embedding the selection, add-ons in canonical order.
pub fn commit_message(selection: &SelectionState) -> String {
    format!(
        "chore: update copilot instructions [{}]",
        selection.summary()
    )
}

/// `git` driven through its command-line interface.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl GitCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn probe(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .output()
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }

    async fn run(&self, root: &Path, args: &[&OsStr]) -> Result<String, VcsError> {
        let output = Command::new(&self.program)
            .arg("-C")
            .arg(root)
            .args(args)
            .output()
            .await
            .map_err(|source| VcsError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
        } else {
            let command = std::iter::once("git".into())
                .chain(args.iter().map(|a| a.to_string_lossy()))
                .collect::<Vec<_>>()
                .join(" ");
            Err(VcsError::Command {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl VersionControl for GitCli {
    fn name(&self) -> &str {
        "git"
    }

    fn is_repository(&self, root: &Path) -> BoxFuture<'_, bool> {
        let root = root.to_path_buf();
        Box::pin(async move {
            let Ok(top) = self
                .run(&root, &[OsStr::new("rev-parse"), OsStr::new("--show-toplevel")])
                .await
            else {
                return false;
            };
            match (
                tokio::fs::canonicalize(&top).await,
                tokio::fs::canonicalize(&root).await,
            ) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
        })
    }

    fn stage(&self, root: &Path, file: &Path) -> BoxFuture<'_, Result<(), VcsError>> {
        let root = root.to_path_buf();
        let file = file.to_path_buf();
        Box::pin(async move {
            self.run(&root, &[OsStr::new("add"), OsStr::new("--"), file.as_os_str()])
                .await
                .map(|_| ())
        })
    }

    fn commit(&self, root: &Path, message: &str) -> BoxFuture<'_, Result<(), VcsError>> {
        let root = root.to_path_buf();
        let message = message.to_string();
        Box::pin(async move {
            self.run(&root, &[OsStr::new("commit"), OsStr::new("-m"), OsStr::new(&message)])
                .await
                .map(|_| ())
        })
    }
}
