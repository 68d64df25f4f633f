//! Recording [`VersionControl`] double.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use composer_core::BoxFuture;
use composer_core::vcs::{VcsCapability, VcsError, VersionControl};

/// One call made against a [`RecordingVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Stage { root: PathBuf, file: PathBuf },
    Commit { root: PathBuf, message: String },
}

#[derive(Default)]
struct Inner {
    calls: Vec<VcsCall>,
}

/// Version control that records stage and commit calls instead of running
/// anything. Clones share the same log.
#[derive(Clone)]
pub struct RecordingVcs {
    inner: Arc<Mutex<Inner>>,
    repository: bool,
    fail_commit: bool,
}

impl RecordingVcs {
    /// A backend that sees a repository at every root and always succeeds.
    pub fn new() -> Self {
        Self {
            inner: Arc::default(),
            repository: true,
            fail_commit: false,
        }
    }

    /// No repository is bound to any root.
    pub fn without_repository(mut self) -> Self {
        self.repository = false;
        self
    }

    /// Every commit fails.
    pub fn failing_commits(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Capability wrapping a clone of this recorder.
    pub fn capability(&self) -> VcsCapability {
        VcsCapability::available(self.clone())
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.lock().calls.clone()
    }

    /// Messages of recorded commits, in order.
    pub fn commit_messages(&self) -> Vec<String> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                VcsCall::Commit { message, .. } => Some(message.clone()),
                VcsCall::Stage { .. } => None,
            })
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for RecordingVcs {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionControl for RecordingVcs {
    fn name(&self) -> &str {
        "recording"
    }

    fn is_repository(&self, _root: &Path) -> BoxFuture<'_, bool> {
        let repository = self.repository;
        Box::pin(async move { repository })
    }

    fn stage(&self, root: &Path, file: &Path) -> BoxFuture<'_, Result<(), VcsError>> {
        self.lock().calls.push(VcsCall::Stage {
            root: root.to_path_buf(),
            file: file.to_path_buf(),
        });
        Box::pin(async move { Ok(()) })
    }

    fn commit(&self, root: &Path, message: &str) -> BoxFuture<'_, Result<(), VcsError>> {
        if self.fail_commit {
            return Box::pin(async move {
                Err(VcsError::Command {
                    command: "commit".to_string(),
                    stderr: "nothing to commit".to_string(),
                })
            });
        }
        self.lock().calls.push(VcsCall::Commit {
            root: root.to_path_buf(),
            message: message.to_string(),
        });
        Box::pin(async move { Ok(()) })
    }
}
