//! Instruction Selection controller.
//!
//! ```text
//!  Idle ── (no project: every action fails with NoProject)
//!
//!  Ready ──selection──▶ PreviewComputed ──apply──▶ Applied
//!                          ▲       │                 │
//!                          └─selection─┘◀─selection──┘
//! ```
//!
//! The preview is recomputed in full on every selection change. Apply
//! writes the preview computed for the current selection.

use std::path::PathBuf;

use tracing::{debug, info};

use super::{ControllerError, Workspace};
use crate::fs::backup_if_exists;
use crate::instruction::SelectionState;
use crate::mapping::{MappingStatus, read_mapping};
use crate::merge::{MergedDocument, MergedSection, merge};
use crate::resolver::ContentResolver;
use crate::tokens::{TokenEstimate, estimate};
use crate::vcs::{CommitOutcome, commit_message};

/// Lifecycle phase of the selection panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPhase {
    /// No project is open.
    Idle,
    /// Project open, nothing merged yet.
    Ready,
    PreviewComputed,
    /// The current preview has been written to the output path.
    Applied,
}

/// Merged document and its estimate for the current selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub merged: MergedDocument,
    pub estimate: TokenEstimate,
}

/// Per-call apply switches.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyOptions {
    /// Attempt a commit even when `auto_commit` is off.
    pub force_commit: bool,
}

/// What an apply did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyReport {
    pub output: PathBuf,
    /// Whether a previous output was copied to `<output>.bak`.
    pub backed_up: bool,
    /// `None` when no commit was requested.
    pub commit: Option<CommitOutcome>,
}

/// Everything the selection panel renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionView {
    pub phase: SelectionPhase,
    pub selection: SelectionState,
    pub mapping_status: MappingStatus,
    /// `id: version` lines for the selected sets, when a mapping is loaded.
    pub versions_header: Option<String>,
    pub output_path: String,
    pub estimate: TokenEstimate,
    /// Merged text, `None` until a preview has been computed.
    pub preview: Option<String>,
    pub sections: Vec<MergedSection>,
}

/// Holds the selection and preview for one open selection panel.
pub struct SelectionController {
    workspace: Workspace,
    selection: SelectionState,
    preview: Option<Preview>,
    phase: SelectionPhase,
}

impl SelectionController {
    /// Start with the default selection (`base-short`, no add-ons).
    pub fn new(workspace: Workspace) -> Self {
        let phase = if workspace.root().is_some() {
            SelectionPhase::Ready
        } else {
            SelectionPhase::Idle
        };
        Self {
            workspace,
            selection: SelectionState::default(),
            preview: None,
            phase,
        }
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn preview(&self) -> Option<&Preview> {
        self.preview.as_ref()
    }

    /// Replace the selection and recompute the preview.
    pub async fn update_selection(
        &mut self,
        selection: SelectionState,
    ) -> Result<&Preview, ControllerError> {
        self.workspace.require_root()?;
        self.selection = selection;
        self.rebuild().await
    }

    /// Recompute the preview for the current selection.
    pub async fn refresh(&mut self) -> Result<&Preview, ControllerError> {
        self.workspace.require_root()?;
        self.rebuild().await
    }

    async fn rebuild(&mut self) -> Result<&Preview, ControllerError> {
        let config = self.workspace.load_config().await;
        let host = self.workspace.host();
        let resolver = ContentResolver::new(
            host.fs.as_ref(),
            &host.bundle,
            self.workspace.root(),
            &config.composer.repo_sets_dir,
        );
        let merged = merge(&resolver, &self.selection).await;
        let estimate = estimate(&merged.text);
        debug!(selection = %self.selection.summary(), %estimate, "Preview rebuilt");

        self.phase = SelectionPhase::PreviewComputed;
        Ok(self.preview.insert(Preview { merged, estimate }))
    }

    /// Write the preview to the configured output path.
    ///
    /// Creates the output directory, copies any existing output to
    /// `<output>.bak`, writes the merged text, then commits best-effort when
    /// `auto_commit` (or `options.force_commit`) is set. A commit failure
    /// never fails the apply.
    pub async fn apply(&mut self, options: ApplyOptions) -> Result<ApplyReport, ControllerError> {
        let root = self.workspace.require_root()?.to_path_buf();
        if self.preview.is_none() {
            self.rebuild().await?;
        }
        let text = self
            .preview
            .as_ref()
            .map(|p| p.merged.text.clone())
            .unwrap_or_default();

        let config = self.workspace.load_config().await;
        let fs = self.workspace.fs();
        let output = root.join(&config.composer.output_path);

        if let Some(parent) = output.parent() {
            fs.create_dir_all(parent)
                .await
                .map_err(ControllerError::io("create directory", parent))?;
        }
        let backed_up = backup_if_exists(fs, &output)
            .await
            .map_err(ControllerError::io("back up", &output))?;
        fs.write(&output, &text)
            .await
            .map_err(ControllerError::io("write", &output))?;
        info!(
            output = %output.display(),
            selection = %self.selection.summary(),
            backed_up,
            "Applied instruction file"
        );

        let commit = if config.composer.auto_commit || options.force_commit {
            let message = commit_message(&self.selection);
            Some(
                self.workspace
                    .host()
                    .vcs
                    .try_commit(&root, &output, &message)
                    .await,
            )
        } else {
            None
        };

        self.phase = SelectionPhase::Applied;
        Ok(ApplyReport {
            output,
            backed_up,
            commit,
        })
    }

    /// Build the render model. Settings and mapping are read fresh.
    pub async fn view(&self) -> SelectionView {
        let config = self.workspace.load_config().await;
        let mapping = read_mapping(
            self.workspace.fs(),
            self.workspace.root(),
            &config.composer.repo_config_path,
        )
        .await;
        let ids = self.selection.ordered_ids();

        SelectionView {
            phase: self.phase,
            selection: self.selection.clone(),
            mapping_status: MappingStatus::of(mapping.as_ref()),
            versions_header: mapping.as_ref().map(|m| m.versions_header(&ids)),
            output_path: config.composer.output_path,
            estimate: self.preview.as_ref().map(|p| p.estimate).unwrap_or_default(),
            preview: self.preview.as_ref().map(|p| p.merged.text.clone()),
            sections: self
                .preview
                .as_ref()
                .map(|p| p.merged.sections.clone())
                .unwrap_or_default(),
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
    use crate::fs::{LocalFs, backup_path};
    use crate::instruction::{AddOn, BaseId, InstructionId};
    use crate::vcs::VcsCapability;
    use composer_config::SETTINGS_FILE;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn workspace(root: Option<&Path>, bundle: Bundle) -> Workspace {
        let host = HostServices::new(Arc::new(LocalFs), VcsCapability::Unavailable, bundle);
        Workspace::new(root.map(Path::to_path_buf), host)
    }

    fn bundle() -> Bundle {
        Bundle::empty()
            .with(InstructionId::BaseShort, "SHORT")
            .with(InstructionId::Security, "SEC")
    }

    #[tokio::test]
    async fn test_starts_ready_with_default_selection() {
        let tmp = TempDir::new().unwrap();
        let ctl = SelectionController::new(workspace(Some(tmp.path()), bundle()));
        assert_eq!(ctl.phase(), SelectionPhase::Ready);
        assert_eq!(ctl.selection(), &SelectionState::default());
        assert!(ctl.preview().is_none());
    }

    #[tokio::test]
    async fn test_idle_rejects_everything_without_writing() {
        let mut ctl = SelectionController::new(workspace(None, bundle()));
        assert_eq!(ctl.phase(), SelectionPhase::Idle);

        let err = ctl
            .update_selection(SelectionState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ControllerError::NoProject));
        assert_eq!(err.to_string(), "Open a folder first.");

        assert!(matches!(
            ctl.apply(ApplyOptions::default()).await,
            Err(ControllerError::NoProject)
        ));
        assert_eq!(ctl.phase(), SelectionPhase::Idle);
    }

    #[tokio::test]
    async fn test_selection_change_computes_preview() {
        let tmp = TempDir::new().unwrap();
        let mut ctl = SelectionController::new(workspace(Some(tmp.path()), bundle()));

        let sel = SelectionState::default().with_add_on(AddOn::Security);
        let preview = ctl.update_selection(sel).await.unwrap();
        assert_eq!(preview.merged.text, "SHORT\n\n---\n\nSEC");
        assert_eq!(preview.estimate.chars, 15);
        assert_eq!(ctl.phase(), SelectionPhase::PreviewComputed);
    }

    #[tokio::test]
    async fn test_apply_writes_backs_up_and_returns_to_preview() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join(".github/copilot-instructions.md");
        tokio::fs::create_dir_all(out.parent().unwrap()).await.unwrap();
        tokio::fs::write(&out, "OLD").await.unwrap();

        let mut ctl = SelectionController::new(workspace(Some(tmp.path()), bundle()));
        ctl.update_selection(SelectionState::default()).await.unwrap();
        let report = ctl.apply(ApplyOptions::default()).await.unwrap();

        assert_eq!(report.output, out);
        assert!(report.backed_up);
        assert_eq!(report.commit, None);
        assert_eq!(tokio::fs::read_to_string(&out).await.unwrap(), "SHORT");
        assert_eq!(
            tokio::fs::read_to_string(backup_path(&out)).await.unwrap(),
            "OLD"
        );
        assert_eq!(ctl.phase(), SelectionPhase::Applied);

        ctl.update_selection(SelectionState::new(BaseId::Standard))
            .await
            .unwrap();
        assert_eq!(ctl.phase(), SelectionPhase::PreviewComputed);
    }

    #[tokio::test]
    async fn test_apply_from_ready_computes_preview_first() {
        let tmp = TempDir::new().unwrap();
        let mut ctl = SelectionController::new(workspace(Some(tmp.path()), bundle()));

        let report = ctl.apply(ApplyOptions::default()).await.unwrap();
        assert!(!report.backed_up);
        assert_eq!(
            tokio::fs::read_to_string(&report.output).await.unwrap(),
            "SHORT"
        );
    }

    #[tokio::test]
    async fn test_apply_honours_output_setting_and_auto_commit() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(SETTINGS_FILE),
            "[composer]\noutput_path = \"docs/ai/INSTRUCTIONS.md\"\nauto_commit = true\n",
        )
        .await
        .unwrap();

        let mut ctl = SelectionController::new(workspace(Some(tmp.path()), bundle()));
        let report = ctl.apply(ApplyOptions::default()).await.unwrap();

        assert_eq!(report.output, tmp.path().join("docs/ai/INSTRUCTIONS.md"));
        assert!(report.output.exists());
        // VCS is unavailable: the commit is skipped, the apply still succeeds.
        assert!(matches!(report.commit, Some(CommitOutcome::Skipped(_))));
    }

    #[tokio::test]
    async fn test_view_reports_mapping_and_preview() {
        let tmp = TempDir::new().unwrap();
        let mut ctl = SelectionController::new(workspace(Some(tmp.path()), bundle()));

        let view = ctl.view().await;
        assert_eq!(view.mapping_status, MappingStatus::Absent);
        assert_eq!(view.preview, None);
        assert_eq!(view.output_path, ".github/copilot-instructions.md");

        ctl.refresh().await.unwrap();
        let view = ctl.view().await;
        assert_eq!(view.preview.as_deref(), Some("SHORT"));
        assert_eq!(view.estimate.approx_tokens, 2);
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.versions_header, None);
    }
}
