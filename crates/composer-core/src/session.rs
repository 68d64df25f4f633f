//! Session: the panel registry plus message routing.
//!
//! A front end opens and closes panels and posts [`PanelMessage`]s; the
//! session hands each message to the controller of the panel it targets
//! and answers with a [`SessionUpdate`] to re-render from. Operations run
//! one at a time because every entry point takes `&mut self`.

use composer_config::ComposerSettings;
use tracing::{debug, warn};

use crate::controller::{
    ApplyOptions, ApplyReport, ConfigView, ControllerError, PathConfigController,
    SelectionController, SelectionView, Workspace,
};
use crate::message::{Notice, PanelMessage};
use crate::registry::{OpenOutcome, PanelKind, PanelRegistry};
use crate::vcs::CommitOutcome;

/// A live panel's controller.
pub enum PanelController {
    Selection(SelectionController),
    PathConfig(PathConfigController),
}

impl PanelController {
    pub fn create(kind: PanelKind, workspace: Workspace) -> Self {
        match kind {
            PanelKind::InstructionSelection => {
                PanelController::Selection(SelectionController::new(workspace))
            }
            PanelKind::PathConfig => PanelController::PathConfig(PathConfigController::new(workspace)),
        }
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            PanelController::Selection(_) => PanelKind::InstructionSelection,
            PanelController::PathConfig(_) => PanelKind::PathConfig,
        }
    }

    /// Handle one message addressed to this panel.
    pub async fn handle(&mut self, message: PanelMessage) -> Result<Notice, ControllerError> {
        match (self, message) {
            (PanelController::Selection(ctl), PanelMessage::UpdateSelection { selection }) => {
                let preview = ctl.update_selection(selection).await?;
                Ok(Notice::Info(format!("Preview updated: {}", preview.estimate)))
            }
            (PanelController::Selection(ctl), PanelMessage::Apply) => {
                let report = ctl.apply(ApplyOptions::default()).await?;
                Ok(Notice::Info(apply_notice(&report)))
            }
            (
                PanelController::PathConfig(ctl),
                PanelMessage::SaveConfig {
                    repo_config_path,
                    repo_sets_dir,
                    output_path,
                    auto_commit,
                },
            ) => {
                ctl.save(ComposerSettings {
                    repo_config_path,
                    repo_sets_dir,
                    output_path,
                    auto_commit,
                })
                .await?;
                Ok(Notice::Info("Saved workspace settings.".to_string()))
            }
            (PanelController::PathConfig(ctl), PanelMessage::CreateSampleConfig) => {
                let path = ctl.create_sample_mapping().await?;
                Ok(Notice::Info(format!(
                    "Wrote sample mapping to {}",
                    path.display()
                )))
            }
            (panel, message) => Err(ControllerError::Misrouted {
                message: message.kind(),
                panel: panel.kind().title(),
            }),
        }
    }
}

/// User-facing summary of an apply. Skipped commits are not mentioned.
pub fn apply_notice(report: &ApplyReport) -> String {
    let mut text = format!("Applied instruction file to {}", report.output.display());
    if report.backed_up {
        text.push_str(" (previous version saved as .bak)");
    }
    if report.commit == Some(CommitOutcome::Committed) {
        text.push_str(", committed");
    }
    text
}

/// Result of a session operation, ready to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionUpdate {
    pub notice: Option<Notice>,
    /// Fresh view of the selection panel, if it is open.
    pub selection: Option<SelectionView>,
    /// Fresh view of the path config panel, if it is open.
    pub config: Option<ConfigView>,
}

/// Work a front end queues for the session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionRequest {
    Open(PanelKind),
    Close(PanelKind),
    Message(PanelMessage),
}

/// Routes panel messages to controllers held in a [`PanelRegistry`].
pub struct Session {
    workspace: Workspace,
    panels: PanelRegistry<PanelController>,
}

impl Session {
    pub fn new(workspace: Workspace) -> Self {
        Self {
            workspace,
            panels: PanelRegistry::new(),
        }
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Open a panel, or reveal it if it is already open.
    pub fn open(&mut self, kind: PanelKind) -> OpenOutcome {
        let workspace = self.workspace.clone();
        let outcome = self
            .panels
            .open(kind, || PanelController::create(kind, workspace));
        debug!(panel = kind.title(), ?outcome, "Panel opened");
        outcome
    }

    /// Close a panel, discarding its in-memory state.
    pub fn close(&mut self, kind: PanelKind) -> bool {
        self.panels.dispose(kind).is_some()
    }

    pub fn is_open(&self, kind: PanelKind) -> bool {
        self.panels.is_open(kind)
    }

    pub fn focused(&self) -> Option<PanelKind> {
        self.panels.focused()
    }

    /// Route `message` to its panel, creating the panel if needed.
    pub async fn handle(&mut self, message: PanelMessage) -> Result<Notice, ControllerError> {
        let kind = message.target();
        let workspace = self.workspace.clone();
        let panel = self
            .panels
            .get_or_insert_with(kind, || PanelController::create(kind, workspace));
        debug!(message = message.kind(), panel = kind.title(), "Dispatching panel message");
        panel.handle(message).await
    }

    /// Handle `message` and return the notice plus refreshed views. Errors
    /// become error notices.
    pub async fn dispatch(&mut self, message: PanelMessage) -> SessionUpdate {
        let kind = message.kind();
        let notice = match self.handle(message).await {
            Ok(notice) => notice,
            Err(e) => {
                warn!(message = kind, error = %e, "Panel message failed");
                Notice::Error(e.to_string())
            }
        };
        let mut update = self.views().await;
        update.notice = Some(notice);
        update
    }

    /// Run one queued request.
    pub async fn process(&mut self, request: SessionRequest) -> SessionUpdate {
        match request {
            SessionRequest::Open(kind) => {
                self.open(kind);
                self.views().await
            }
            SessionRequest::Close(kind) => {
                self.close(kind);
                self.views().await
            }
            SessionRequest::Message(message) => self.dispatch(message).await,
        }
    }

    /// Current views of every open panel.
    pub async fn views(&self) -> SessionUpdate {
        let mut update = SessionUpdate::default();
        for kind in self.panels.open_kinds() {
            match self.panels.get(kind) {
                Some(PanelController::Selection(ctl)) => update.selection = Some(ctl.view().await),
                Some(PanelController::PathConfig(ctl)) => update.config = Some(ctl.view().await),
                None => {}
            }
        }
        update
    }
}
