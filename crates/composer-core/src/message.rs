//! Panel ↔ controller message protocol.
//!
//! Messages are fire-and-forget: the controller answers with a [`Notice`]
//! and the panel re-renders from fresh views.

use serde::{Deserialize, Serialize};

use crate::instruction::SelectionState;
use crate::registry::PanelKind;

/// A message posted by a panel.
///
/// JSON form: `{"type": "UPDATE_SELECTION", "selection": {...}}`,
/// `{"type": "APPLY"}`, `{"type": "SAVE_CONFIG", "repoConfigPath": ...}`,
/// `{"type": "CREATE_SAMPLE_CONFIG"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PanelMessage {
    UpdateSelection {
        selection: SelectionState,
    },
    Apply,
    #[serde(rename_all = "camelCase")]
    SaveConfig {
        repo_config_path: String,
        repo_sets_dir: String,
        output_path: String,
        #[serde(default)]
        auto_commit: bool,
    },
    CreateSampleConfig,
}

impl PanelMessage {
    /// Decode a JSON message.
    pub fn decode(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The panel whose controller handles this message.
    pub fn target(&self) -> PanelKind {
        match self {
            PanelMessage::UpdateSelection { .. } | PanelMessage::Apply => {
                PanelKind::InstructionSelection
            }
            PanelMessage::SaveConfig { .. } | PanelMessage::CreateSampleConfig => {
                PanelKind::PathConfig
            }
        }
    }

    /// Wire name of the message type.
    pub fn kind(&self) -> &'static str {
        match self {
            PanelMessage::UpdateSelection { .. } => "UPDATE_SELECTION",
            PanelMessage::Apply => "APPLY",
            PanelMessage::SaveConfig { .. } => "SAVE_CONFIG",
            PanelMessage::CreateSampleConfig => "CREATE_SAMPLE_CONFIG",
        }
    }
}

/// User-visible outcome of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}
