//! Optional instruction mapping document.
//!
//! The mapping lists known identifiers with a version and a repo-relative
//! path. It is advisory: it drives the status indicator and the versions
//! header in the preview, and is never checked against the actual files.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fs::FileSystem;
use crate::instruction::InstructionId;

/// Version written for every identifier in the sample mapping.
pub const SAMPLE_VERSION: &str = "v1.0.0";

/// Parsed mapping document.
///
/// Keys are plain strings so unknown identifiers survive parsing. Both
/// tables default to empty, so an object with the wrong field names parses
/// and simply reports as incomplete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionMapping {
    #[serde(default)]
    pub versions: BTreeMap<String, String>,
    #[serde(default)]
    pub paths: BTreeMap<String, String>,
}

impl InstructionMapping {
    /// A mapping describing every identifier at [`SAMPLE_VERSION`], with paths
    /// under `repo_sets_dir`.
    pub fn sample(repo_sets_dir: &str) -> Self {
        let dir = repo_sets_dir.trim_end_matches('/');
        let mut mapping = Self::default();
        for id in InstructionId::ALL {
            mapping
                .versions
                .insert(id.as_str().to_string(), SAMPLE_VERSION.to_string());
            mapping
                .paths
                .insert(id.as_str().to_string(), format!("{dir}/{}", id.file_name()));
        }
        mapping
    }

    pub fn version(&self, id: InstructionId) -> Option<&str> {
        self.versions.get(id.as_str()).map(String::as_str)
    }

    pub fn path(&self, id: InstructionId) -> Option<&str> {
        self.paths.get(id.as_str()).map(String::as_str)
    }

    /// Identifiers lacking a version or a path entry.
    pub fn missing(&self) -> Vec<InstructionId> {
        InstructionId::ALL
            .into_iter()
            .filter(|&id| self.version(id).is_none() || self.path(id).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }

    /// One `id: version` line per identifier in `ids`; unknown versions show `?`.
    pub fn versions_header(&self, ids: &[InstructionId]) -> String {
        ids.iter()
            .map(|&id| format!("{id}: {}", self.version(id).unwrap_or("?")))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse a mapping document. Anything but a JSON object is `None`.
    pub fn from_json(text: &str) -> Option<Self> {
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) if value.is_object() => serde_json::from_value(value).ok(),
            _ => None,
        }
    }

    /// Pretty JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> String {
        let mut text = serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string());
        text.push('\n');
        text
    }
}

/// Read and parse the mapping at `path` relative to `project_root`.
///
/// Returns `None` when there is no project, the file cannot be read, or it
/// is not a JSON object. Never fails.
pub async fn read_mapping(
    fs: &dyn FileSystem,
    project_root: Option<&Path>,
    path: &str,
) -> Option<InstructionMapping> {
    let full = project_root?.join(path);
    let text = match fs.read_to_string(&full).await {
        Ok(text) => text,
        Err(e) => {
            debug!(path = %full.display(), error = %e, "No mapping file");
            return None;
        }
    };
    let mapping = InstructionMapping::from_json(&text);
    if mapping.is_none() {
        debug!(path = %full.display(), "Mapping file is not a JSON object");
    }
    mapping
}

/// Status indicator derived from the mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingStatus {
    Absent,
    Loaded { complete: bool },
}

impl MappingStatus {
    pub fn of(mapping: Option<&InstructionMapping>) -> Self {
        match mapping {
            None => MappingStatus::Absent,
            Some(m) => MappingStatus::Loaded {
                complete: m.is_complete(),
            },
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MappingStatus::Absent => "No mapping (optional)",
            MappingStatus::Loaded { complete: true } => "Mapping loaded",
            MappingStatus::Loaded { complete: false } => "Mapping loaded (incomplete)",
        }
    }
}
