#![deny(unsafe_code)]

//! Copilot instructions composer core.
//!
//! Resolves instruction sets (per-project overrides first, bundled defaults
//! second), merges a base plus add-ons into one document, estimates its token
//! cost and writes it to the project's instruction file with a backup and an
//! optional commit. Front ends (CLI, TUI) drive it through [`Session`] or the
//! controllers directly.

use std::future::Future;
use std::pin::Pin;

/// A boxed `Send` future, the return type of the object-safe capability
/// traits ([`FileSystem`], [`VersionControl`]).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Bundled default instruction templates.
pub mod bundle;
/// Panel controllers and host services.
pub mod controller;
/// File-system capability and backups.
pub mod fs;
/// Instruction identifiers and the selection model.
pub mod instruction;
/// In-memory activity log fed by tracing.
pub mod logging;
/// Optional per-project mapping document.
pub mod mapping;
/// Merging resolved blocks into one document.
pub mod merge;
/// Panel message protocol.
pub mod message;
/// One-instance-per-kind panel registry.
pub mod registry;
/// Override-then-bundle content resolution.
pub mod resolver;
/// Message routing between panels and controllers.
pub mod session;
/// Workspace settings persistence.
pub mod settings;
/// Token estimation.
pub mod tokens;
/// Version control capability.
pub mod vcs;

pub use bundle::Bundle;
pub use controller::{
    ApplyOptions, ApplyReport, ConfigView, ControllerError, HostServices, PathConfigController,
    SelectionController, SelectionPhase, SelectionView, Workspace,
};
pub use fs::{FileSystem, LocalFs};
pub use instruction::{AddOn, BaseId, InstructionId, SelectionState};
pub use logging::{ActivityEntry, ActivityLog};
pub use mapping::{InstructionMapping, MappingStatus};
pub use merge::{MergedDocument, merge};
pub use message::{Notice, PanelMessage};
pub use registry::{OpenOutcome, PanelKind, PanelRegistry};
pub use resolver::{ContentResolver, ContentSource};
pub use session::{Session, SessionRequest, SessionUpdate};
pub use tokens::{TokenEstimate, estimate};
pub use vcs::{CommitOutcome, GitCli, VcsCapability, VersionControl};
