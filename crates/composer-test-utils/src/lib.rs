#![deny(unsafe_code)]

//! Shared test utilities for the Copilot Composer workspace.
//!
//! In-memory capability doubles, settings builders and temp-dir projects,
//! so individual crate tests stay short.
//!
//! Add this crate as a `[dev-dependency]` in any workspace member:
//!
//! ```toml
//! [dev-dependencies]
//! composer-test-utils = { workspace = true }
//! ```

pub mod config;
pub mod memory_fs;
pub mod project;
pub mod recording_vcs;

pub use config::TestConfigBuilder;
pub use memory_fs::MemoryFs;
pub use project::TestProject;
pub use recording_vcs::{RecordingVcs, VcsCall};
