//! Content resolution for a single instruction set.
//!
//! Order of precedence:
//! 1. `<project>/<repo_sets_dir>/<id>.md`
//! 2. the bundled default with the same stem
//! 3. the empty string
//!
//! Failures never propagate: a missing block degrades the merged document
//! instead of aborting it.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::bundle::Bundle;
use crate::fs::FileSystem;
use crate::instruction::InstructionId;

/// Where a resolved block came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A project-local override file.
    Override(PathBuf),
    /// The bundled default.
    Bundled,
    /// Neither exists; the block is empty.
    Missing,
}

impl ContentSource {
    pub fn label(&self) -> &'static str {
        match self {
            ContentSource::Override(_) => "override",
            ContentSource::Bundled => "bundled",
            ContentSource::Missing => "missing",
        }
    }
}

/// A block's text together with its origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBlock {
    pub id: InstructionId,
    pub source: ContentSource,
    pub text: String,
}

/// Resolves identifiers to text against one project and one bundle.
pub struct ContentResolver<'a> {
    fs: &'a dyn FileSystem,
    bundle: &'a Bundle,
    /// Absolute override directory, or `None` outside a project.
    sets_dir: Option<PathBuf>,
}

impl<'a> ContentResolver<'a> {
    /// `project_root` is `None` when no project is open; only the bundle is
    /// consulted then.
    pub fn new(
        fs: &'a dyn FileSystem,
        bundle: &'a Bundle,
        project_root: Option<&Path>,
        repo_sets_dir: &str,
    ) -> Self {
        Self {
            fs,
            bundle,
            sets_dir: project_root.map(|root| root.join(repo_sets_dir)),
        }
    }

    /// Path of the override file for `id`, if a project is open.
    pub fn override_path(&self, id: InstructionId) -> Option<PathBuf> {
        self.sets_dir.as_ref().map(|dir| dir.join(id.file_name()))
    }

    /// Resolve `id` and report where the text came from.
    pub async fn resolve_block(&self, id: InstructionId) -> ResolvedBlock {
        if let Some(path) = self.override_path(id) {
            match self.fs.read_to_string(&path).await {
                Ok(text) => {
                    debug!(%id, path = %path.display(), "Using project override");
                    return ResolvedBlock {
                        id,
                        source: ContentSource::Override(path),
                        text,
                    };
                }
                Err(e) => {
                    trace!(%id, path = %path.display(), error = %e, "No usable override");
                }
            }
        }

        match self.bundle.get(id) {
            Some(text) => ResolvedBlock {
                id,
                source: ContentSource::Bundled,
                text: text.to_string(),
            },
            None => {
                debug!(%id, "No override or bundled template, using empty block");
                ResolvedBlock {
                    id,
                    source: ContentSource::Missing,
                    text: String::new(),
                }
            }
        }
    }

    /// Resolve `id` to its text.
    pub async fn resolve(&self, id: InstructionId) -> String {
        self.resolve_block(id).await.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const SETS: &str = ".github/instruction-sets";

    async fn write_override(root: &Path, id: InstructionId, text: &str) {
        let dir = root.join(SETS);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join(id.file_name()), text).await.unwrap();
    }

    #[tokio::test]
    async fn test_override_wins_over_bundle() {
        let tmp = TempDir::new().unwrap();
        write_override(tmp.path(), InstructionId::BaseShort, "project text").await;
        let bundle = Bundle::empty().with(InstructionId::BaseShort, "bundled text");

        let resolver = ContentResolver::new(&LocalFs, &bundle, Some(tmp.path()), SETS);
        let block = resolver.resolve_block(InstructionId::BaseShort).await;

        assert_eq!(block.text, "project text");
        assert!(matches!(block.source, ContentSource::Override(_)));
    }

    #[tokio::test]
    async fn test_falls_back_to_bundle() {
        let tmp = TempDir::new().unwrap();
        let bundle = Bundle::empty().with(InstructionId::Security, "bundled security");

        let resolver = ContentResolver::new(&LocalFs, &bundle, Some(tmp.path()), SETS);
        let block = resolver.resolve_block(InstructionId::Security).await;

        assert_eq!(block.text, "bundled security");
        assert_eq!(block.source, ContentSource::Bundled);
    }

    #[tokio::test]
    async fn test_missing_everywhere_is_empty() {
        let tmp = TempDir::new().unwrap();
        let bundle = Bundle::empty();

        let resolver = ContentResolver::new(&LocalFs, &bundle, Some(tmp.path()), SETS);
        let block = resolver.resolve_block(InstructionId::Performance).await;

        assert_eq!(block.text, "");
        assert_eq!(block.source, ContentSource::Missing);
    }

    #[tokio::test]
    async fn test_no_project_uses_bundle_only() {
        let bundle = Bundle::empty().with(InstructionId::CodeReview, "review");
        let resolver = ContentResolver::new(&LocalFs, &bundle, None, SETS);

        assert!(resolver.override_path(InstructionId::CodeReview).is_none());
        assert_eq!(resolver.resolve(InstructionId::CodeReview).await, "review");
    }

    #[tokio::test]
    async fn test_override_returned_verbatim() {
        let tmp = TempDir::new().unwrap();
        let raw = "  leading space\r\ntrailing newline\n\n";
        write_override(tmp.path(), InstructionId::PythonDs, raw).await;

        let bundle = Bundle::empty();
        let resolver = ContentResolver::new(&LocalFs, &bundle, Some(tmp.path()), SETS);
        assert_eq!(resolver.resolve(InstructionId::PythonDs).await, raw);
    }
}
