//! Merge engine: selected blocks, canonical order, one separator between.

use tracing::debug;

use crate::instruction::{InstructionId, SelectionState};
use crate::resolver::{ContentResolver, ContentSource};

/// Visible separator placed between consecutive blocks.
pub const SEPARATOR: &str = "\n\n---\n\n";

/// One slot of a merged document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSection {
    pub id: InstructionId,
    pub source: ContentSource,
}

/// The merged text plus the provenance of each slot, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedDocument {
    pub sections: Vec<MergedSection>,
    pub text: String,
}

/// Merge the blocks selected in `selection`.
///
/// The base comes first, then add-ons in declared order. Empty blocks keep
/// their slot, so a document of `n` sections always has `n - 1` separators.
pub async fn merge(resolver: &ContentResolver<'_>, selection: &SelectionState) -> MergedDocument {
    merge_ids(resolver, &selection.ordered_ids()).await
}

/// Merge an explicit, already ordered list of identifiers.
pub async fn merge_ids(resolver: &ContentResolver<'_>, ids: &[InstructionId]) -> MergedDocument {
    let mut sections = Vec::with_capacity(ids.len());
    let mut blocks = Vec::with_capacity(ids.len());
    for &id in ids {
        let block = resolver.resolve_block(id).await;
        sections.push(MergedSection {
            id,
            source: block.source,
        });
        blocks.push(block.text);
    }

    let text = blocks.join(SEPARATOR);
    debug!(sections = sections.len(), bytes = text.len(), "Merged instruction sets");
    MergedDocument { sections, text }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::Bundle;
    use crate::fs::LocalFs;
    use crate::instruction::{AddOn, BaseId};
    use pretty_assertions::assert_eq;

    fn full_bundle() -> Bundle {
        Bundle::empty()
            .with(InstructionId::BaseShort, "BASE-S")
            .with(InstructionId::BaseStandard, "BASE-L")
            .with(InstructionId::CodeReview, "REVIEW")
            .with(InstructionId::Security, "SEC")
            .with(InstructionId::Performance, "PERF")
            .with(InstructionId::PythonDs, "PYDS")
    }

    #[tokio::test]
    async fn test_base_only() {
        let bundle = full_bundle();
        let resolver = ContentResolver::new(&LocalFs, &bundle, None, "sets");
        let doc = merge(&resolver, &SelectionState::default()).await;
        assert_eq!(doc.text, "BASE-S");
        assert_eq!(doc.sections.len(), 1);
    }

    #[tokio::test]
    async fn test_canonical_order() {
        let bundle = full_bundle();
        let resolver = ContentResolver::new(&LocalFs, &bundle, None, "sets");
        let mut sel = SelectionState::new(BaseId::Standard);
        sel.toggle(AddOn::PythonDs);
        sel.toggle(AddOn::CodeReview);
        sel.toggle(AddOn::Performance);

        let doc = merge(&resolver, &sel).await;
        assert_eq!(doc.text, "BASE-L\n\n---\n\nREVIEW\n\n---\n\nPERF\n\n---\n\nPYDS");
    }

    #[tokio::test]
    async fn test_empty_block_keeps_slot() {
        let bundle = Bundle::empty().with(InstructionId::BaseShort, "A");
        let resolver = ContentResolver::new(&LocalFs, &bundle, None, "sets");
        let sel = SelectionState::default().with_add_on(AddOn::Security);

        let doc = merge(&resolver, &sel).await;
        assert_eq!(doc.text, "A\n\n---\n\n");
        assert_eq!(doc.sections[1].source, ContentSource::Missing);
    }

    #[tokio::test]
    async fn test_separator_count() {
        let bundle = Bundle::empty();
        let resolver = ContentResolver::new(&LocalFs, &bundle, None, "sets");
        let mut sel = SelectionState::default();
        for add_on in AddOn::ALL {
            sel.toggle(add_on);
        }

        let doc = merge(&resolver, &sel).await;
        assert_eq!(doc.text.matches(SEPARATOR).count(), 4);
    }
}
