//! Panel registry: at most one live instance per panel kind.
//!
//! Opening a kind that is already open reveals (focuses) the existing
//! instance instead of creating a second one. Disposing drops the instance
//! together with whatever in-memory state it held.

use std::collections::BTreeMap;

/// The panels the composer can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelKind {
    InstructionSelection,
    PathConfig,
}

impl PanelKind {
    pub fn title(self) -> &'static str {
        match self {
            PanelKind::InstructionSelection => "Instruction Selection",
            PanelKind::PathConfig => "Path Config",
        }
    }
}

/// What [`PanelRegistry::open`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    Created,
    Revealed,
}

/// Registry of live panel instances keyed by kind.
#[derive(Debug)]
pub struct PanelRegistry<P> {
    panels: BTreeMap<PanelKind, P>,
    focused: Option<PanelKind>,
}

impl<P> PanelRegistry<P> {
    pub fn new() -> Self {
        Self {
            panels: BTreeMap::new(),
            focused: None,
        }
    }

    /// Create the panel with `create` unless one of this kind is already
    /// live; either way it becomes focused.
    pub fn open(&mut self, kind: PanelKind, create: impl FnOnce() -> P) -> OpenOutcome {
        self.focused = Some(kind);
        if self.panels.contains_key(&kind) {
            OpenOutcome::Revealed
        } else {
            self.panels.insert(kind, create());
            OpenOutcome::Created
        }
    }

    /// The live panel of this kind, creating it without moving focus.
    pub fn get_or_insert_with(&mut self, kind: PanelKind, create: impl FnOnce() -> P) -> &mut P {
        self.panels.entry(kind).or_insert_with(create)
    }

    /// Drop the panel of this kind. Focus moves to another open panel.
    pub fn dispose(&mut self, kind: PanelKind) -> Option<P> {
        let removed = self.panels.remove(&kind);
        if self.focused == Some(kind) {
            self.focused = self.panels.keys().next().copied();
        }
        removed
    }

    pub fn get(&self, kind: PanelKind) -> Option<&P> {
        self.panels.get(&kind)
    }

    pub fn get_mut(&mut self, kind: PanelKind) -> Option<&mut P> {
        self.panels.get_mut(&kind)
    }

    pub fn is_open(&self, kind: PanelKind) -> bool {
        self.panels.contains_key(&kind)
    }

    pub fn focused(&self) -> Option<PanelKind> {
        self.focused
    }

    pub fn focused_mut(&mut self) -> Option<(PanelKind, &mut P)> {
        let kind = self.focused?;
        self.panels.get_mut(&kind).map(|p| (kind, p))
    }

    /// Open kinds in display order.
    pub fn open_kinds(&self) -> Vec<PanelKind> {
        self.panels.keys().copied().collect()
    }

    /// Move focus to the next open panel, wrapping around.
    pub fn focus_next(&mut self) {
        self.cycle(1);
    }

    /// Move focus to the previous open panel, wrapping around.
    pub fn focus_prev(&mut self) {
        let len = self.panels.len();
        if len > 0 {
            self.cycle(len - 1);
        }
    }

    fn cycle(&mut self, step: usize) {
        let kinds = self.open_kinds();
        if kinds.is_empty() {
            self.focused = None;
            return;
        }
        let current = self
            .focused
            .and_then(|k| kinds.iter().position(|&o| o == k))
            .unwrap_or(0);
        self.focused = Some(kinds[(current + step) % kinds.len()]);
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }
}

impl<P> Default for PanelRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_open_creates_once() {
        let mut registry = PanelRegistry::new();
        let mut created = 0;
        assert_eq!(
            registry.open(PanelKind::InstructionSelection, || {
                created += 1;
                "first"
            }),
            OpenOutcome::Created
        );
        assert_eq!(
            registry.open(PanelKind::InstructionSelection, || "second"),
            OpenOutcome::Revealed
        );
        assert_eq!(created, 1);
        assert_eq!(registry.get(PanelKind::InstructionSelection), Some(&"first"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_open_focuses() {
        let mut registry = PanelRegistry::new();
        registry.open(PanelKind::InstructionSelection, || 1);
        registry.open(PanelKind::PathConfig, || 2);
        assert_eq!(registry.focused(), Some(PanelKind::PathConfig));

        registry.open(PanelKind::InstructionSelection, || 3);
        assert_eq!(registry.focused(), Some(PanelKind::InstructionSelection));
    }

    #[test]
    fn test_dispose_moves_focus() {
        let mut registry = PanelRegistry::new();
        registry.open(PanelKind::InstructionSelection, || 1);
        registry.open(PanelKind::PathConfig, || 2);

        assert_eq!(registry.dispose(PanelKind::PathConfig), Some(2));
        assert_eq!(registry.focused(), Some(PanelKind::InstructionSelection));

        assert_eq!(registry.dispose(PanelKind::InstructionSelection), Some(1));
        assert_eq!(registry.focused(), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_dispose_then_open_creates_fresh() {
        let mut registry = PanelRegistry::new();
        registry.open(PanelKind::PathConfig, || "old");
        registry.dispose(PanelKind::PathConfig);
        assert_eq!(
            registry.open(PanelKind::PathConfig, || "new"),
            OpenOutcome::Created
        );
        assert_eq!(registry.get(PanelKind::PathConfig), Some(&"new"));
    }

    #[test]
    fn test_focus_cycles() {
        let mut registry = PanelRegistry::new();
        registry.focus_next();
        assert_eq!(registry.focused(), None);

        registry.open(PanelKind::InstructionSelection, || ());
        registry.open(PanelKind::PathConfig, || ());

        registry.focus_next();
        assert_eq!(registry.focused(), Some(PanelKind::InstructionSelection));
        registry.focus_next();
        assert_eq!(registry.focused(), Some(PanelKind::PathConfig));
        registry.focus_prev();
        assert_eq!(registry.focused(), Some(PanelKind::InstructionSelection));
    }
}
