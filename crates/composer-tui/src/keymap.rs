//! Vim-style keybinding system.
//!
//! Maps key events to actions. Supports single keys, the two-key `gg`
//! sequence, and a text-entry mode used while a form field is being edited.

use crossterm::event::KeyCode;

/// An action the TUI can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    OpenSelection,
    OpenConfig,
    NextPanel,
    PrevPanel,
    ClosePanel,

    // Form navigation
    CursorDown,
    CursorUp,
    /// Enter: select, toggle or start editing the row under the cursor.
    Activate,
    /// Space: select or toggle the row under the cursor.
    Toggle,

    // Panel commands
    Apply,
    SaveConfig,
    CreateSample,

    // Preview scrolling
    ScrollDown,
    ScrollUp,
    HalfPageDown,
    HalfPageUp,
    ScrollToTop,
    ScrollToBottom,

    // Text entry
    Input(char),
    Backspace,
    CommitEdit,
    CancelEdit,

    None,
}

/// How keys are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// A text field is open; printable keys are text.
    Editing,
}

/// Key mapper with support for multi-key sequences.
pub struct KeyMapper {
    /// Pending first key of a two-key sequence (the first `g` in `gg`).
    pending: Option<KeyCode>,
}

impl KeyMapper {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Feed a key code and return the resolved action.
    ///
    /// If the key starts a multi-key sequence, returns `Action::None` and
    /// waits for the next key. If the sequence is invalid, the pending key
    /// is discarded.
    pub fn resolve(&mut self, key: KeyCode, mode: InputMode) -> Action {
        if mode == InputMode::Editing {
            self.pending = None;
            return match key {
                KeyCode::Enter => Action::CommitEdit,
                KeyCode::Esc => Action::CancelEdit,
                KeyCode::Backspace => Action::Backspace,
                KeyCode::Char(c) => Action::Input(c),
                _ => Action::None,
            };
        }

        if let Some(prev) = self.pending.take() {
            return self.resolve_sequence(prev, key);
        }

        match key {
            KeyCode::Char('q') => Action::Quit,

            // Panels
            KeyCode::Char('s') => Action::OpenSelection,
            KeyCode::Char('c') => Action::OpenConfig,
            KeyCode::Tab => Action::NextPanel,
            KeyCode::BackTab => Action::PrevPanel,
            KeyCode::Char('x') => Action::ClosePanel,

            // Form
            KeyCode::Char('j') | KeyCode::Down => Action::CursorDown,
            KeyCode::Char('k') | KeyCode::Up => Action::CursorUp,
            KeyCode::Enter => Action::Activate,
            KeyCode::Char(' ') => Action::Toggle,
            KeyCode::Char('a') => Action::Apply,
            KeyCode::Char('w') => Action::SaveConfig,
            KeyCode::Char('n') => Action::CreateSample,

            // Preview scrolling
            KeyCode::Char('J') | KeyCode::PageDown => Action::ScrollDown,
            KeyCode::Char('K') | KeyCode::PageUp => Action::ScrollUp,
            KeyCode::Char('d') => Action::HalfPageDown,
            KeyCode::Char('u') => Action::HalfPageUp,
            KeyCode::Char('G') => Action::ScrollToBottom,

            // Start of multi-key sequence
            KeyCode::Char('g') => {
                self.pending = Some(key);
                Action::None
            }

            _ => Action::None,
        }
    }

    fn resolve_sequence(&mut self, first: KeyCode, second: KeyCode) -> Action {
        match (first, second) {
            (KeyCode::Char('g'), KeyCode::Char('g')) => Action::ScrollToTop,
            // Unknown sequence: treat the second key as a fresh keypress
            _ => self.resolve(second, InputMode::Normal),
        }
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn normal(km: &mut KeyMapper, key: KeyCode) -> Action {
        km.resolve(key, InputMode::Normal)
    }

    #[test]
    fn test_single_keys() {
        let mut km = KeyMapper::new();
        assert_eq!(normal(&mut km, KeyCode::Char('q')), Action::Quit);
        assert_eq!(normal(&mut km, KeyCode::Char('s')), Action::OpenSelection);
        assert_eq!(normal(&mut km, KeyCode::Char('c')), Action::OpenConfig);
        assert_eq!(normal(&mut km, KeyCode::Char('x')), Action::ClosePanel);
        assert_eq!(normal(&mut km, KeyCode::Tab), Action::NextPanel);
        assert_eq!(normal(&mut km, KeyCode::BackTab), Action::PrevPanel);
        assert_eq!(normal(&mut km, KeyCode::Char('j')), Action::CursorDown);
        assert_eq!(normal(&mut km, KeyCode::Char('k')), Action::CursorUp);
        assert_eq!(normal(&mut km, KeyCode::Char(' ')), Action::Toggle);
        assert_eq!(normal(&mut km, KeyCode::Enter), Action::Activate);
        assert_eq!(normal(&mut km, KeyCode::Char('a')), Action::Apply);
        assert_eq!(normal(&mut km, KeyCode::Char('w')), Action::SaveConfig);
        assert_eq!(normal(&mut km, KeyCode::Char('n')), Action::CreateSample);
    }

    #[test]
    fn test_scroll_keys() {
        let mut km = KeyMapper::new();
        assert_eq!(normal(&mut km, KeyCode::Char('J')), Action::ScrollDown);
        assert_eq!(normal(&mut km, KeyCode::Char('K')), Action::ScrollUp);
        assert_eq!(normal(&mut km, KeyCode::Char('d')), Action::HalfPageDown);
        assert_eq!(normal(&mut km, KeyCode::Char('u')), Action::HalfPageUp);
        assert_eq!(normal(&mut km, KeyCode::Char('G')), Action::ScrollToBottom);
    }

    #[test]
    fn test_gg_sequence() {
        let mut km = KeyMapper::new();
        assert_eq!(normal(&mut km, KeyCode::Char('g')), Action::None);
        assert_eq!(normal(&mut km, KeyCode::Char('g')), Action::ScrollToTop);
    }

    #[test]
    fn test_invalid_sequence_falls_through() {
        let mut km = KeyMapper::new();
        assert_eq!(normal(&mut km, KeyCode::Char('g')), Action::None);
        assert_eq!(normal(&mut km, KeyCode::Char('j')), Action::CursorDown);
    }

    #[test]
    fn test_editing_mode_treats_keys_as_text() {
        let mut km = KeyMapper::new();
        assert_eq!(km.resolve(KeyCode::Char('q'), InputMode::Editing), Action::Input('q'));
        assert_eq!(km.resolve(KeyCode::Char('g'), InputMode::Editing), Action::Input('g'));
        assert_eq!(km.resolve(KeyCode::Backspace, InputMode::Editing), Action::Backspace);
        assert_eq!(km.resolve(KeyCode::Enter, InputMode::Editing), Action::CommitEdit);
        assert_eq!(km.resolve(KeyCode::Esc, InputMode::Editing), Action::CancelEdit);
        assert_eq!(km.resolve(KeyCode::Tab, InputMode::Editing), Action::None);
    }

    #[test]
    fn test_editing_discards_pending_sequence() {
        let mut km = KeyMapper::new();
        assert_eq!(normal(&mut km, KeyCode::Char('g')), Action::None);
        assert_eq!(km.resolve(KeyCode::Char('g'), InputMode::Editing), Action::Input('g'));
        assert_eq!(normal(&mut km, KeyCode::Char('g')), Action::None);
    }
}
