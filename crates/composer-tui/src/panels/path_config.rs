//! Path Config panel: edit the workspace settings.

use composer_config::ComposerSettings;
use composer_core::{ConfigView, PanelMessage};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};

/// One field of the settings form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    RepoConfigPath,
    RepoSetsDir,
    OutputPath,
    AutoCommit,
}

impl ConfigField {
    pub const ALL: [ConfigField; 4] = [
        ConfigField::RepoConfigPath,
        ConfigField::RepoSetsDir,
        ConfigField::OutputPath,
        ConfigField::AutoCommit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ConfigField::RepoConfigPath => "Mapping file",
            ConfigField::RepoSetsDir => "Overrides dir",
            ConfigField::OutputPath => "Output file",
            ConfigField::AutoCommit => "Auto-commit",
        }
    }

    fn is_text(self) -> bool {
        self != ConfigField::AutoCommit
    }
}

/// The settings form. Edits stay local until saved with `w`.
pub struct PathConfigPanel {
    form: ComposerSettings,
    cursor: usize,
    /// Text being typed into the field under the cursor.
    editing: Option<String>,
    /// Unsaved local changes; fresh views do not overwrite them.
    dirty: bool,
    view: Option<ConfigView>,
}

impl PathConfigPanel {
    pub fn new() -> Self {
        Self {
            form: ComposerSettings::default(),
            cursor: 0,
            editing: None,
            dirty: false,
            view: None,
        }
    }

    #[cfg(test)]
    pub fn form(&self) -> &ComposerSettings {
        &self.form
    }

    pub fn cursor_field(&self) -> ConfigField {
        ConfigField::ALL[self.cursor]
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn cursor_down(&mut self) {
        self.cursor = (self.cursor + 1).min(ConfigField::ALL.len() - 1);
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Enter on a text field starts editing it; on the checkbox it toggles.
    pub fn activate(&mut self) {
        let field = self.cursor_field();
        if field.is_text() {
            self.editing = Some(self.value(field).to_string());
        } else {
            self.toggle_auto_commit();
        }
    }

    pub fn toggle_auto_commit(&mut self) {
        self.form.auto_commit = !self.form.auto_commit;
        self.dirty = true;
    }

    pub fn input(&mut self, c: char) {
        if let Some(buf) = &mut self.editing {
            buf.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buf) = &mut self.editing {
            buf.pop();
        }
    }

    /// Store the edit buffer in the form.
    pub fn commit_edit(&mut self) {
        let Some(text) = self.editing.take() else {
            return;
        };
        let text = text.trim().to_string();
        match self.cursor_field() {
            ConfigField::RepoConfigPath => self.form.repo_config_path = text,
            ConfigField::RepoSetsDir => self.form.repo_sets_dir = text,
            ConfigField::OutputPath => self.form.output_path = text,
            ConfigField::AutoCommit => return,
        }
        self.dirty = true;
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// The `SAVE_CONFIG` message for the current form. The form stays dirty
    /// until [`PathConfigPanel::mark_saved`].
    pub fn save_message(&self) -> PanelMessage {
        PanelMessage::SaveConfig {
            repo_config_path: self.form.repo_config_path.clone(),
            repo_sets_dir: self.form.repo_sets_dir.clone(),
            output_path: self.form.output_path.clone(),
            auto_commit: self.form.auto_commit,
        }
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    /// Take a fresh view. Unsaved edits are kept.
    pub fn set_view(&mut self, view: ConfigView) {
        if !self.dirty && self.editing.is_none() {
            self.form = view.settings.clone();
        }
        self.view = Some(view);
    }

    fn value(&self, field: ConfigField) -> &str {
        match field {
            ConfigField::RepoConfigPath => &self.form.repo_config_path,
            ConfigField::RepoSetsDir => &self.form.repo_sets_dir,
            ConfigField::OutputPath => &self.form.output_path,
            ConfigField::AutoCommit => {
                if self.form.auto_commit {
                    "[x]"
                } else {
                    "[ ]"
                }
            }
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut lines = Vec::new();
        for (i, field) in ConfigField::ALL.into_iter().enumerate() {
            let selected = i == self.cursor;
            let value = match (&self.editing, selected) {
                (Some(buf), true) => format!("{buf}▏"),
                _ => self.value(field).to_string(),
            };
            let value_style = if selected && self.editing.is_some() {
                Style::default().fg(Color::Black).bg(Color::Yellow)
            } else if selected {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Green)
            };
            lines.push(Line::from(vec![
                Span::styled(
                    format!(" {:<14}", field.label()),
                    Style::default().fg(Color::Yellow),
                ),
                Span::styled(value, value_style),
            ]));
        }

        lines.push(Line::from(""));
        if let Some(view) = &self.view {
            lines.push(Line::from(vec![
                Span::styled(" Mapping:  ", Style::default().fg(Color::DarkGray)),
                Span::raw(view.mapping_status.label()),
            ]));
            let settings_path = view
                .settings_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(no project)".to_string());
            lines.push(Line::from(vec![
                Span::styled(" Saved in: ", Style::default().fg(Color::DarkGray)),
                Span::raw(settings_path),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            " Enter: edit  Space: toggle  w: save  n: sample mapping",
            Style::default().fg(Color::DarkGray),
        )));

        let title = if self.is_dirty() {
            " Path Config [modified] "
        } else {
            " Path Config "
        };
        let form = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
        frame.render_widget(form, area);
    }
}

impl Default for PathConfigPanel {
    fn default() -> Self {
        Self::new()
    }
}
