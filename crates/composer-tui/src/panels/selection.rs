//! Instruction Selection panel: the base/add-on form and the live preview.

use composer_core::{AddOn, BaseId, SelectionPhase, SelectionState, SelectionView};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::PanelState;

/// One row of the selection form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRow {
    Base(BaseId),
    AddOn(AddOn),
}

impl SelectionRow {
    /// Form order: the two bases, then add-ons in canonical order.
    pub const ALL: [SelectionRow; 6] = [
        SelectionRow::Base(BaseId::Short),
        SelectionRow::Base(BaseId::Standard),
        SelectionRow::AddOn(AddOn::CodeReview),
        SelectionRow::AddOn(AddOn::Security),
        SelectionRow::AddOn(AddOn::Performance),
        SelectionRow::AddOn(AddOn::PythonDs),
    ];

    fn label(self) -> &'static str {
        match self {
            SelectionRow::Base(b) => b.id().label(),
            SelectionRow::AddOn(a) => a.id().label(),
        }
    }
}

/// Form state plus the last view received from the controller.
pub struct SelectionPanel {
    selection: SelectionState,
    cursor: usize,
    view: Option<SelectionView>,
    /// Preview lines, header included.
    lines: Vec<String>,
    scroll_offset: usize,
}

impl SelectionPanel {
    pub fn new() -> Self {
        Self {
            selection: SelectionState::default(),
            cursor: 0,
            view: None,
            lines: Vec::new(),
            scroll_offset: 0,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn cursor_row(&self) -> SelectionRow {
        SelectionRow::ALL[self.cursor]
    }

    pub fn cursor_down(&mut self) {
        self.cursor = (self.cursor + 1).min(SelectionRow::ALL.len() - 1);
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Select the base or toggle the add-on under the cursor. Returns the
    /// new selection if it changed.
    pub fn activate(&mut self) -> Option<SelectionState> {
        match self.cursor_row() {
            SelectionRow::Base(base) if base == self.selection.base => return None,
            SelectionRow::Base(base) => self.selection.base = base,
            SelectionRow::AddOn(add_on) => {
                self.selection.toggle(add_on);
            }
        }
        Some(self.selection.clone())
    }

    /// Take a fresh view from the controller.
    pub fn set_view(&mut self, view: SelectionView) {
        self.selection = view.selection.clone();
        self.lines.clear();
        if let Some(header) = &view.versions_header {
            self.lines.extend(header.lines().map(|l| format!("# {l}")));
            self.lines.push(String::new());
        }
        if let Some(text) = &view.preview {
            self.lines.extend(text.lines().map(String::from));
        }
        self.scroll_offset = self.scroll_offset.min(self.max_offset());
        self.view = Some(view);
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(1)
    }

    pub fn render(&self, frame: &mut Frame, area: Rect, apply_in_flight: bool) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(34), Constraint::Min(20)])
            .split(area);

        self.render_form(frame, columns[0], apply_in_flight);
        self.render_preview(frame, columns[1]);
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, apply_in_flight: bool) {
        let mut lines = vec![Line::from(Span::styled(
            "Base",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        for (i, row) in SelectionRow::ALL.into_iter().enumerate() {
            if i == 2 {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Add-ons",
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
            let marker = match row {
                SelectionRow::Base(b) if b == self.selection.base => "(•)",
                SelectionRow::Base(_) => "( )",
                SelectionRow::AddOn(a) if self.selection.contains(a) => "[x]",
                SelectionRow::AddOn(_) => "[ ]",
            };
            let style = if i == self.cursor {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!(" {marker} {}", row.label()),
                style,
            )));
        }

        lines.push(Line::from(""));
        if let Some(view) = &self.view {
            lines.push(Line::from(vec![
                Span::styled("Mapping: ", Style::default().fg(Color::DarkGray)),
                Span::raw(view.mapping_status.label()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Output:  ", Style::default().fg(Color::DarkGray)),
                Span::raw(view.output_path.as_str()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Size:    ", Style::default().fg(Color::DarkGray)),
                Span::styled(view.estimate.to_string(), Style::default().fg(Color::Yellow)),
            ]));
        }
        let apply_hint = if apply_in_flight {
            Span::styled(" applying…", Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(" a: apply", Style::default().fg(Color::Green))
        };
        lines.push(Line::from(""));
        lines.push(Line::from(apply_hint));

        let form = Paragraph::new(lines)
            .block(Block::default().title(" Selection ").borders(Borders::ALL));
        frame.render_widget(form, area);
    }

    fn render_preview(&self, frame: &mut Frame, area: Rect) {
        let visible_height = area.height.saturating_sub(2) as usize;
        let phase = match self.view.as_ref().map(|v| v.phase) {
            Some(SelectionPhase::Applied) => " [applied]",
            Some(SelectionPhase::Idle) => " [no project]",
            _ => "",
        };
        let title = format!(" Preview ({} lines){phase} ", self.lines.len());

        if self.lines.is_empty() {
            let empty = Paragraph::new("  (no preview yet)")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(empty, area);
            return;
        }

        let visible: Vec<Line> = self
            .lines
            .iter()
            .skip(self.scroll_offset)
            .take(visible_height)
            .map(|line| {
                if line.starts_with('#') {
                    Line::from(Span::styled(
                        line.as_str(),
                        Style::default().fg(Color::Cyan),
                    ))
                } else if line == "---" {
                    Line::from(Span::styled(
                        line.as_str(),
                        Style::default().fg(Color::DarkGray),
                    ))
                } else {
                    Line::from(line.as_str())
                }
            })
            .collect();

        let preview = Paragraph::new(visible)
            .block(Block::default().title(title).borders(Borders::ALL))
            .wrap(Wrap { trim: false });
        frame.render_widget(preview, area);
    }
}

impl Default for SelectionPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelState for SelectionPanel {
    fn scroll_down(&mut self, n: usize) {
        self.scroll_offset = (self.scroll_offset + n).min(self.max_offset());
    }

    fn scroll_up(&mut self, n: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(n);
    }

    fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll_offset = self.max_offset();
    }
}
