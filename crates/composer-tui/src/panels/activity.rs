//! Activity strip: the most recent composer log events.

use composer_core::{ActivityEntry, ActivityLog};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, Paragraph},
};
use tracing::Level;

/// Bottom strip showing the tail of the activity log.
pub struct ActivityStrip {
    log: ActivityLog,
    /// Cached snapshot (refreshed on tick).
    entries: Vec<ActivityEntry>,
    /// How many entries to keep in the snapshot.
    height: usize,
}

impl ActivityStrip {
    pub fn new(log: ActivityLog, height: usize) -> Self {
        Self {
            log,
            entries: Vec::new(),
            height,
        }
    }

    /// Refresh the cached tail from the log.
    pub fn refresh(&mut self) {
        self.entries = self.log.latest(self.height);
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let entries = self.entries();
        if entries.is_empty() {
            let empty = Paragraph::new("  (no activity yet)")
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title(" Activity ").borders(Borders::TOP));
            frame.render_widget(empty, area);
            return;
        }

        let visible = area.height.saturating_sub(1) as usize;
        let skip = entries.len().saturating_sub(visible);
        let items: Vec<ListItem> = entries
            .iter()
            .skip(skip)
            .map(|entry| {
                let level_style = match entry.level {
                    Level::ERROR => Style::default().fg(Color::Red),
                    Level::WARN => Style::default().fg(Color::Yellow),
                    Level::INFO => Style::default().fg(Color::Green),
                    Level::DEBUG => Style::default().fg(Color::Blue),
                    Level::TRACE => Style::default().fg(Color::DarkGray),
                };
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>8.2}s ", entry.elapsed_secs),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::styled(format!("{:>5} ", entry.level), level_style),
                    Span::raw(entry.text.as_str()),
                ]))
            })
            .collect();

        let list = List::new(items).block(Block::default().title(" Activity ").borders(Borders::TOP));
        frame.render_widget(list, area);
    }
}
