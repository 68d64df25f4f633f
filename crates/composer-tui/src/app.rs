//! Core TUI application state and event handling.
//!
//! The app never touches the file system. Form changes become
//! [`SessionRequest`]s on a channel; the main loop runs them against the
//! [`composer_core::Session`] one at a time and hands each resulting
//! [`SessionUpdate`] back through [`App::apply_update`].

use std::collections::VecDeque;
use std::path::PathBuf;

use composer_core::{
    ActivityLog, Notice, OpenOutcome, PanelKind, PanelMessage, PanelRegistry, SessionRequest,
    SessionUpdate,
};
use crossterm::event::KeyCode;
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Tabs},
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::keymap::{Action, InputMode, KeyMapper};
use crate::panels::{ActivityStrip, PanelState, PathConfigPanel, SelectionPanel};

/// Lines of activity kept on screen.
const ACTIVITY_LINES: usize = 4;

/// UI state of one open panel.
pub enum PanelUi {
    Selection(SelectionPanel),
    PathConfig(PathConfigPanel),
}

impl PanelUi {
    fn new(kind: PanelKind) -> Self {
        match kind {
            PanelKind::InstructionSelection => PanelUi::Selection(SelectionPanel::new()),
            PanelKind::PathConfig => PanelUi::PathConfig(PathConfigPanel::new()),
        }
    }
}

/// What a queued request was, so its update can be matched on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pending {
    Apply,
    Save,
    Other,
}

/// TUI application state.
pub struct App {
    /// Whether the application should quit.
    pub should_quit: bool,

    /// Project shown in the header, `None` when no folder is open.
    pub project: Option<PathBuf>,

    /// Key mapper for vim-style bindings.
    pub keymap: KeyMapper,

    /// Open panels and focus.
    pub panels: PanelRegistry<PanelUi>,

    /// Last notice from the session.
    pub notice: Option<Notice>,

    pub activity: ActivityStrip,

    requests: UnboundedSender<SessionRequest>,
    /// Requests sent but not yet answered, oldest first.
    in_flight: VecDeque<Pending>,
}

impl App {
    pub fn new(
        project: Option<PathBuf>,
        activity: ActivityLog,
        requests: UnboundedSender<SessionRequest>,
    ) -> Self {
        Self {
            should_quit: false,
            project,
            keymap: KeyMapper::new(),
            panels: PanelRegistry::new(),
            notice: None,
            activity: ActivityStrip::new(activity, ACTIVITY_LINES),
            requests,
            in_flight: VecDeque::new(),
        }
    }

    /// Whether an apply has been sent and not answered yet.
    pub fn apply_in_flight(&self) -> bool {
        self.in_flight.contains(&Pending::Apply)
    }

    fn input_mode(&self) -> InputMode {
        match self.panels.focused().and_then(|k| self.panels.get(k)) {
            Some(PanelUi::PathConfig(p)) if p.is_editing() => InputMode::Editing,
            _ => InputMode::Normal,
        }
    }

    /// Resolve a key press and act on it.
    pub fn handle_key(&mut self, key: KeyCode) {
        let action = self.keymap.resolve(key, self.input_mode());
        self.handle_action(action);
    }

    /// Process a resolved action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => self.should_quit = true,
            Action::OpenSelection => self.open(PanelKind::InstructionSelection),
            Action::OpenConfig => self.open(PanelKind::PathConfig),
            Action::NextPanel => self.panels.focus_next(),
            Action::PrevPanel => self.panels.focus_prev(),
            Action::ClosePanel => {
                if let Some(kind) = self.panels.focused() {
                    self.panels.dispose(kind);
                    self.send(SessionRequest::Close(kind), Pending::Other);
                }
            }
            Action::None => {}
            other => self.panel_action(other),
        }
    }

    fn open(&mut self, kind: PanelKind) {
        let created = self.panels.open(kind, || PanelUi::new(kind));
        self.send(SessionRequest::Open(kind), Pending::Other);
        if created == OpenOutcome::Created && kind == PanelKind::InstructionSelection {
            // Populate the preview right away.
            let selection = match self.panels.get(kind) {
                Some(PanelUi::Selection(p)) => p.selection().clone(),
                _ => return,
            };
            self.post(PanelMessage::UpdateSelection { selection });
        }
    }

    fn panel_action(&mut self, action: Action) {
        let Some((_, panel)) = self.panels.focused_mut() else {
            return;
        };
        let message = match panel {
            PanelUi::Selection(p) => {
                selection_action(p, action, self.in_flight.contains(&Pending::Apply))
            }
            PanelUi::PathConfig(p) => config_action(p, action),
        };
        if let Some(message) = message {
            self.post(message);
        }
    }

    fn post(&mut self, message: PanelMessage) {
        let pending = match message {
            PanelMessage::Apply => Pending::Apply,
            PanelMessage::SaveConfig { .. } => Pending::Save,
            _ => Pending::Other,
        };
        self.send(SessionRequest::Message(message), pending);
    }

    fn send(&mut self, request: SessionRequest, pending: Pending) {
        debug!(?request, "Queueing session request");
        if self.requests.send(request).is_ok() {
            self.in_flight.push_back(pending);
        } else {
            self.notice = Some(Notice::Error("Session is no longer running.".to_string()));
        }
    }

    /// Take the session's answer to the oldest in-flight request.
    pub fn apply_update(&mut self, update: SessionUpdate) {
        let pending = self.in_flight.pop_front();
        // A rejected save keeps the form dirty so the view below cannot reset it.
        let saved = pending == Some(Pending::Save)
            && matches!(update.notice, Some(Notice::Info(_)));
        if let Some(notice) = update.notice {
            self.notice = Some(notice);
        }
        if let Some(view) = update.selection
            && let Some(PanelUi::Selection(p)) = self.panels.get_mut(PanelKind::InstructionSelection)
        {
            p.set_view(view);
        }
        if let Some(PanelUi::PathConfig(p)) = self.panels.get_mut(PanelKind::PathConfig) {
            if saved {
                p.mark_saved();
            }
            if let Some(view) = update.config {
                p.set_view(view);
            }
        }
    }

    /// Tick: refresh data from live sources.
    pub fn tick(&mut self) {
        self.activity.refresh();
    }

    /// Get the status line text.
    pub fn status_line(&self) -> String {
        let panel = self
            .panels
            .focused()
            .map(PanelKind::title)
            .unwrap_or("no panel");
        if self.input_mode() == InputMode::Editing {
            return format!(" Enter:commit  Esc:cancel  [{panel}]");
        }
        format!(" q:quit  s:selection  c:config  Tab:next  x:close  J/K:scroll  gg/G:top/bottom  [{panel}]")
    }

    pub fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),                         // header + tabs
                Constraint::Min(8),                            // focused panel
                Constraint::Length(ACTIVITY_LINES as u16 + 1), // activity strip
                Constraint::Length(2),                         // notice
                Constraint::Length(1),                         // status bar
            ])
            .split(frame.area());

        self.render_header(frame, chunks[0]);

        match self.panels.focused().and_then(|k| self.panels.get(k)) {
            Some(PanelUi::Selection(p)) => p.render(frame, chunks[1], self.apply_in_flight()),
            Some(PanelUi::PathConfig(p)) => p.render(frame, chunks[1]),
            None => {
                let welcome = Paragraph::new(
                    "\n  s  open Instruction Selection\n  c  open Path Config\n  q  quit",
                )
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL));
                frame.render_widget(welcome, chunks[1]);
            }
        }

        self.activity.render(frame, chunks[2]);

        let notice = match &self.notice {
            Some(Notice::Error(text)) => {
                Paragraph::new(format!(" {text}")).style(Style::default().fg(Color::Red))
            }
            Some(Notice::Info(text)) => {
                Paragraph::new(format!(" {text}")).style(Style::default().fg(Color::Green))
            }
            None => Paragraph::new(""),
        };
        frame.render_widget(notice.block(Block::default().borders(Borders::TOP)), chunks[3]);

        let status =
            Paragraph::new(self.status_line()).style(Style::default().fg(Color::DarkGray));
        frame.render_widget(status, chunks[4]);
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let project = self
            .project
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "no folder open".to_string());
        let kinds = self.panels.open_kinds();
        let selected = self
            .panels
            .focused()
            .and_then(|f| kinds.iter().position(|&k| k == f));
        let titles: Vec<String> = kinds.iter().map(|k| k.title().to_string()).collect();

        let tabs = Tabs::new(titles)
            .select(selected)
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .block(
                Block::default()
                    .title(format!(" Copilot Composer · {project} "))
                    .borders(Borders::BOTTOM),
            );
        frame.render_widget(tabs, area);
    }
}

fn selection_action(
    panel: &mut SelectionPanel,
    action: Action,
    apply_in_flight: bool,
) -> Option<PanelMessage> {
    match action {
        Action::CursorDown => panel.cursor_down(),
        Action::CursorUp => panel.cursor_up(),
        Action::Activate | Action::Toggle => {
            return panel
                .activate()
                .map(|selection| PanelMessage::UpdateSelection { selection });
        }
        Action::Apply if !apply_in_flight => return Some(PanelMessage::Apply),
        Action::ScrollDown => panel.scroll_down(1),
        Action::ScrollUp => panel.scroll_up(1),
        Action::HalfPageDown => panel.scroll_down(10),
        Action::HalfPageUp => panel.scroll_up(10),
        Action::ScrollToTop => panel.scroll_to_top(),
        Action::ScrollToBottom => panel.scroll_to_bottom(),
        _ => {}
    }
    None
}

fn config_action(panel: &mut PathConfigPanel, action: Action) -> Option<PanelMessage> {
    match action {
        Action::CursorDown => panel.cursor_down(),
        Action::CursorUp => panel.cursor_up(),
        Action::Activate => panel.activate(),
        Action::Toggle => panel.toggle_auto_commit(),
        Action::Input(c) => panel.input(c),
        Action::Backspace => panel.backspace(),
        Action::CommitEdit => panel.commit_edit(),
        Action::CancelEdit => panel.cancel_edit(),
        Action::SaveConfig => return Some(panel.save_message()),
        Action::CreateSample => return Some(PanelMessage::CreateSampleConfig),
        _ => {}
    }
    None
}
