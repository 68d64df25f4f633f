#![deny(unsafe_code)]

//! Copilot Composer TUI: pick instruction sets and apply them interactively.

mod app;
mod keymap;
mod panels;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use composer_config::ComposerConfig;
use composer_core::{ActivityLog, HostServices, Session, SessionRequest, Workspace};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use app::App;

/// Events kept for the activity strip.
const ACTIVITY_CAPACITY: usize = 200;

/// Copilot Composer terminal UI.
#[derive(Parser)]
#[command(name = "composer-tui", version, about, long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(short, long)]
    project: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project = match cli.project {
        Some(dir) => dir,
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let root = project.is_dir().then(|| project.clone());

    // Events go to the activity strip; stdout belongs to the terminal.
    let activity = ActivityLog::new(ACTIVITY_CAPACITY);
    let level = ComposerConfig::log_level_in(root.as_deref()).await;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with(activity.clone())
        .init();

    match &root {
        Some(root) => info!(project = %root.display(), "Starting Copilot Composer"),
        None => info!(path = %project.display(), "Project directory not found, no folder open"),
    }

    let session = Session::new(Workspace::new(root.clone(), HostServices::local().await));
    let (tx, rx) = unbounded_channel();
    let mut app = App::new(root, activity, tx);

    // Set up terminal
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run(&mut terminal, &mut app, session, rx).await;

    // Restore terminal
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;

    result
}

/// Main event loop. Queued session requests are handled before each key
/// poll, in order, so operations never overlap.
async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    mut session: Session,
    mut requests: UnboundedReceiver<SessionRequest>,
) -> Result<()> {
    while !app.should_quit {
        app.tick();
        terminal.draw(|frame| app.render(frame))?;

        while let Ok(request) = requests.try_recv() {
            let update = session.process(request).await;
            app.apply_update(update);
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key.code);
        }
    }
    info!("Shutting down");
    Ok(())
}
