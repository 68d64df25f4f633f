#![deny(unsafe_code)]

//! Copilot Composer CLI: compose the project's Copilot instruction file.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use composer_config::{ComposerConfig, ComposerSettings};
use composer_core::controller::{ApplyOptions, HostServices, SelectionController, Workspace};
use composer_core::mapping::read_mapping;
use composer_core::session::apply_notice;
use composer_core::{
    AddOn, BaseId, CommitOutcome, ContentResolver, InstructionId, MappingStatus, PanelMessage,
    SelectionState, Session, estimate,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Copilot Composer: merge instruction sets into `.github/copilot-instructions.md`.
#[derive(Parser)]
#[command(name = "composer", version, about, long_about = None)]
struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(short, long)]
    project: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the merged document for a selection.
    Preview {
        #[command(flatten)]
        selection: SelectionArgs,
    },

    /// Write the merged document to the configured output path.
    Apply {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Commit the output even when auto-commit is off.
        #[arg(long)]
        commit: bool,
    },

    /// Show settings, mapping status and where each instruction set resolves from.
    Status,

    /// Display or update workspace settings.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Write a sample mapping document to the configured mapping path.
    InitMapping,

    /// Estimate the token cost of a file.
    Estimate {
        file: PathBuf,

        /// Print the estimate as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved settings as TOML.
    Show,

    /// Change one or more settings.
    Set {
        #[arg(long)]
        repo_config_path: Option<String>,

        #[arg(long)]
        repo_sets_dir: Option<String>,

        #[arg(long)]
        output_path: Option<String>,

        #[arg(long)]
        auto_commit: Option<bool>,
    },
}

#[derive(clap::Args, Debug, Clone, PartialEq)]
struct SelectionArgs {
    /// Base instruction set (base-short or base-standard).
    #[arg(short, long, default_value = "base-short")]
    base: BaseId,

    /// Add-on to include; repeatable.
    #[arg(short, long = "addon")]
    addons: Vec<AddOn>,
}

impl SelectionArgs {
    fn selection(&self) -> SelectionState {
        self.addons
            .iter()
            .fold(SelectionState::new(self.base), |s, &a| s.with_add_on(a))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let project = match &cli.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine current directory")?,
    };
    let root = project.is_dir().then(|| project.clone());

    let filter = log_filter(cli.verbose, root.as_deref()).await;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    if root.is_none() {
        info!(path = %project.display(), "Project directory not found, running without a project");
    }
    let workspace = Workspace::new(root, HostServices::local().await);

    match cli.command {
        Commands::Preview { selection } => {
            let (text, summary) = cmd_preview(workspace, selection.selection()).await?;
            print!("{text}");
            eprintln!("{summary}");
        }
        Commands::Apply { selection, commit } => {
            println!("{}", cmd_apply(workspace, selection.selection(), commit).await?);
        }
        Commands::Status => print!("{}", cmd_status(&workspace).await),
        Commands::Config { action } => match action {
            ConfigAction::Show => print!("{}", cmd_config_show(&workspace).await?),
            ConfigAction::Set {
                repo_config_path,
                repo_sets_dir,
                output_path,
                auto_commit,
            } => {
                let mut settings = workspace.load_config().await.composer;
                if let Some(v) = repo_config_path {
                    settings.repo_config_path = v;
                }
                if let Some(v) = repo_sets_dir {
                    settings.repo_sets_dir = v;
                }
                if let Some(v) = output_path {
                    settings.output_path = v;
                }
                if let Some(v) = auto_commit {
                    settings.auto_commit = v;
                }
                println!("{}", cmd_config_set(workspace, settings).await?);
            }
        },
        Commands::InitMapping => {
            let notice = Session::new(workspace)
                .handle(PanelMessage::CreateSampleConfig)
                .await?;
            println!("{}", notice.text());
        }
        Commands::Estimate { file, json } => println!("{}", cmd_estimate(&file, json).await?),
    }

    Ok(())
}

/// `-v` flags win over the settings file.
async fn log_filter(verbose: u8, root: Option<&Path>) -> String {
    match verbose {
        0 => ComposerConfig::log_level_in(root).await,
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    }
}

/// Returns the preview text (with the versions header when a mapping is
/// loaded) and the estimate line.
async fn cmd_preview(workspace: Workspace, selection: SelectionState) -> Result<(String, String)> {
    let mut ctl = SelectionController::new(workspace);
    ctl.update_selection(selection).await?;
    let view = ctl.view().await;

    let mut text = String::new();
    if let Some(header) = &view.versions_header {
        for line in header.lines() {
            let _ = writeln!(text, "<!-- {line} -->");
        }
        text.push('\n');
    }
    text.push_str(view.preview.as_deref().unwrap_or_default());
    if !text.ends_with('\n') {
        text.push('\n');
    }
    Ok((text, view.estimate.to_string()))
}

async fn cmd_apply(workspace: Workspace, selection: SelectionState, commit: bool) -> Result<String> {
    let mut ctl = SelectionController::new(workspace);
    ctl.update_selection(selection).await?;
    let report = ctl.apply(ApplyOptions { force_commit: commit }).await?;
    if let Some(CommitOutcome::Skipped(reason)) = &report.commit {
        if commit {
            eprintln!("Commit skipped: {reason}");
        } else {
            debug!(%reason, "Auto-commit skipped");
        }
    }
    Ok(apply_notice(&report))
}

async fn cmd_status(workspace: &Workspace) -> String {
    let config = workspace.load_config().await;
    let settings = &config.composer;
    let mapping = read_mapping(workspace.fs(), workspace.root(), &settings.repo_config_path).await;

    let mut out = String::new();
    let project = workspace
        .root()
        .map(|r| r.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());
    let _ = writeln!(out, "Project:       {project}");
    let _ = writeln!(out, "Output:        {}", settings.output_path);
    let _ = writeln!(out, "Overrides:     {}", settings.repo_sets_dir);
    let _ = writeln!(
        out,
        "Mapping:       {} ({})",
        settings.repo_config_path,
        MappingStatus::of(mapping.as_ref()).label()
    );
    let _ = writeln!(out, "Auto-commit:   {}", if settings.auto_commit { "on" } else { "off" });
    let _ = writeln!(out);

    let host = workspace.host();
    let resolver = ContentResolver::new(
        host.fs.as_ref(),
        &host.bundle,
        workspace.root(),
        &settings.repo_sets_dir,
    );
    for id in InstructionId::ALL {
        let block = resolver.resolve_block(id).await;
        let version = mapping
            .as_ref()
            .and_then(|m| m.version(id))
            .unwrap_or("-");
        let _ = writeln!(
            out,
            "{:<14} {:<9} {:<8} {}",
            id.as_str(),
            block.source.label(),
            version,
            id.label()
        );
    }
    out
}

async fn cmd_config_show(workspace: &Workspace) -> Result<String> {
    let config = workspace.load_config().await;
    Ok(config.to_toml()?)
}

async fn cmd_config_set(workspace: Workspace, settings: ComposerSettings) -> Result<String> {
    let message = PanelMessage::SaveConfig {
        repo_config_path: settings.repo_config_path,
        repo_sets_dir: settings.repo_sets_dir,
        output_path: settings.output_path,
        auto_commit: settings.auto_commit,
    };
    let notice = Session::new(workspace).handle(message).await?;
    Ok(notice.text().to_string())
}

async fn cmd_estimate(file: &Path, json: bool) -> Result<String> {
    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("failed to read {}", file.display()))?;
    let est = estimate(&text);
    if json {
        return Ok(serde_json::to_string(&est)?);
    }
    Ok(format!("{}: {est}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use composer_core::{Bundle, VcsCapability};
    use composer_test_utils::{RecordingVcs, TestConfigBuilder, TestProject};
    use pretty_assertions::assert_eq;

    fn bundle() -> Bundle {
        Bundle::empty()
            .with(InstructionId::BaseShort, "short")
            .with(InstructionId::Security, "sec")
    }

    #[test]
    fn test_cli_parses_selection() {
        let cli = Cli::try_parse_from([
            "composer", "preview", "--base", "base-standard", "--addon", "security", "-a", "code-review",
        ])
        .unwrap();
        let Commands::Preview { selection } = cli.command else {
            panic!("expected preview");
        };
        assert_eq!(
            selection.selection().ordered_ids(),
            vec![
                InstructionId::BaseStandard,
                InstructionId::CodeReview,
                InstructionId::Security
            ]
        );
    }

    #[test]
    fn test_cli_rejects_unknown_addon() {
        assert!(Cli::try_parse_from(["composer", "preview", "--addon", "base-short"]).is_err());
        assert!(Cli::try_parse_from(["composer", "apply", "--base", "security"]).is_err());
    }

    #[test]
    fn test_cli_global_flags() {
        let cli = Cli::try_parse_from(["composer", "-vv", "--project", "/tmp/x", "status"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/x")));
    }

    #[tokio::test]
    async fn test_preview_includes_versions_header() {
        let project = TestProject::new();
        project
            .write(
                ".github/instruction-config.json",
                r#"{"versions":{"base-short":"v2"},"paths":{}}"#,
            )
            .await;
        let workspace = project.workspace(VcsCapability::Unavailable, bundle());

        let (text, summary) = cmd_preview(workspace, SelectionState::default()).await.unwrap();
        assert_eq!(text, "<!-- base-short: v2 -->\n\nshort\n");
        assert_eq!(summary, "~2 tokens (5 chars)");
    }

    #[tokio::test]
    async fn test_apply_with_commit_flag() {
        let project = TestProject::new();
        let vcs = RecordingVcs::new();
        let workspace = project.workspace(vcs.capability(), bundle());

        let selection = SelectionState::default().with_add_on(AddOn::Security);
        let out = cmd_apply(workspace, selection, true).await.unwrap();
        assert!(out.ends_with(", committed"));
        assert_eq!(
            project.read(".github/copilot-instructions.md").await.as_deref(),
            Some("short\n\n---\n\nsec")
        );
        assert_eq!(
            vcs.commit_messages(),
            vec!["chore: update copilot instructions [base-short+security]".to_string()]
        );
    }

    #[tokio::test]
    async fn test_status_lists_sources() {
        let project = TestProject::new();
        let config = TestConfigBuilder::new().build();
        project
            .write_override(&config, InstructionId::Performance, "perf")
            .await;
        let workspace = project.workspace(VcsCapability::Unavailable, bundle());

        let out = cmd_status(&workspace).await;
        assert!(out.contains("No mapping (optional)"));
        let line = |id: &str| out.lines().find(|l| l.starts_with(id)).unwrap().to_string();
        assert!(line("base-short").contains("bundled"));
        assert!(line("performance").contains("override"));
        assert!(line("python-ds").contains("missing"));
    }

    #[tokio::test]
    async fn test_config_set_then_show() {
        let project = TestProject::new();
        let workspace = project.workspace(VcsCapability::Unavailable, bundle());
        let settings = TestConfigBuilder::new()
            .output_path("AGENTS.md")
            .build()
            .composer;

        let msg = cmd_config_set(workspace.clone(), settings).await.unwrap();
        assert_eq!(msg, "Saved workspace settings.");
        let shown = cmd_config_show(&workspace).await.unwrap();
        assert!(shown.contains("output_path = \"AGENTS.md\""));
    }

    #[tokio::test]
    async fn test_config_set_rejects_escaping_path() {
        let project = TestProject::new();
        let workspace = project.workspace(VcsCapability::Unavailable, bundle());
        let mut settings = ComposerSettings::default();
        settings.repo_sets_dir = "../elsewhere".to_string();
        assert!(cmd_config_set(workspace, settings).await.is_err());
    }

    #[tokio::test]
    async fn test_estimate_file() {
        let project = TestProject::new();
        project.write("notes.md", "abcdefghi").await;
        let path = project.path("notes.md");

        let out = cmd_estimate(&path, false).await.unwrap();
        assert!(out.ends_with("~3 tokens (9 chars)"));
        let json = cmd_estimate(&path, true).await.unwrap();
        assert_eq!(json, r#"{"chars":9,"approxTokens":3}"#);
    }

    #[tokio::test]
    async fn test_log_filter_prefers_flags_over_settings() {
        let project = TestProject::new();
        assert_eq!(log_filter(0, Some(project.root())).await, "info");

        project
            .write_settings(&TestConfigBuilder::new().log_level("warn").build())
            .await;
        assert_eq!(log_filter(0, Some(project.root())).await, "warn");
        assert_eq!(log_filter(1, Some(project.root())).await, "debug");
        assert_eq!(log_filter(3, None).await, "trace");
    }
}
