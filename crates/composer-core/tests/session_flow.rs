//! Session routing over a real temp-dir project.

use composer_core::mapping::InstructionMapping;
use composer_core::{
    AddOn, Bundle, InstructionId, MappingStatus, Notice, OpenOutcome, PanelKind, PanelMessage,
    SelectionPhase, SessionRequest, VcsCapability,
};
use composer_test_utils::{RecordingVcs, TestConfigBuilder, TestProject};
use pretty_assertions::assert_eq;

fn bundle() -> Bundle {
    Bundle::empty()
        .with(InstructionId::BaseShort, "short base")
        .with(InstructionId::BaseStandard, "standard base")
        .with(InstructionId::Security, "bundled security")
}

#[test_log::test(tokio::test)]
async fn test_panel_messages_from_json() {
    let project = TestProject::new();
    let mut session = project.session(VcsCapability::Unavailable, bundle());
    session.open(PanelKind::InstructionSelection);

    let message = PanelMessage::decode(
        r#"{"type":"UPDATE_SELECTION","selection":{"base":"base-standard","addOns":["security"]}}"#,
    )
    .unwrap();
    let update = session.dispatch(message).await;
    let view = update.selection.unwrap();
    assert_eq!(view.phase, SelectionPhase::PreviewComputed);
    assert_eq!(
        view.preview.as_deref(),
        Some("standard base\n\n---\n\nbundled security")
    );

    let update = session
        .dispatch(PanelMessage::decode(r#"{"type":"APPLY"}"#).unwrap())
        .await;
    assert!(!update.notice.unwrap().is_error());
    assert_eq!(update.selection.unwrap().phase, SelectionPhase::Applied);
    assert_eq!(
        project.read(".github/copilot-instructions.md").await.as_deref(),
        Some("standard base\n\n---\n\nbundled security")
    );
}

#[test_log::test(tokio::test)]
async fn test_override_on_disk_wins() {
    let project = TestProject::new();
    let config = TestConfigBuilder::new().repo_sets_dir("ai/sets").build();
    project.write_settings(&config).await;
    project
        .write_override(&config, InstructionId::Security, "local security")
        .await;

    let mut session = project.session(VcsCapability::Unavailable, bundle());
    let update = session
        .dispatch(PanelMessage::UpdateSelection {
            selection: composer_core::SelectionState::default().with_add_on(AddOn::Security),
        })
        .await;
    assert_eq!(
        update.notice,
        Some(Notice::Info("Preview updated: ~8 tokens (31 chars)".to_string()))
    );
}

#[tokio::test]
async fn test_registry_reveals_instead_of_duplicating() {
    let project = TestProject::new();
    let mut session = project.session(VcsCapability::Unavailable, bundle());

    assert_eq!(session.open(PanelKind::PathConfig), OpenOutcome::Created);
    assert_eq!(session.open(PanelKind::InstructionSelection), OpenOutcome::Created);
    assert_eq!(session.focused(), Some(PanelKind::InstructionSelection));

    assert_eq!(session.open(PanelKind::PathConfig), OpenOutcome::Revealed);
    assert_eq!(session.focused(), Some(PanelKind::PathConfig));
}

#[tokio::test]
async fn test_sample_mapping_then_status() {
    let project = TestProject::new();
    let mut session = project.session(VcsCapability::Unavailable, bundle());
    session
        .process(SessionRequest::Open(PanelKind::InstructionSelection))
        .await;
    session.process(SessionRequest::Open(PanelKind::PathConfig)).await;

    let update = session.views().await;
    assert_eq!(update.config.unwrap().mapping_status, MappingStatus::Absent);

    let update = session
        .process(SessionRequest::Message(PanelMessage::CreateSampleConfig))
        .await;
    assert_eq!(
        update.config.unwrap().mapping_status.label(),
        "Mapping loaded"
    );
    let selection = update.selection.unwrap();
    assert_eq!(selection.versions_header.as_deref(), Some("base-short: v1.0.0"));

    let text = project.read(".github/instruction-config.json").await.unwrap();
    let mapping: InstructionMapping = serde_json::from_str(&text).unwrap();
    assert!(mapping.is_complete());
}

#[tokio::test]
async fn test_sample_mapping_follows_configured_paths() {
    let project = TestProject::new();
    let config = TestConfigBuilder::new()
        .repo_config_path("docs/mapping.json")
        .repo_sets_dir("docs/sets")
        .build();
    project.write_settings(&config).await;
    let mut session = project.session(VcsCapability::Unavailable, bundle());

    let update = session.dispatch(PanelMessage::CreateSampleConfig).await;
    assert!(!update.notice.unwrap().is_error());
    assert_eq!(project.read(".github/instruction-config.json").await, None);

    let text = project.read("docs/mapping.json").await.unwrap();
    let mapping: InstructionMapping = serde_json::from_str(&text).unwrap();
    assert_eq!(mapping.path(InstructionId::Security), Some("docs/sets/security.md"));
}

#[tokio::test]
async fn test_saved_settings_drive_apply_and_commit() {
    let project = TestProject::new();
    let vcs = RecordingVcs::new();
    let mut session = project.session(vcs.capability(), bundle());

    let update = session
        .dispatch(PanelMessage::decode(
            r#"{"type":"SAVE_CONFIG","repoConfigPath":"map.json","repoSetsDir":"sets","outputPath":"out/AGENTS.md","autoCommit":true}"#,
        )
        .unwrap())
        .await;
    assert!(!update.notice.unwrap().is_error());

    session.dispatch(PanelMessage::Apply).await;
    assert_eq!(project.read("out/AGENTS.md").await.as_deref(), Some("short base"));
    assert_eq!(
        vcs.commit_messages(),
        vec!["chore: update copilot instructions [base-short]".to_string()]
    );
}

#[tokio::test]
async fn test_invalid_settings_are_reported_not_written() {
    let project = TestProject::new();
    let mut session = project.session(VcsCapability::Unavailable, bundle());

    let update = session
        .dispatch(PanelMessage::SaveConfig {
            repo_config_path: String::new(),
            repo_sets_dir: "sets".to_string(),
            output_path: "out.md".to_string(),
            auto_commit: false,
        })
        .await;
    assert!(update.notice.unwrap().is_error());
    assert_eq!(project.read(composer_config::SETTINGS_FILE).await, None);
}
