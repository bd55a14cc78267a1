//! The analysis screen end to end: form, request, banner and history file.

use wiremock::MockServer;

use mindmatter_engine::{AnalysisField, AnalysisSettings, App, AppSettings, HistoryStore};
use mindmatter_types::{
    API_KEY_ERROR_MESSAGE, GENERIC_ERROR_MESSAGE, Provider, QUOTA_ERROR_MESSAGE, UiOptions,
};

use crate::common::{
    analysis_json, app_with, mount_error, mount_gemini_reply, mount_openai_reply, settings_for,
    wait_for_analysis,
};

fn fill(app: &mut App, material: &str, consciousness: &str) {
    app.new_analysis();
    app.focus_field(AnalysisField::Material);
    app.edit_input(|draft| draft.enter_text(material));
    app.focus_field(AnalysisField::Consciousness);
    app.edit_input(|draft| draft.enter_text(consciousness));
}

#[tokio::test]
async fn each_success_adds_exactly_one_persisted_record() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    mount_gemini_reply(&server, "gemini-2.0-flash", &analysis_json("Light forms images", 90)).await;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    let mut app = app_with(
        settings_for(&server, Provider::Gemini),
        HistoryStore::open(path.clone()),
    );

    for (round, (material, consciousness)) in [("light", "vision"), ("sound", "hearing")]
        .into_iter()
        .enumerate()
    {
        fill(&mut app, material, consciousness);
        assert!(app.submit_analysis());
        wait_for_analysis(&mut app).await;
        assert_eq!(app.history().len(), round + 1);
    }

    let reloaded = HistoryStore::open(path);
    assert_eq!(reloaded.len(), 2);
    let newest = reloaded.get_newest(0).unwrap();
    assert_eq!(newest.material, "sound");
    assert_eq!(newest.consciousness, "hearing");
    assert_eq!(newest.provider, Provider::Gemini);
    assert_eq!(newest.result.relationship, "Light forms images");
}

#[tokio::test]
async fn openai_results_are_labelled_with_their_provider() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    mount_openai_reply(&server, &analysis_json("Reflection", 55)).await;

    let mut app = app_with(
        settings_for(&server, Provider::OpenAI),
        HistoryStore::in_memory(),
    );
    fill(&mut app, "mirror", "self-image");
    assert!(app.submit_analysis());
    wait_for_analysis(&mut app).await;

    let shown = app.analysis().result().unwrap();
    assert_eq!(shown.provider, Provider::OpenAI);
    assert_eq!(shown.result.confidence.percent(), 55);
    assert_eq!(app.history().get_newest(0).unwrap().provider, Provider::OpenAI);
}

#[tokio::test]
async fn failures_show_banner_and_leave_history_alone() {
    crate::skip_if_no_network!();
    for (status, banner) in [
        (401, API_KEY_ERROR_MESSAGE),
        (429, QUOTA_ERROR_MESSAGE),
        (503, GENERIC_ERROR_MESSAGE),
    ] {
        let server = MockServer::start().await;
        mount_error(&server, status, "nope").await;

        let mut app = app_with(
            settings_for(&server, Provider::Gemini),
            HistoryStore::in_memory(),
        );
        fill(&mut app, "light", "vision");
        assert!(app.submit_analysis());
        wait_for_analysis(&mut app).await;

        assert_eq!(app.analysis().error(), Some(banner), "status {status}");
        assert!(app.analysis().result().is_none());
        assert!(app.history().is_empty());
        // The form keeps the inputs for a retry.
        assert_eq!(app.analysis().input(AnalysisField::Material).text(), "light");
    }
}

#[tokio::test]
async fn unreachable_endpoint_shows_generic_banner() {
    crate::skip_if_no_network!();
    let server = MockServer::start().await;
    let settings = settings_for(&server, Provider::Gemini);
    drop(server);

    let mut app = app_with(settings, HistoryStore::in_memory());
    fill(&mut app, "light", "vision");
    assert!(app.submit_analysis());
    wait_for_analysis(&mut app).await;
    assert_eq!(app.analysis().error(), Some(GENERIC_ERROR_MESSAGE));
}

#[test]
fn missing_key_never_starts_a_request() {
    let mut app = app_with(AnalysisSettings::default(), HistoryStore::in_memory());
    fill(&mut app, "light", "vision");
    assert!(!app.submit_analysis());
    assert!(!app.is_analyzing());
    assert_eq!(app.analysis().error(), Some(API_KEY_ERROR_MESSAGE));
}

#[test]
fn corrupt_history_file_surfaces_a_notice() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");
    std::fs::write(&path, "not json at all").unwrap();

    let app = App::new(AppSettings {
        ui: UiOptions::default(),
        analysis: AnalysisSettings::default(),
        history_path: Some(path),
    });
    assert!(app.history().is_empty());
    assert!(app.notice().unwrap().contains("unreadable"));
    assert!(dir.path().join("history.json.corrupt").exists());
}
