//! Config file loading and its effect on app settings.

use std::time::Duration;

use mindmatter_config::{ConfigError, MindmatterConfig};
use mindmatter_engine::AppSettings;
use mindmatter_types::Provider;

fn write_config(dir: &tempfile::TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn full_config_flows_into_app_settings() {
    let dir = tempfile::tempdir().unwrap();
    let history = dir.path().join("my-history.json");
    let path = write_config(
        &dir,
        &format!(
            r#"
[app]
ascii_only = true
reduced_motion = true

[api_keys]
openai = "sk-from-config"

[analysis]
provider = "openai"
model = "gpt-4.1-mini"
timeout_secs = 15
base_url = "http://127.0.0.1:9/v1/"

[history]
path = "{}"
"#,
            history.display()
        ),
    );

    let config = MindmatterConfig::load_from(&path).unwrap().unwrap();
    let settings = AppSettings::from_config(Some(&config));

    assert!(settings.ui.ascii_only);
    assert!(settings.ui.reduced_motion);
    assert!(!settings.ui.high_contrast);
    assert_eq!(settings.analysis.provider, Provider::OpenAI);
    assert_eq!(settings.analysis.model, "gpt-4.1-mini");
    assert_eq!(settings.analysis.timeout, Duration::from_secs(15));
    assert_eq!(
        settings.analysis.base_url.as_deref(),
        Some("http://127.0.0.1:9/v1")
    );
    assert_eq!(
        settings.analysis.api_key.as_ref().map(|k| k.expose_secret()),
        Some("sk-from-config")
    );
    assert_eq!(settings.history_path.as_deref(), Some(history.as_path()));
    assert!(settings.analysis.api_config().is_ok());
}

#[test]
fn missing_file_is_not_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let loaded = MindmatterConfig::load_from(&dir.path().join("absent.toml")).unwrap();
    assert!(loaded.is_none());
}

#[test]
fn malformed_file_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[analysis\nprovider = ");
    let err = MindmatterConfig::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert_eq!(err.path(), &path);
}

#[test]
fn env_key_is_used_when_config_has_none() {
    let config = MindmatterConfig::parse("[analysis]\nprovider = \"gemini\"\n").unwrap();
    let key = config
        .api_key_with(Provider::Gemini, |name| {
            (name == "GEMINI_API_KEY").then(|| "  env-key  ".to_string())
        })
        .unwrap();
    assert_eq!(key.provider(), Provider::Gemini);
    assert_eq!(key.expose_secret(), "env-key");
    assert!(config.api_key_with(Provider::OpenAI, |_| None).is_none());
}

#[test]
fn unknown_provider_falls_back_to_gemini() {
    let config = MindmatterConfig::parse("[analysis]\nprovider = \"claude\"\n").unwrap();
    assert_eq!(config.provider(), Provider::Gemini);
    assert_eq!(config.model(), Provider::Gemini.default_model());
}
