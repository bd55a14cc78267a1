//! Configuration for mindmatter.
//!
//! Read from `~/.mindmatter/config.toml` (or `$MINDMATTER_HOME/config.toml`).
//! Every section is optional; a missing file means "all defaults".
//!
//! ```toml
//! [app]
//! ascii_only = false
//! high_contrast = false
//! reduced_motion = false
//!
//! [api_keys]
//! google = "${GEMINI_API_KEY}"
//! openai = "sk-..."
//!
//! [analysis]
//! provider = "gemini"
//! model = "gemini-2.0-flash"
//! timeout_secs = 60
//!
//! [history]
//! path = "/somewhere/history.json"
//! ```

use std::{env, fs, path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use mindmatter_types::{ApiKey, Provider, UiOptions};

/// Overrides the `~/.mindmatter` state directory.
pub const HOME_ENV_VAR: &str = "MINDMATTER_HOME";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default, Deserialize)]
pub struct MindmatterConfig {
    pub app: Option<AppConfig>,
    pub api_keys: Option<ApiKeys>,
    pub analysis: Option<AnalysisConfig>,
    pub history: Option<HistoryConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for icons and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Disable spinner animation.
    #[serde(default)]
    pub reduced_motion: bool,
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub google: Option<String>,
    pub openai: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn mask(opt: Option<&String>) -> &'static str {
            if opt.is_some() { "[REDACTED]" } else { "None" }
        }
        f.debug_struct("ApiKeys")
            .field("google", &mask(self.google.as_ref()))
            .field("openai", &mask(self.openai.as_ref()))
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalysisConfig {
    /// "gemini" (default) or "openai".
    pub provider: Option<String>,
    pub model: Option<String>,
    /// Whole-request timeout. Default: 60.
    pub timeout_secs: Option<u64>,
    /// Replace the provider's API base URL.
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryConfig {
    pub path: Option<PathBuf>,
}

/// Replace `${VAR}` references with the environment value (empty if unset).
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &rest[start + 2..start + 2 + len];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &rest[start + 2 + len + 1..];
    }
    out.push_str(rest);
    out
}

impl MindmatterConfig {
    /// Load the default config file. `Ok(None)` when it does not exist.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {}: {source}", path.display());
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        Self::parse(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
        .map(Some)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.app.as_ref().map_or_else(UiOptions::default, |app| UiOptions {
            ascii_only: app.ascii_only,
            high_contrast: app.high_contrast,
            reduced_motion: app.reduced_motion,
        })
    }

    /// Configured provider, falling back to Gemini when unset or unknown.
    #[must_use]
    pub fn provider(&self) -> Provider {
        let Some(raw) = self.analysis.as_ref().and_then(|a| a.provider.as_deref()) else {
            return Provider::default();
        };
        match Provider::parse(raw) {
            Ok(provider) => provider,
            Err(e) => {
                tracing::warn!("{e}; using {}", Provider::default().as_str());
                Provider::default()
            }
        }
    }

    #[must_use]
    pub fn model(&self) -> String {
        self.analysis
            .as_ref()
            .and_then(|a| a.model.as_deref())
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map_or_else(|| self.provider().default_model().to_string(), str::to_string)
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        let secs = self
            .analysis
            .as_ref()
            .and_then(|a| a.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        self.analysis
            .as_ref()
            .and_then(|a| a.base_url.as_deref())
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
    }

    /// Key for `provider`: config value first, then the provider's env var.
    #[must_use]
    pub fn api_key(&self, provider: Provider) -> Option<ApiKey> {
        self.api_key_with(provider, |name| env::var(name).ok())
    }

    pub fn api_key_with(
        &self,
        provider: Provider,
        lookup_env: impl Fn(&str) -> Option<String>,
    ) -> Option<ApiKey> {
        let configured = self.api_keys.as_ref().and_then(|keys| match provider {
            Provider::Gemini => keys.google.as_deref(),
            Provider::OpenAI => keys.openai.as_deref(),
        });
        configured
            .map(expand_env_vars)
            .filter(|key| !key.trim().is_empty())
            .or_else(|| lookup_env(provider.env_var()).filter(|key| !key.trim().is_empty()))
            .map(|key| ApiKey::new(provider, key.trim()))
    }

    #[must_use]
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history
            .as_ref()
            .and_then(|h| h.path.clone())
            .or_else(default_history_path)
    }
}

/// `$MINDMATTER_HOME`, else `~/.mindmatter`.
#[must_use]
pub fn state_dir() -> Option<PathBuf> {
    if let Some(home) = env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(home));
    }
    dirs::home_dir().map(|home| home.join(".mindmatter"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("config.toml"))
}

#[must_use]
pub fn default_history_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("history.json"))
}

#[must_use]
pub fn log_path() -> Option<PathBuf> {
    state_dir().map(|dir| dir.join("logs").join("mindmatter.log"))
}
