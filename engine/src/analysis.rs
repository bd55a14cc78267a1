//! State of the AI analysis screen.
//!
//! At most one request is in flight. It runs on a tokio task and reports back
//! through a `oneshot` channel that [`AnalysisScreen::poll`] checks once per
//! frame; while it is pending the form is read-only.

use std::time::{Duration, Instant};

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use mindmatter_config::MindmatterConfig;
use mindmatter_providers::{ApiConfig, ProviderError};
use mindmatter_types::{
    AnalysisField, AnalysisQuery, AnalysisRecord, AnalysisResult, ApiKey, GENERIC_ERROR_MESSAGE,
    Provider, ValidationErrors,
};

use crate::draft::DraftInput;

/// Everything needed to build an [`ApiConfig`] when the user hits analyze.
#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<ApiKey>,
    pub base_url: Option<String>,
    pub timeout: Duration,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let provider = Provider::default();
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key: None,
            base_url: None,
            timeout: mindmatter_providers::DEFAULT_TIMEOUT,
        }
    }
}

impl AnalysisSettings {
    #[must_use]
    pub fn from_config(config: &MindmatterConfig) -> Self {
        let provider = config.provider();
        Self {
            provider,
            model: config.model(),
            api_key: config.api_key(provider),
            base_url: config.base_url(),
            timeout: config.timeout(),
        }
    }

    /// Resolve into a request config. Errors carry the text for the banner.
    pub fn api_config(&self) -> Result<ApiConfig, &'static str> {
        let Some(key) = self.api_key.clone() else {
            let err = ProviderError::MissingApiKey {
                provider: self.provider,
            };
            tracing::warn!("{err}");
            return Err(err.user_message());
        };

        let config = ApiConfig::for_provider(self.provider, key, self.model.clone())
            .and_then(|config| match &self.base_url {
                Some(url) => config.with_base_url(url.clone()),
                None => Ok(config),
            })
            .map_err(|e| {
                tracing::warn!("Invalid analysis configuration: {e}");
                GENERIC_ERROR_MESSAGE
            })?;
        Ok(config.with_timeout(self.timeout))
    }
}

/// The result currently on screen, with the provider that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShownResult {
    pub result: AnalysisResult,
    pub provider: Provider,
}

type AnalysisOutcome = Result<AnalysisResult, ProviderError>;

#[derive(Debug)]
struct PendingAnalysis {
    query: AnalysisQuery,
    provider: Provider,
    started: Instant,
    rx: oneshot::Receiver<AnalysisOutcome>,
    task: JoinHandle<()>,
}

/// What [`AnalysisScreen::poll`] observed this frame.
#[derive(Debug)]
pub(crate) enum PollOutcome {
    Idle,
    Pending,
    Completed(AnalysisRecord),
    Failed,
}

#[derive(Debug, Default)]
pub struct AnalysisScreen {
    material: DraftInput,
    consciousness: DraftInput,
    focus: AnalysisField,
    validation: ValidationErrors,
    pending: Option<PendingAnalysis>,
    shown: Option<ShownResult>,
    error: Option<&'static str>,
}

impl Drop for AnalysisScreen {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.task.abort();
        }
    }
}

impl AnalysisScreen {
    #[must_use]
    pub fn input(&self, field: AnalysisField) -> &DraftInput {
        match field {
            AnalysisField::Material => &self.material,
            AnalysisField::Consciousness => &self.consciousness,
        }
    }

    #[must_use]
    pub fn focus(&self) -> AnalysisField {
        self.focus
    }

    #[must_use]
    pub fn validation(&self) -> &ValidationErrors {
        &self.validation
    }

    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        self.pending.is_some()
    }

    /// How long the in-flight request has been running.
    #[must_use]
    pub fn analyzing_for(&self) -> Option<Duration> {
        self.pending.as_ref().map(|p| p.started.elapsed())
    }

    #[must_use]
    pub fn result(&self) -> Option<&ShownResult> {
        self.shown.as_ref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// Both fields hold something non-blank; mirrors the analyze button state.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.is_analyzing()
            && !self.material.text().trim().is_empty()
            && !self.consciousness.text().trim().is_empty()
    }

    pub fn set_focus(&mut self, field: AnalysisField) {
        self.focus = field;
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.other();
    }

    /// Edit the focused field. Ignored while a request is pending.
    pub fn edit(&mut self, f: impl FnOnce(&mut DraftInput)) {
        if self.is_analyzing() {
            return;
        }
        let field = self.focus;
        let draft = match field {
            AnalysisField::Material => &mut self.material,
            AnalysisField::Consciousness => &mut self.consciousness,
        };
        let before = draft.text().to_string();
        f(draft);
        if draft.text() != before {
            self.validation.clear(field);
        }
    }

    /// Validate and start a request. Returns `false` when nothing was started.
    pub fn submit(&mut self, settings: &AnalysisSettings) -> bool {
        if self.is_analyzing() {
            return false;
        }
        self.error = None;
        self.validation = ValidationErrors::default();

        let query = match AnalysisQuery::new(self.material.text(), self.consciousness.text()) {
            Ok(query) => query,
            Err(errors) => {
                self.validation = errors;
                if let Some(field) = [AnalysisField::Material, AnalysisField::Consciousness]
                    .into_iter()
                    .find(|f| errors.get(*f).is_some())
                {
                    self.focus = field;
                }
                return false;
            }
        };

        let config = match settings.api_config() {
            Ok(config) => config,
            Err(message) => {
                self.error = Some(message);
                return false;
            }
        };

        self.shown = None;
        let (tx, rx) = oneshot::channel();
        let task_query = query.clone();
        let task = tokio::spawn(async move {
            let outcome = mindmatter_providers::analyze(&config, &task_query).await;
            let _ = tx.send(outcome);
        });

        tracing::info!(
            provider = settings.provider.as_str(),
            model = %settings.model,
            "Analysis started"
        );
        self.pending = Some(PendingAnalysis {
            query,
            provider: settings.provider,
            started: Instant::now(),
            rx,
            task,
        });
        true
    }

    /// Check the in-flight request without blocking.
    pub(crate) fn poll(&mut self) -> PollOutcome {
        let Some(pending) = self.pending.as_mut() else {
            return PollOutcome::Idle;
        };

        let outcome = match pending.rx.try_recv() {
            Ok(outcome) => outcome,
            Err(oneshot::error::TryRecvError::Empty) => return PollOutcome::Pending,
            Err(oneshot::error::TryRecvError::Closed) => {
                tracing::warn!("Analysis task ended without reporting a result");
                self.pending = None;
                self.error = Some(GENERIC_ERROR_MESSAGE);
                return PollOutcome::Failed;
            }
        };

        let Some(pending) = self.pending.take() else {
            return PollOutcome::Idle;
        };
        match outcome {
            Ok(result) => {
                let record = AnalysisRecord::new(&pending.query, result.clone(), pending.provider);
                self.shown = Some(ShownResult {
                    result,
                    provider: pending.provider,
                });
                PollOutcome::Completed(record)
            }
            Err(e) => {
                tracing::warn!("Analysis request failed: {e}");
                self.error = Some(e.user_message());
                PollOutcome::Failed
            }
        }
    }

    /// Clear inputs, result and error. Validation messages stay.
    pub fn reset(&mut self) {
        if self.is_analyzing() {
            return;
        }
        self.material.clear();
        self.consciousness.clear();
        self.shown = None;
        self.error = None;
    }

    /// Like [`reset`](Self::reset), also dropping validation messages and
    /// returning focus to the first field.
    pub fn new_analysis(&mut self) {
        if self.is_analyzing() {
            return;
        }
        self.reset();
        self.validation = ValidationErrors::default();
        self.focus = AnalysisField::Material;
    }

    /// Put a past query and its answer back on screen.
    pub fn load_record(&mut self, record: &AnalysisRecord) {
        if self.is_analyzing() {
            return;
        }
        self.material.set_text(&record.material);
        self.consciousness.set_text(&record.consciousness);
        self.validation = ValidationErrors::default();
        self.error = None;
        self.shown = Some(ShownResult {
            result: record.result.clone(),
            provider: record.provider,
        });
    }
}
