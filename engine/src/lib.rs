//! Core engine for mindmatter.
//!
//! [`App`] owns all state for both screens and exposes synchronous operations
//! for the TUI to call. The only asynchronous piece is the analysis request,
//! which is spawned on the ambient tokio runtime and collected in [`App::tick`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

pub use mindmatter_config::MindmatterConfig;
pub use mindmatter_providers::{self, ApiConfig, ProviderError};
pub use mindmatter_types::{
    AnalysisField, AnalysisRecord, AnalysisResult, ApiKey, GameState, GameStatus, MatchOutcome,
    Provider, UiOptions, View,
};

mod analysis;
mod draft;
mod flashcard;
mod history;

pub use analysis::{AnalysisScreen, AnalysisSettings, ShownResult};
pub use draft::DraftInput;
pub use flashcard::{FlashcardScreen, RandomPicker};
pub use history::{HistoryError, HistoryStore};

use analysis::PollOutcome;

/// Spinner cadence, independent of render FPS.
const UI_TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Inputs to [`App::new`], usually derived from the config file.
#[derive(Debug, Clone, Default)]
pub struct AppSettings {
    pub ui: UiOptions,
    pub analysis: AnalysisSettings,
    /// `None` keeps history in memory only.
    pub history_path: Option<PathBuf>,
}

impl AppSettings {
    #[must_use]
    pub fn from_config(config: Option<&MindmatterConfig>) -> Self {
        match config {
            Some(config) => Self {
                ui: config.ui_options(),
                analysis: AnalysisSettings::from_config(config),
                history_path: config.history_path(),
            },
            None => {
                let defaults = MindmatterConfig::default();
                Self {
                    ui: UiOptions::default(),
                    analysis: AnalysisSettings::from_config(&defaults),
                    history_path: mindmatter_config::default_history_path(),
                }
            }
        }
    }
}

/// State of the history overlay on the analysis screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryPanel {
    /// Index in newest-first order.
    pub selected: usize,
}

#[derive(Debug)]
pub struct App {
    view: View,
    ui_options: UiOptions,
    flashcard: FlashcardScreen,
    analysis: AnalysisScreen,
    analysis_settings: AnalysisSettings,
    history: HistoryStore,
    history_panel: Option<HistoryPanel>,
    notice: Option<String>,
    should_quit: bool,
    tick: usize,
    last_ui_tick: Instant,
    last_frame: Instant,
}

impl App {
    #[must_use]
    pub fn new(settings: AppSettings) -> Self {
        let history = match settings.history_path {
            Some(path) => HistoryStore::open(path),
            None => HistoryStore::in_memory(),
        };
        let mut app = Self::with_history(settings.ui, settings.analysis, history);
        app.notice = app.history.load_warning().map(str::to_string);
        app
    }

    #[must_use]
    pub fn with_history(
        ui_options: UiOptions,
        analysis_settings: AnalysisSettings,
        history: HistoryStore,
    ) -> Self {
        let now = Instant::now();
        Self {
            view: View::default(),
            ui_options,
            flashcard: FlashcardScreen::default(),
            analysis: AnalysisScreen::default(),
            analysis_settings,
            history,
            history_panel: None,
            notice: None,
            should_quit: false,
            tick: 0,
            last_ui_tick: now,
            last_frame: now,
        }
    }

    // ------------------------------------------------------------------
    // Shell
    // ------------------------------------------------------------------

    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    #[must_use]
    pub fn tick_count(&self) -> usize {
        self.tick
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    pub fn toggle_view(&mut self) {
        self.set_view(self.view.toggle());
    }

    pub fn set_view(&mut self, view: View) {
        self.view = view;
        self.history_panel = None;
    }

    #[must_use]
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Show a one-line message in the status bar until the next key press.
    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    #[must_use]
    pub fn analysis_settings(&self) -> &AnalysisSettings {
        &self.analysis_settings
    }

    /// Collect a finished analysis and advance the spinner.
    pub fn tick(&mut self) {
        self.process_analysis_events();

        let now = Instant::now();
        if now.duration_since(self.last_ui_tick) >= UI_TICK_INTERVAL {
            self.last_ui_tick = now;
            self.tick = self.tick.wrapping_add(1);
        }
    }

    pub fn frame_elapsed(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.last_frame = now;
        elapsed
    }

    // ------------------------------------------------------------------
    // Flashcard game
    // ------------------------------------------------------------------

    #[must_use]
    pub fn flashcard(&self) -> &FlashcardScreen {
        &self.flashcard
    }

    #[must_use]
    pub fn game(&self) -> &GameState {
        self.flashcard.game()
    }

    pub fn start_game(&mut self) {
        self.flashcard.start();
    }

    pub fn move_card_cursor(&mut self, delta: isize) {
        self.flashcard.move_cursor(delta);
    }

    pub fn select_card_at_cursor(&mut self) {
        if let Err(e) = self.flashcard.select_at_cursor() {
            tracing::debug!("Select ignored: {e}");
        }
    }

    pub fn draw_card(&mut self) {
        if let Err(e) = self.flashcard.draw() {
            tracing::debug!("Draw ignored: {e}");
        }
    }

    pub fn check_match(&mut self) -> Option<MatchOutcome> {
        match self.flashcard.check_match() {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::debug!("Check ignored: {e}");
                None
            }
        }
    }

    pub fn dismiss_feedback(&mut self) {
        self.flashcard.dismiss_feedback();
    }

    pub fn reset_game(&mut self) {
        self.flashcard.reset();
    }

    pub fn play_again(&mut self) {
        self.flashcard.play_again();
    }

    // ------------------------------------------------------------------
    // Analysis
    // ------------------------------------------------------------------

    #[must_use]
    pub fn analysis(&self) -> &AnalysisScreen {
        &self.analysis
    }

    #[must_use]
    pub fn is_analyzing(&self) -> bool {
        self.analysis.is_analyzing()
    }

    pub fn focus_next_field(&mut self) {
        self.analysis.focus_next();
    }

    pub fn focus_field(&mut self, field: AnalysisField) {
        self.analysis.set_focus(field);
    }

    /// Apply an edit to the focused input. No-op while analyzing.
    pub fn edit_input(&mut self, f: impl FnOnce(&mut DraftInput)) {
        self.analysis.edit(f);
    }

    /// Validate the form and start a request. Returns whether one started.
    pub fn submit_analysis(&mut self) -> bool {
        self.analysis.submit(&self.analysis_settings)
    }

    pub fn reset_analysis(&mut self) {
        self.analysis.reset();
    }

    pub fn new_analysis(&mut self) {
        self.analysis.new_analysis();
    }

    /// Poll the in-flight request; on success the record joins the history.
    pub fn process_analysis_events(&mut self) {
        match self.analysis.poll() {
            PollOutcome::Idle | PollOutcome::Pending | PollOutcome::Failed => {}
            PollOutcome::Completed(record) => {
                if let Err(e) = self.history.add(record) {
                    tracing::warn!("Failed to save analysis history: {e}");
                    self.notice = Some("Could not save this analysis to history.".to_string());
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    #[must_use]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    #[must_use]
    pub fn history_panel(&self) -> Option<HistoryPanel> {
        self.history_panel
    }

    pub fn open_history(&mut self) {
        self.history_panel = Some(HistoryPanel::default());
    }

    pub fn close_history(&mut self) {
        self.history_panel = None;
    }

    pub fn move_history_selection(&mut self, delta: isize) {
        let len = self.history.len();
        if let Some(panel) = self.history_panel.as_mut() {
            panel.selected = if len == 0 {
                0
            } else {
                panel.selected.saturating_add_signed(delta).min(len - 1)
            };
        }
    }

    /// Load the selected entry into the form and close the panel.
    pub fn load_selected_history(&mut self) {
        if self.analysis.is_analyzing() {
            return;
        }
        let Some(panel) = self.history_panel else {
            return;
        };
        if let Some(record) = self.history.get_newest(panel.selected) {
            self.analysis.load_record(record);
            self.history_panel = None;
        }
    }

    pub fn delete_selected_history(&mut self) {
        let Some(panel) = self.history_panel.as_mut() else {
            return;
        };
        let Some(id) = self.history.get_newest(panel.selected).map(|r| r.id) else {
            return;
        };
        if let Err(e) = self.history.delete(id) {
            tracing::warn!("Failed to delete history entry: {e}");
            self.notice = Some("Could not update saved history.".to_string());
        }
        panel.selected = panel.selected.min(self.history.len().saturating_sub(1));
    }

    pub fn clear_history(&mut self) {
        if let Err(e) = self.history.clear() {
            tracing::warn!("Failed to clear history: {e}");
            self.notice = Some("Could not update saved history.".to_string());
        }
        if let Some(panel) = self.history_panel.as_mut() {
            panel.selected = 0;
        }
    }
}
