//! UI state types shared by the engine (state ownership) and the TUI
//! (rendering/input). Pure data, no ratatui dependency.

/// Top-level screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Flashcard,
    Analysis,
}

impl View {
    #[must_use]
    pub fn toggle(self) -> Self {
        match self {
            View::Flashcard => View::Analysis,
            View::Analysis => View::Flashcard,
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            View::Flashcard => "Flashcard Game",
            View::Analysis => "AI Analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}
