//! Matching game state machine.
//!
//! ```text
//! Waiting --start--> Playing --check_match (last pair)--> Finished
//!    ^                  |  ^                                 |
//!    |                  +--+ draw / select / check           |
//!    +------------------------- reset -----------------------+
//! ```
//!
//! All transitions are synchronous. Randomness comes in through a
//! [`CardPicker`] so tests can drive the game deterministically.

use thiserror::Error;

use crate::cards::{ConsciousCard, ConsciousCardId, Deck, MaterialCard, MaterialCardId};

/// Points awarded for each correct pairing.
pub const POINTS_PER_MATCH: u32 = 10;

/// Source of randomness for drawing and shuffling cards.
pub trait CardPicker {
    /// Return an index in `0..len`. `len` is never zero.
    fn pick(&mut self, len: usize) -> usize;
}

impl<F> CardPicker for F
where
    F: FnMut(usize) -> usize,
{
    fn pick(&mut self, len: usize) -> usize {
        self(len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameStatus {
    #[default]
    Waiting,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKind {
    Success,
    Retry,
}

/// Transient message shown after a match attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub kind: FeedbackKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Correct { points: u32 },
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("the game is not in progress")]
    NotPlaying,
    #[error("no consciousness card is selected")]
    NothingSelected,
    #[error("consciousness card {0:?} is not among the displayed candidates")]
    CandidateNotAvailable(ConsciousCardId),
}

#[derive(Debug, Clone)]
pub struct GameState {
    deck: Deck,
    status: GameStatus,
    score: u32,
    matches: u32,
    current: Option<MaterialCardId>,
    matched: Vec<MaterialCardId>,
    available: Vec<ConsciousCardId>,
    selected: Option<ConsciousCardId>,
    feedback: Option<Feedback>,
}

impl GameState {
    #[must_use]
    pub fn new(deck: Deck) -> Self {
        Self {
            deck,
            status: GameStatus::Waiting,
            score: 0,
            matches: 0,
            current: None,
            matched: Vec::new(),
            available: deck.conscious_cards().iter().map(|c| c.id).collect(),
            selected: None,
            feedback: None,
        }
    }

    #[must_use]
    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.status
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn matches(&self) -> u32 {
        self.matches
    }

    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.deck.len()
    }

    /// Completion ratio in `0.0..=1.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        if self.deck.is_empty() {
            return 0.0;
        }
        f64::from(self.matches) / self.deck.len() as f64
    }

    #[must_use]
    pub fn current_material_card(&self) -> Option<&'static MaterialCard> {
        self.current.and_then(|id| self.deck.material(id))
    }

    /// Candidates currently on the table, in display order.
    pub fn available_conscious_cards(&self) -> impl Iterator<Item = &'static ConsciousCard> + '_ {
        self.available
            .iter()
            .filter_map(|id| self.deck.conscious(*id))
    }

    #[must_use]
    pub fn available_len(&self) -> usize {
        self.available.len()
    }

    #[must_use]
    pub fn selected_conscious_card(&self) -> Option<&'static ConsciousCard> {
        self.selected.and_then(|id| self.deck.conscious(id))
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn clear_feedback(&mut self) {
        self.feedback = None;
    }

    /// Leave the welcome screen: shuffle the candidates and draw the first card.
    pub fn start(&mut self, picker: &mut impl CardPicker) {
        if self.status != GameStatus::Waiting {
            return;
        }
        self.feedback = None;
        shuffle(&mut self.available, picker);
        self.status = GameStatus::Playing;
        self.current = self.pick_unmatched(None, picker);
    }

    /// Swap the current material card for another unmatched one.
    pub fn draw_material_card(&mut self, picker: &mut impl CardPicker) -> Result<(), GameError> {
        self.require_playing()?;
        self.feedback = None;
        self.selected = None;
        self.current = self.pick_unmatched(self.current, picker);
        Ok(())
    }

    pub fn select_conscious_card(&mut self, id: ConsciousCardId) -> Result<(), GameError> {
        self.require_playing()?;
        if !self.available.contains(&id) {
            return Err(GameError::CandidateNotAvailable(id));
        }
        self.feedback = None;
        self.selected = Some(id);
        Ok(())
    }

    /// Evaluate the selected candidate against the current material card.
    pub fn check_match(&mut self, picker: &mut impl CardPicker) -> Result<MatchOutcome, GameError> {
        self.require_playing()?;
        let selected = self.selected.ok_or(GameError::NothingSelected)?;
        let Some(material) = self.current_material_card() else {
            return Err(GameError::NotPlaying);
        };
        let candidate = self
            .deck
            .conscious(selected)
            .ok_or(GameError::CandidateNotAvailable(selected))?;
        self.selected = None;

        let Some(pairing) = self
            .deck
            .pairing_for(material.id)
            .filter(|p| p.conscious == selected)
        else {
            self.feedback = Some(Feedback {
                kind: FeedbackKind::Retry,
                message: format!(
                    "❌ Not a match!\n\"{}\" does not pair with \"{}\". Try another card.",
                    candidate.content, material.content
                ),
            });
            return Ok(MatchOutcome::Incorrect);
        };

        self.score = self.score.saturating_add(POINTS_PER_MATCH);
        self.matches = self.matches.saturating_add(1);
        self.matched.push(material.id);
        self.available.retain(|id| *id != selected);
        self.feedback = Some(Feedback {
            kind: FeedbackKind::Success,
            message: format!(
                "🎉 Correct match! +{POINTS_PER_MATCH} points\n\n🔬 {}\n\n🧠 {}\n\n⚡ Interaction: {}",
                material.detail, candidate.detail, pairing.interaction
            ),
        });

        self.current = self.pick_unmatched(None, picker);
        if self.current.is_none() {
            self.status = GameStatus::Finished;
        }
        Ok(MatchOutcome::Correct {
            points: POINTS_PER_MATCH,
        })
    }

    /// Back to the welcome screen with a fresh score over the same deck.
    pub fn reset(&mut self) {
        *self = Self::new(self.deck);
    }

    fn require_playing(&self) -> Result<(), GameError> {
        if self.status == GameStatus::Playing {
            Ok(())
        } else {
            Err(GameError::NotPlaying)
        }
    }

    /// Pick a random unmatched material card, avoiding `exclude` unless it is
    /// the only one left.
    fn pick_unmatched(
        &self,
        exclude: Option<MaterialCardId>,
        picker: &mut impl CardPicker,
    ) -> Option<MaterialCardId> {
        let unmatched: Vec<MaterialCardId> = self
            .deck
            .material_cards()
            .iter()
            .map(|card| card.id)
            .filter(|id| !self.matched.contains(id))
            .collect();
        let candidates: Vec<MaterialCardId> = if unmatched.len() > 1 {
            unmatched
                .iter()
                .copied()
                .filter(|id| Some(*id) != exclude)
                .collect()
        } else {
            unmatched
        };
        if candidates.is_empty() {
            return None;
        }
        let index = picker.pick(candidates.len()).min(candidates.len() - 1);
        Some(candidates[index])
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(Deck::builtin())
    }
}

/// Fisher-Yates over the picker.
fn shuffle<T>(items: &mut [T], picker: &mut impl CardPicker) {
    for i in (1..items.len()).rev() {
        let j = picker.pick(i + 1).min(i);
        items.swap(i, j);
    }
}
