//! Flashcard game screen: the game state plus the candidate-list cursor.

use mindmatter_types::{CardPicker, GameError, GameState, GameStatus, MatchOutcome};

/// Picks with the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl CardPicker for RandomPicker {
    fn pick(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((rand::random::<f64>() * len as f64) as usize).min(len - 1)
    }
}

#[derive(Debug)]
pub struct FlashcardScreen<P: CardPicker = RandomPicker> {
    game: GameState,
    picker: P,
    cursor: usize,
}

impl Default for FlashcardScreen {
    fn default() -> Self {
        Self::with_picker(GameState::default(), RandomPicker)
    }
}

impl<P: CardPicker> FlashcardScreen<P> {
    pub fn with_picker(game: GameState, picker: P) -> Self {
        Self {
            game,
            picker,
            cursor: 0,
        }
    }

    #[must_use]
    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Index into the displayed candidate list.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn start(&mut self) {
        self.game.start(&mut self.picker);
        self.cursor = 0;
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.game.available_len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Select the candidate under the cursor.
    pub fn select_at_cursor(&mut self) -> Result<(), GameError> {
        let id = self
            .game
            .available_conscious_cards()
            .nth(self.cursor)
            .map(|card| card.id)
            .ok_or(GameError::NotPlaying)?;
        self.game.select_conscious_card(id)
    }

    pub fn draw(&mut self) -> Result<(), GameError> {
        self.game.draw_material_card(&mut self.picker)
    }

    pub fn check_match(&mut self) -> Result<MatchOutcome, GameError> {
        let outcome = self.game.check_match(&mut self.picker)?;
        let len = self.game.available_len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
        match outcome {
            MatchOutcome::Correct { points } => tracing::debug!(
                points,
                score = self.game.score(),
                matches = self.game.matches(),
                "Correct match"
            ),
            MatchOutcome::Incorrect => tracing::debug!("Incorrect match"),
        }
        if self.game.status() == GameStatus::Finished {
            tracing::info!(score = self.game.score(), "Game finished");
        }
        Ok(outcome)
    }

    pub fn dismiss_feedback(&mut self) {
        self.game.clear_feedback();
    }

    pub fn reset(&mut self) {
        self.game.reset();
        self.cursor = 0;
    }

    /// Reset and go straight back into play.
    pub fn play_again(&mut self) {
        self.reset();
        self.start();
    }
}

#[cfg(test)]
mod tests {
    use super::{FlashcardScreen, RandomPicker};
    use mindmatter_types::{CardPicker, GameState, GameStatus, MatchOutcome};

    fn first_picker(_len: usize) -> usize {
        0
    }

    #[test]
    fn random_picker_stays_in_range() {
        let mut picker = RandomPicker;
        for len in 1..20 {
            for _ in 0..50 {
                assert!(picker.pick(len) < len);
            }
        }
    }

    #[test]
    fn cursor_is_clamped_to_candidates() {
        let mut screen = FlashcardScreen::with_picker(GameState::default(), first_picker);
        screen.start();
        screen.move_cursor(-3);
        assert_eq!(screen.cursor(), 0);
        screen.move_cursor(100);
        assert_eq!(screen.cursor(), screen.game().available_len() - 1);
    }

    #[test]
    fn matching_every_card_finishes_the_game() {
        let mut screen = FlashcardScreen::with_picker(GameState::default(), first_picker);
        screen.start();
        let total = screen.game().total_cards();

        for _ in 0..total {
            let material = screen.game().current_material_card().unwrap().id;
            let answer = screen.game().deck().pairing_for(material).unwrap().conscious;
            let index = screen
                .game()
                .available_conscious_cards()
                .position(|card| card.id == answer)
                .unwrap();
            screen.move_cursor(-100);
            screen.move_cursor(index as isize);
            screen.select_at_cursor().unwrap();
            assert!(matches!(
                screen.check_match().unwrap(),
                MatchOutcome::Correct { .. }
            ));
        }

        assert_eq!(screen.game().status(), GameStatus::Finished);
        assert_eq!(screen.cursor(), 0);

        screen.play_again();
        assert_eq!(screen.game().status(), GameStatus::Playing);
        assert_eq!(screen.game().score(), 0);
    }
}
