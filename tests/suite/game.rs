//! Flashcard game rules, played through the public state machine.

use mindmatter_engine::{AnalysisSettings, App, HistoryStore, UiOptions};
use mindmatter_types::{
    ConsciousCardId, FeedbackKind, GameState, GameStatus, MatchOutcome, POINTS_PER_MATCH,
};

fn first(_len: usize) -> usize {
    0
}

fn correct_answer(game: &GameState) -> ConsciousCardId {
    let material = game.current_material_card().unwrap().id;
    game.deck().pairing_for(material).unwrap().conscious
}

fn wrong_answer(game: &GameState) -> ConsciousCardId {
    let right = correct_answer(game);
    game.available_conscious_cards()
        .map(|card| card.id)
        .find(|id| *id != right)
        .unwrap()
}

#[test]
fn score_only_ever_grows_by_points_per_match() {
    let mut game = GameState::default();
    game.start(&mut first);
    let mut picker = first;

    let mut last_score = 0;
    let mut last_matches = 0;
    let mut round = 0;
    while game.status() == GameStatus::Playing {
        // Alternate a miss and a hit while two or more candidates remain.
        if round % 2 == 0 && game.available_len() > 1 {
            game.select_conscious_card(wrong_answer(&game)).unwrap();
            assert_eq!(
                game.check_match(&mut picker).unwrap(),
                MatchOutcome::Incorrect
            );
            assert_eq!(game.score(), last_score);
            assert_eq!(game.matches(), last_matches);
            assert_eq!(game.feedback().unwrap().kind, FeedbackKind::Retry);
        } else {
            game.select_conscious_card(correct_answer(&game)).unwrap();
            assert_eq!(
                game.check_match(&mut picker).unwrap(),
                MatchOutcome::Correct {
                    points: POINTS_PER_MATCH
                }
            );
            assert_eq!(game.score(), last_score + POINTS_PER_MATCH);
            assert_eq!(game.matches(), last_matches + 1);
            assert_eq!(game.feedback().unwrap().kind, FeedbackKind::Success);
        }
        last_score = game.score();
        last_matches = game.matches();
        round += 1;
    }

    assert_eq!(game.status(), GameStatus::Finished);
    assert_eq!(game.matches() as usize, game.total_cards());
    assert_eq!(
        game.score(),
        POINTS_PER_MATCH * game.total_cards() as u32
    );
    assert!((game.progress() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn incorrect_match_clears_the_selection() {
    let mut game = GameState::default();
    game.start(&mut first);
    game.select_conscious_card(wrong_answer(&game)).unwrap();
    game.check_match(&mut first).unwrap();
    assert!(game.selected_conscious_card().is_none());
    assert!(game.check_match(&mut first).is_err());
}

#[test]
fn success_feedback_has_detailed_sections() {
    let mut game = GameState::default();
    game.start(&mut first);
    game.select_conscious_card(correct_answer(&game)).unwrap();
    game.check_match(&mut first).unwrap();

    let message = &game.feedback().unwrap().message;
    assert!(mindmatter_types::is_detailed_feedback(message));
    let sections = mindmatter_types::feedback_sections(message);
    assert_eq!(sections.len(), 4);
}

#[test]
fn app_game_actions_are_no_ops_outside_play() {
    let mut app = App::with_history(
        UiOptions::default(),
        AnalysisSettings::default(),
        HistoryStore::in_memory(),
    );
    app.draw_card();
    app.select_card_at_cursor();
    assert!(app.check_match().is_none());
    assert_eq!(app.game().status(), GameStatus::Waiting);

    app.start_game();
    let first_card = app.game().current_material_card().unwrap().id;
    app.draw_card();
    // Drawing never repeats the card on screen while others remain.
    assert_ne!(app.game().current_material_card().unwrap().id, first_card);

    app.play_again();
    assert_eq!(app.game().status(), GameStatus::Playing);
    assert_eq!(app.game().score(), 0);
}
