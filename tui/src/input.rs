//! Input handling for the mindmatter TUI.

use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};
use tokio::sync::mpsc;
use tracing::debug;

use mindmatter_engine::{App, GameStatus, View};

const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(25); // shutdown responsiveness
const INPUT_CHANNEL_CAPACITY: usize = 1024; // bounded: no OOM
const MAX_EVENTS_PER_FRAME: usize = 64; // never starve rendering

enum InputMsg {
    Event(Event),
    Error(String),
}

/// Reads terminal events on a blocking thread and hands them to the frame loop.
pub struct InputPump {
    rx: mpsc::Receiver<InputMsg>,
    stop: Arc<AtomicBool>,
    join: Option<tokio::task::JoinHandle<()>>,
}

impl InputPump {
    #[must_use]
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel(INPUT_CHANNEL_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let stop2 = stop.clone();

        let join = tokio::task::spawn_blocking(move || input_loop(stop2, tx));
        Self {
            rx,
            stop,
            join: Some(join),
        }
    }

    pub async fn shutdown(&mut self) {
        // Closing first unblocks a reader stuck on a full channel.
        self.rx.close();

        self.stop.store(true, Ordering::Release);
        if let Some(join) = self.join.take() {
            let _ = tokio::time::timeout(Duration::from_secs(2), join).await;
        }
    }
}

impl Default for InputPump {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for InputPump {
    fn drop(&mut self) {
        // Do not block in Drop.
        self.rx.close();
        self.stop.store(true, Ordering::Release);
    }
}

fn input_loop(stop: Arc<AtomicBool>, tx: mpsc::Sender<InputMsg>) {
    while !stop.load(Ordering::Acquire) {
        match event::poll(INPUT_POLL_TIMEOUT) {
            Ok(true) => match event::read() {
                Ok(ev) => {
                    // Backpressure instead of dropping events.
                    if tx.blocking_send(InputMsg::Event(ev)).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                    break;
                }
            },
            Ok(false) => {}
            Err(e) => {
                let _ = tx.blocking_send(InputMsg::Error(e.to_string()));
                break;
            }
        }
    }
}

/// Drain pending input into `app`. Returns `Ok(true)` once the app should quit.
pub fn handle_events(app: &mut App, input: &mut InputPump) -> Result<bool> {
    let mut processed = 0;
    while processed < MAX_EVENTS_PER_FRAME {
        let ev = match input.rx.try_recv() {
            Ok(InputMsg::Event(ev)) => ev,
            Ok(InputMsg::Error(msg)) => return Err(anyhow!("input error: {msg}")),
            Err(mpsc::error::TryRecvError::Empty) => break,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                return Err(anyhow!("input pump disconnected"));
            }
        };

        if apply_event(app, ev) {
            return Ok(true);
        }
        processed += 1;
    }

    if processed == MAX_EVENTS_PER_FRAME {
        debug!(
            backlog = input.rx.len(),
            "Input budget exhausted; deferring events"
        );
    }
    Ok(app.should_quit())
}

/// Apply one terminal event. Returns whether the app should quit.
pub(crate) fn apply_event(app: &mut App, event: Event) -> bool {
    match event {
        Event::Key(key) => {
            if matches!(key.kind, KeyEventKind::Release) {
                return app.should_quit();
            }

            if key.modifiers.contains(KeyModifiers::CONTROL) {
                match key.code {
                    KeyCode::Char('c') => {
                        app.request_quit();
                        return true;
                    }
                    KeyCode::Char('t') => {
                        app.dismiss_notice();
                        app.toggle_view();
                        return app.should_quit();
                    }
                    _ => {}
                }
            }

            app.dismiss_notice();
            match app.view() {
                View::Flashcard => handle_flashcard_key(app, key),
                View::Analysis if app.history_panel().is_some() => handle_history_key(app, key),
                View::Analysis => handle_analysis_key(app, key),
            }
        }
        Event::Paste(text) => {
            if app.view() == View::Analysis && app.history_panel().is_none() {
                let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
                app.edit_input(|draft| draft.enter_text(&normalized));
            }
        }
        _ => {}
    }
    app.should_quit()
}

fn handle_flashcard_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('q') {
        app.request_quit();
        return;
    }

    // The feedback popup swallows the next key.
    if app.game().feedback().is_some() {
        app.dismiss_feedback();
        return;
    }

    match app.game().status() {
        GameStatus::Waiting => {
            if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ' | 's')) {
                app.start_game();
            }
        }
        GameStatus::Playing => match key.code {
            KeyCode::Up | KeyCode::Char('k') => app.move_card_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => app.move_card_cursor(1),
            KeyCode::Char(' ') => app.select_card_at_cursor(),
            KeyCode::Enter => {
                if app.game().selected_conscious_card().is_none() {
                    app.select_card_at_cursor();
                } else {
                    app.check_match();
                }
            }
            KeyCode::Char('m') => {
                app.check_match();
            }
            KeyCode::Char('d') => app.draw_card(),
            KeyCode::Char('r') => app.reset_game(),
            _ => {}
        },
        GameStatus::Finished => match key.code {
            KeyCode::Enter | KeyCode::Char(' ' | 'p') => app.play_again(),
            KeyCode::Char('r') => app.reset_game(),
            _ => {}
        },
    }
}

fn handle_analysis_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('r') => app.reset_analysis(),
            KeyCode::Char('n') => app.new_analysis(),
            KeyCode::Char('l') => app.open_history(),
            KeyCode::Char('w') => app.edit_input(|draft| draft.delete_word_backwards()),
            KeyCode::Char('a') => app.edit_input(|draft| draft.move_cursor_home()),
            KeyCode::Char('e') => app.edit_input(|draft| draft.move_cursor_end()),
            KeyCode::Char('u') => app.edit_input(|draft| draft.clear()),
            _ => {}
        }
        return;
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return;
    }

    match key.code {
        KeyCode::Esc => app.set_view(View::Flashcard),
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => app.focus_next_field(),
        KeyCode::Enter => {
            app.submit_analysis();
        }
        KeyCode::Char(c) => app.edit_input(|draft| draft.enter_char(c)),
        KeyCode::Backspace => app.edit_input(|draft| draft.delete_char()),
        KeyCode::Delete => app.edit_input(|draft| draft.delete_char_forward()),
        KeyCode::Left => app.edit_input(|draft| draft.move_cursor_left()),
        KeyCode::Right => app.edit_input(|draft| draft.move_cursor_right()),
        KeyCode::Home => app.edit_input(|draft| draft.move_cursor_home()),
        KeyCode::End => app.edit_input(|draft| draft.move_cursor_end()),
        _ => {}
    }
}

fn handle_history_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_history(),
        KeyCode::Up | KeyCode::Char('k') => app.move_history_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_history_selection(1),
        KeyCode::Enter => app.load_selected_history(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_history(),
        KeyCode::Char('c') => app.clear_history(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use mindmatter_engine::{
        AnalysisField, AnalysisSettings, App, GameStatus, HistoryStore, UiOptions, View,
    };

    use super::apply_event;

    fn new_app() -> App {
        App::with_history(
            UiOptions::default(),
            AnalysisSettings::default(),
            HistoryStore::in_memory(),
        )
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        apply_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(app: &mut App, c: char) -> bool {
        apply_event(
            app,
            Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)),
        )
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn ctrl_c_quits_from_any_view() {
        let mut app = new_app();
        assert!(ctrl(&mut app, 'c'));
        assert!(app.should_quit());

        let mut app = new_app();
        ctrl(&mut app, 't');
        assert!(ctrl(&mut app, 'c'));
    }

    #[test]
    fn q_quits_game_but_types_in_analysis() {
        let mut app = new_app();
        ctrl(&mut app, 't');
        assert_eq!(app.view(), View::Analysis);
        assert!(!press(&mut app, KeyCode::Char('q')));
        assert_eq!(app.analysis().input(AnalysisField::Material).text(), "q");

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.view(), View::Flashcard);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn enter_starts_then_selects_then_checks() {
        let mut app = new_app();
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.game().status(), GameStatus::Playing);

        press(&mut app, KeyCode::Down);
        assert_eq!(app.flashcard().cursor(), 1);
        press(&mut app, KeyCode::Enter);
        assert!(app.game().selected_conscious_card().is_some());
        press(&mut app, KeyCode::Enter);
        assert!(app.game().feedback().is_some());

        // Any key closes the popup without acting.
        press(&mut app, KeyCode::Char('r'));
        assert!(app.game().feedback().is_none());
        assert_eq!(app.game().status(), GameStatus::Playing);
    }

    #[test]
    fn tab_switches_field_and_paste_flattens_newlines() {
        let mut app = new_app();
        ctrl(&mut app, 't');
        type_text(&mut app, "iron");
        press(&mut app, KeyCode::Tab);
        apply_event(&mut app, Event::Paste("rust\r\nand decay".to_string()));

        assert_eq!(app.analysis().input(AnalysisField::Material).text(), "iron");
        assert_eq!(
            app.analysis().input(AnalysisField::Consciousness).text(),
            "rust and decay"
        );

        ctrl(&mut app, 'w');
        assert_eq!(
            app.analysis().input(AnalysisField::Consciousness).text(),
            "rust and "
        );
    }

    #[test]
    fn enter_with_short_input_shows_validation() {
        let mut app = new_app();
        ctrl(&mut app, 't');
        type_text(&mut app, "a");
        press(&mut app, KeyCode::Enter);
        assert!(!app.is_analyzing());
        assert!(app.analysis().validation().material.is_some());
    }

    #[test]
    fn history_overlay_captures_keys() {
        let mut app = new_app();
        ctrl(&mut app, 't');
        ctrl(&mut app, 'l');
        assert!(app.history_panel().is_some());

        type_text(&mut app, "x");
        assert!(app.analysis().input(AnalysisField::Material).is_empty());

        press(&mut app, KeyCode::Esc);
        assert!(app.history_panel().is_none());
        assert_eq!(app.view(), View::Analysis);
    }
}
