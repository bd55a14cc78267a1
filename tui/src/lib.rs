//! TUI rendering for mindmatter using ratatui.

mod analysis;
mod flashcard;
mod input;
mod theme;

pub use input::{InputPump, handle_events};
pub use theme::{Glyphs, Palette, glyphs, palette, spinner_frame, styles};

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph, Tabs},
};

use mindmatter_engine::{App, GameStatus, UiOptions, View};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let options = app.ui_options();
    let palette = palette(options);
    let glyphs = glyphs(options);
    // Clear with background color
    let bg_block = Block::default().style(Style::default().bg(palette.background));
    frame.render_widget(bg_block, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(1), // Tabs
            Constraint::Min(1),    // Active view
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    draw_tabs(frame, app, chunks[0], &palette);
    match app.view() {
        View::Flashcard => flashcard::draw_flashcard(frame, app, chunks[1], &palette, &glyphs),
        View::Analysis => analysis::draw_analysis(frame, app, chunks[1], &palette, &glyphs),
    }
    draw_status_bar(frame, app, chunks[2], &palette);

    if app.view() == View::Flashcard && app.game().feedback().is_some() {
        flashcard::draw_feedback_popup(frame, app, &palette, &glyphs);
    }
    if app.view() == View::Analysis && app.history_panel().is_some() {
        analysis::draw_history_panel(frame, app, &palette, &glyphs);
    }
}

fn draw_tabs(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let views = [View::Flashcard, View::Analysis];
    let selected = views.iter().position(|v| *v == app.view());
    let titles = views.iter().map(|v| format!(" {} ", v.title()));

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(styles::tab_inactive(palette))
        .highlight_style(styles::tab_active(palette))
        .divider(Span::styled(
            separator(app.ui_options()),
            styles::hint(palette),
        ));
    frame.render_widget(tabs, area);

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("Ctrl+T", styles::key(palette)),
        Span::styled(" switch ", styles::hint(palette)),
    ]))
    .alignment(Alignment::Right);
    frame.render_widget(hint, area);
}

pub(crate) fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect, palette: &Palette) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(40)])
        .split(area);

    let left = if let Some(notice) = app.notice() {
        Line::from(vec![
            Span::raw(" "),
            Span::styled(
                format!("Warning: {notice}"),
                Style::default().fg(palette.caution),
            ),
        ])
    } else {
        Line::from(key_hints(app, palette))
    };
    frame.render_widget(Paragraph::new(left), chunks[0]);

    let settings = app.analysis_settings();
    let sep = separator(app.ui_options());
    let right = if settings.api_key.is_some() {
        Line::from(vec![
            Span::styled(
                settings.provider.display_name(),
                Style::default()
                    .fg(palette.provider(settings.provider))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {sep} "), styles::hint(palette)),
            Span::styled(
                settings.model.clone(),
                Style::default().fg(palette.text_dim),
            ),
            Span::raw(" "),
        ])
    } else {
        Line::from(vec![
            Span::styled(
                format!("No API key {sep} set {}", settings.provider.env_var()),
                Style::default().fg(palette.error),
            ),
            Span::raw(" "),
        ])
    };
    frame.render_widget(Paragraph::new(right).alignment(Alignment::Right), chunks[1]);
}

fn key_hints(app: &App, palette: &Palette) -> Vec<Span<'static>> {
    let pairs: &[(&str, &str)] = match app.view() {
        View::Flashcard => match app.game().status() {
            GameStatus::Waiting => &[("Enter", "start"), ("q", "quit")],
            GameStatus::Playing => &[
                ("Up/Down", "move"),
                ("Space", "select"),
                ("Enter", "match"),
                ("d", "draw"),
                ("r", "reset"),
                ("q", "quit"),
            ],
            GameStatus::Finished => {
                &[("Enter", "play again"), ("r", "reset"), ("q", "quit")]
            }
        },
        View::Analysis if app.history_panel().is_some() => &[
            ("Enter", "load"),
            ("d", "delete"),
            ("c", "clear all"),
            ("Esc", "close"),
        ],
        View::Analysis => &[
            ("Enter", "analyze"),
            ("Tab", "field"),
            ("Ctrl+R", "reset"),
            ("Ctrl+N", "new"),
            ("Ctrl+L", "history"),
            ("Esc", "back"),
        ],
    };

    let mut spans = vec![Span::raw(" ")];
    for (key, action) in pairs {
        spans.push(Span::styled(*key, styles::key(palette)));
        spans.push(Span::styled(format!(" {action}  "), styles::hint(palette)));
    }
    spans
}

fn separator(options: UiOptions) -> &'static str {
    if options.ascii_only { "|" } else { "│" }
}

/// A rectangle of `width` x `height` centered in `area`, clamped to fit.
pub(crate) fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

/// Drop leading emoji and pictographs from a line when only ASCII may be drawn.
pub(crate) fn strip_leading_symbols(text: &str, ascii_only: bool) -> &str {
    if ascii_only {
        text.trim_start_matches(|c: char| !c.is_ascii() || c == '\u{fe0f}')
            .trim_start()
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use ratatui::layout::Rect;

    use super::{centered_rect, strip_leading_symbols};

    #[test]
    fn centered_rect_is_clamped() {
        let area = Rect::new(2, 2, 20, 10);
        assert_eq!(centered_rect(area, 10, 4), Rect::new(7, 5, 10, 4));
        assert_eq!(centered_rect(area, 50, 50), area);
    }

    #[test]
    fn leading_emoji_dropped_in_ascii_mode() {
        assert_eq!(
            strip_leading_symbols("🎉 Correct match!", true),
            "Correct match!"
        );
        assert_eq!(
            strip_leading_symbols("🎉 Correct match!", false),
            "🎉 Correct match!"
        );
    }
}
