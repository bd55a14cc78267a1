//! AI analysis screen and the history overlay.

use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Padding, Paragraph, Wrap},
};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use mindmatter_engine::{AnalysisField, App, DraftInput, ShownResult};
use mindmatter_types::{format_display_text, sanitize_terminal_text};

use crate::centered_rect;
use crate::theme::{Glyphs, Palette, spinner_frame, styles};

const INPUT_HEIGHT: u16 = 3;

fn placeholder(field: AnalysisField) -> &'static str {
    match field {
        AnalysisField::Material => "e.g. Sunlight on the skin",
        AnalysisField::Consciousness => "e.g. The feeling of warmth",
    }
}

pub(crate) fn draw_analysis(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(INPUT_HEIGHT), // Material input
            Constraint::Length(1),            // Material validation
            Constraint::Length(INPUT_HEIGHT), // Consciousness input
            Constraint::Length(1),            // Consciousness validation
            Constraint::Length(1),            // Status / error banner
            Constraint::Min(1),               // Result
        ])
        .split(area);

    let accepts_cursor = app.history_panel().is_none();
    for (field, input_area, message_area) in [
        (AnalysisField::Material, chunks[0], chunks[1]),
        (AnalysisField::Consciousness, chunks[2], chunks[3]),
    ] {
        draw_input(frame, app, field, input_area, palette, accepts_cursor);
        if let Some(message) = app.analysis().validation().get(field) {
            let line = Line::from(Span::styled(
                format!(" {} {message}", glyphs.error),
                Style::default().fg(palette.error),
            ));
            frame.render_widget(Paragraph::new(line), message_area);
        }
    }

    draw_status_line(frame, app, chunks[4], palette, glyphs);

    match app.analysis().result() {
        Some(shown) => draw_result(frame, app, shown, chunks[5], palette, glyphs),
        None => draw_empty_result(frame, app, chunks[5], palette, glyphs),
    }
}

fn draw_input(
    frame: &mut Frame,
    app: &App,
    field: AnalysisField,
    area: Rect,
    palette: &Palette,
    accepts_cursor: bool,
) {
    let analysis = app.analysis();
    let focused = analysis.focus() == field;
    let draft = analysis.input(field);
    let invalid = analysis.validation().get(field).is_some();

    let border_style = if invalid {
        Style::default().fg(palette.error)
    } else if focused {
        styles::border_focused(palette)
    } else {
        styles::border(palette)
    };
    let title_style = if focused {
        styles::label(palette)
    } else {
        Style::default().fg(palette.text_dim)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .padding(Padding::horizontal(1))
        .title(Span::styled(format!(" {} ", field.label()), title_style));
    let inner = block.inner(area);

    let (before_cursor_width, offset) = horizontal_scroll(draft, inner.width);
    let line = if draft.is_empty() {
        Line::from(Span::styled(
            placeholder(field),
            Style::default()
                .fg(palette.text_faint)
                .add_modifier(Modifier::ITALIC),
        ))
    } else {
        let style = if analysis.is_analyzing() {
            Style::default().fg(palette.text_faint)
        } else {
            Style::default().fg(palette.text)
        };
        Line::from(Span::styled(draft.text().to_string(), style))
    };
    let paragraph = Paragraph::new(line).block(block).scroll((0, offset));
    frame.render_widget(paragraph, area);

    if focused && accepts_cursor && !analysis.is_analyzing() && inner.width > 0 {
        let x = inner.x + before_cursor_width.saturating_sub(offset);
        frame.set_cursor_position(Position::new(x, inner.y));
    }
}

/// Width of the text left of the cursor and the column offset that keeps the
/// cursor inside a box `width` cells wide.
fn horizontal_scroll(draft: &DraftInput, width: u16) -> (u16, u16) {
    let before: String = draft
        .text()
        .graphemes(true)
        .take(draft.cursor())
        .collect();
    let before_width = u16::try_from(before.width()).unwrap_or(u16::MAX);
    let offset = before_width.saturating_sub(width.saturating_sub(1));
    (before_width, offset)
}

fn draw_status_line(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let analysis = app.analysis();
    let line = if let Some(elapsed) = analysis.analyzing_for() {
        let spinner = spinner_frame(app.tick_count(), app.ui_options());
        Line::from(vec![
            Span::styled(format!(" {spinner} "), Style::default().fg(palette.brand)),
            Span::styled(
                format!(
                    "Analyzing with {}... {}s",
                    app.analysis_settings().provider.display_name(),
                    elapsed.as_secs()
                ),
                Style::default().fg(palette.brand),
            ),
        ])
    } else if let Some(error) = analysis.error() {
        Line::from(vec![
            Span::styled(
                format!(" {} ", glyphs.error),
                Style::default()
                    .fg(palette.error)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(error, Style::default().fg(palette.error)),
        ])
    } else if analysis.can_submit() {
        Line::from(vec![
            Span::raw(" "),
            Span::styled("Enter", styles::key(palette)),
            Span::styled(" to analyze the relationship", styles::hint(palette)),
        ])
    } else {
        Line::from(Span::styled(
            " Fill in both fields to analyze",
            styles::hint(palette),
        ))
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_result(
    frame: &mut Frame,
    app: &App,
    shown: &ShownResult,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.brand))
        .padding(Padding::horizontal(1))
        .title(Span::styled(" Analysis Result ", styles::title(palette)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Sections
            Constraint::Length(1), // Confidence gauge
            Constraint::Length(1), // Provider
        ])
        .split(inner);

    let result = &shown.result;
    let mut lines: Vec<Line> = Vec::new();
    push_section(&mut lines, "Relationship", &result.relationship, palette);
    push_section(
        &mut lines,
        "Explanation",
        &format_display_text(&result.explanation),
        palette,
    );
    if let Some(mechanism) = &result.mechanism {
        push_section(
            &mut lines,
            "Mechanism",
            &format_display_text(mechanism),
            palette,
        );
    }
    if let Some(philosophy) = &result.philosophy {
        push_section(
            &mut lines,
            "Philosophical perspective",
            &format_display_text(philosophy),
            palette,
        );
    }
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }),
        rows[0],
    );

    let gauge_row = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(12), Constraint::Min(1)])
        .split(rows[1]);
    frame.render_widget(
        Paragraph::new(Span::styled("Confidence ", styles::label(palette))),
        gauge_row[0],
    );
    let confidence = result.confidence;
    let gauge = Gauge::default()
        .ratio(confidence.ratio())
        .label(format!("{}%", confidence.percent()))
        .gauge_style(Style::default().fg(palette.correct).bg(palette.highlight))
        .use_unicode(!app.ui_options().ascii_only);
    frame.render_widget(gauge, gauge_row[1]);

    let provider = Line::from(vec![
        Span::styled(format!("{} Analyzed by ", glyphs.bullet), styles::hint(palette)),
        Span::styled(
            shown.provider.display_name(),
            Style::default()
                .fg(palette.provider(shown.provider))
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(provider), rows[2]);
}

fn push_section(lines: &mut Vec<Line<'_>>, label: &'static str, text: &str, palette: &Palette) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(label, styles::label(palette))));
    let text = sanitize_terminal_text(text);
    for paragraph in text.lines() {
        lines.push(Line::from(Span::styled(
            paragraph.to_string(),
            Style::default().fg(palette.text),
        )));
    }
}

fn draw_empty_result(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Describe a material phenomenon and a form of consciousness, then press Enter",
            Style::default().fg(palette.text_dim),
        )),
        Line::from(Span::styled(
            "to analyze their dialectical relationship.",
            Style::default().fg(palette.text_dim),
        )),
        Line::from(""),
    ];
    let saved = app.history().len();
    if saved > 0 {
        lines.push(Line::from(vec![
            Span::styled(format!("{} ", glyphs.history), styles::hint(palette)),
            Span::styled(
                format!("{saved} saved {} ", plural(saved, "analysis", "analyses")),
                styles::hint(palette),
            ),
            Span::styled("Ctrl+L", styles::key(palette)),
            Span::styled(" to browse", styles::hint(palette)),
        ]));
    }
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(styles::border(palette))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(paragraph, area);
}

fn plural(count: usize, one: &'static str, many: &'static str) -> &'static str {
    if count == 1 { one } else { many }
}

/// Lines per history entry, including the blank separator.
const HISTORY_ENTRY_LINES: usize = 3;

pub(crate) fn draw_history_panel(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    let Some(panel) = app.history_panel() else {
        return;
    };
    let history = app.history();

    let area = frame.area();
    let width = area.width.saturating_sub(8).min(90);
    let height = area.height.saturating_sub(4);
    let popup = centered_rect(area, width, height);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.brand))
        .style(Style::default().bg(palette.surface))
        .padding(Padding::horizontal(1))
        .title(Span::styled(
            format!(" {} History ({}) ", glyphs.history, history.len()),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    if history.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(
                "No saved analyses yet.",
                styles::hint(palette),
            )),
            rows[0],
        );
    } else {
        let mut lines: Vec<Line> = Vec::with_capacity(history.len() * HISTORY_ENTRY_LINES);
        for (index, record) in history.newest_first().enumerate() {
            let selected = index == panel.selected;
            let row_style = if selected {
                Style::default().bg(palette.highlight)
            } else {
                Style::default()
            };
            let marker = if selected { glyphs.cursor } else { " " };
            let timestamp = record
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string();

            lines.push(
                Line::from(vec![
                    Span::styled(format!("{marker} "), Style::default().fg(palette.matter)),
                    Span::styled(
                        sanitize_terminal_text(&record.material).into_owned(),
                        Style::default()
                            .fg(palette.matter)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(" / ", styles::hint(palette)),
                    Span::styled(
                        sanitize_terminal_text(&record.consciousness).into_owned(),
                        Style::default()
                            .fg(palette.mind)
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {timestamp}"), styles::hint(palette)),
                ])
                .style(row_style),
            );
            lines.push(
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        first_line(&sanitize_terminal_text(&record.result.relationship)),
                        Style::default().fg(palette.text_dim),
                    ),
                ])
                .style(row_style),
            );
            lines.push(Line::from(""));
        }

        let visible = rows[0].height as usize;
        let selected_bottom = (panel.selected + 1) * HISTORY_ENTRY_LINES;
        let offset = selected_bottom.saturating_sub(visible);
        frame.render_widget(
            Paragraph::new(lines).scroll((offset as u16, 0)),
            rows[0],
        );
    }

    let hints = Line::from(vec![
        Span::styled("Enter", styles::key(palette)),
        Span::styled(" load  ", styles::hint(palette)),
        Span::styled("d", styles::key(palette)),
        Span::styled(" delete  ", styles::hint(palette)),
        Span::styled("c", styles::key(palette)),
        Span::styled(" clear all  ", styles::hint(palette)),
        Span::styled("Esc", styles::key(palette)),
        Span::styled(" close", styles::hint(palette)),
    ]);
    frame.render_widget(Paragraph::new(hints), rows[1]);
}

fn first_line(text: &str) -> String {
    text.lines().next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use mindmatter_engine::DraftInput;

    use super::horizontal_scroll;

    #[test]
    fn short_text_does_not_scroll() {
        let mut draft = DraftInput::default();
        draft.set_text("stone");
        assert_eq!(horizontal_scroll(&draft, 20), (5, 0));
    }

    #[test]
    fn cursor_stays_visible_in_long_text() {
        let mut draft = DraftInput::default();
        draft.set_text(&"x".repeat(30));
        let (width, offset) = horizontal_scroll(&draft, 10);
        assert_eq!(width, 30);
        assert_eq!(offset, 21);
        assert_eq!(width - offset, 9);
    }

    #[test]
    fn wide_graphemes_count_double() {
        let mut draft = DraftInput::default();
        draft.set_text("ý thức 意識");
        draft.move_cursor_end();
        let (width, _) = horizontal_scroll(&draft, 40);
        assert_eq!(width, 11);
    }
}
