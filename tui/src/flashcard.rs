//! Flashcard game screen.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Gauge, Padding, Paragraph, Wrap},
};

use mindmatter_engine::App;
use mindmatter_types::{
    FeedbackKind, FeedbackSection, GameStatus, feedback_sections, is_detailed_feedback,
};

use crate::theme::{Glyphs, Palette, styles};
use crate::{centered_rect, strip_leading_symbols};

const HEADER_HEIGHT: u16 = 4;

pub(crate) fn draw_flashcard(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(1)])
        .split(area);

    draw_header(frame, app, chunks[0], palette, glyphs);
    match app.game().status() {
        GameStatus::Waiting => draw_welcome(frame, chunks[1], palette, glyphs),
        GameStatus::Playing => draw_playing(frame, app, chunks[1], palette, glyphs),
        GameStatus::Finished => draw_finished(frame, app, chunks[1], palette, glyphs),
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let game = app.game();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border(palette))
        .title(Span::styled(" Matter & Consciousness ", styles::title(palette)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let stats = Line::from(vec![
        Span::styled(format!(" {} ", glyphs.star), Style::default().fg(palette.caution)),
        Span::styled("Score: ", styles::hint(palette)),
        Span::styled(
            game.score().to_string(),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   Matches: ", styles::hint(palette)),
        Span::styled(
            format!("{}/{}", game.matches(), game.total_cards()),
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    frame.render_widget(Paragraph::new(stats), rows[0]);

    let progress = game.progress().clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .ratio(progress)
        .label(format!("{:.0}%", progress * 100.0))
        .gauge_style(Style::default().fg(palette.brand).bg(palette.highlight))
        .use_unicode(!app.ui_options().ascii_only);
    frame.render_widget(gauge, rows[1]);
}

fn draw_welcome(frame: &mut Frame, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Welcome to the matter and consciousness game",
            styles::title(palette),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Each round draws a {} material phenomenon. Pick the {} form of",
                glyphs.material, glyphs.consciousness
            ),
            Style::default().fg(palette.text_dim),
        )),
        Line::from(Span::styled(
            "consciousness it gives rise to. Every correct pair scores points.",
            Style::default().fg(palette.text_dim),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", styles::hint(palette)),
            Span::styled("Enter", styles::key(palette)),
            Span::styled(" to draw the first card", styles::hint(palette)),
        ]),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn draw_playing(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    draw_material_card(frame, app, columns[0], palette, glyphs);
    draw_candidates(frame, app, columns[1], palette, glyphs);
}

fn draw_material_card(
    frame: &mut Frame,
    app: &App,
    area: Rect,
    palette: &Palette,
    glyphs: &Glyphs,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(palette.matter))
        .padding(Padding::horizontal(1))
        .title(Span::styled(
            format!(" {} Material ", glyphs.material),
            Style::default()
                .fg(palette.matter)
                .add_modifier(Modifier::BOLD),
        ));

    let mut lines = vec![Line::from("")];
    if let Some(card) = app.game().current_material_card() {
        lines.push(Line::from(Span::styled(
            card.content,
            Style::default()
                .fg(palette.text)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Which form of consciousness does this give rise to?",
        Style::default()
            .fg(palette.text_faint)
            .add_modifier(Modifier::ITALIC),
    )));
    lines.push(Line::from(""));

    let selected = app.game().selected_conscious_card();
    lines.push(Line::from(vec![
        Span::styled("Selected: ", styles::hint(palette)),
        match selected {
            Some(card) => Span::styled(card.content, Style::default().fg(palette.mind)),
            None => Span::styled("nothing yet", styles::hint(palette)),
        },
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("d", styles::key(palette)),
        Span::styled(" draw another card", styles::hint(palette)),
    ]));
    if selected.is_some() {
        lines.push(Line::from(vec![
            Span::styled("Enter", styles::key(palette)),
            Span::styled(" check the match", styles::hint(palette)),
        ]));
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn draw_candidates(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let game = app.game();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(styles::border_focused(palette))
        .title(Span::styled(
            format!(" {} Consciousness ({}) ", glyphs.consciousness, game.available_len()),
            styles::label(palette),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = app.flashcard().cursor();
    let selected = game.selected_conscious_card().map(|card| card.id);
    let lines: Vec<Line> = game
        .available_conscious_cards()
        .enumerate()
        .map(|(index, card)| {
            let is_cursor = index == cursor;
            let is_selected = selected == Some(card.id);
            let marker = if is_cursor { glyphs.cursor } else { " " };
            let check = if is_selected { glyphs.selected } else { " " };

            let mut style = Style::default().fg(palette.text_dim);
            if is_selected {
                style = style.fg(palette.mind).add_modifier(Modifier::BOLD);
            }
            if is_cursor {
                style = style.bg(palette.highlight);
            }
            Line::from(vec![
                Span::styled(format!(" {marker} "), Style::default().fg(palette.matter)),
                Span::styled(format!("{check} "), Style::default().fg(palette.mind)),
                Span::styled(card.content, style),
            ])
        })
        .collect();

    let visible = inner.height as usize;
    let offset = if visible == 0 {
        0
    } else {
        cursor.saturating_sub(visible - 1)
    };
    let paragraph = Paragraph::new(lines).scroll((offset as u16, 0));
    frame.render_widget(paragraph, inner);
}

fn draw_finished(frame: &mut Frame, app: &App, area: Rect, palette: &Palette, glyphs: &Glyphs) {
    let game = app.game();
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} Congratulations! {}", glyphs.star, glyphs.star),
            Style::default()
                .fg(palette.correct)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!("You matched all {} pairs.", game.total_cards()),
            Style::default().fg(palette.text_dim),
        )),
        Line::from(vec![
            Span::styled("Final score: ", styles::hint(palette)),
            Span::styled(
                game.score().to_string(),
                Style::default()
                    .fg(palette.text)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Press ", styles::hint(palette)),
            Span::styled("Enter", styles::key(palette)),
            Span::styled(" to play again", styles::hint(palette)),
        ]),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

pub(crate) fn draw_feedback_popup(frame: &mut Frame, app: &App, palette: &Palette, glyphs: &Glyphs) {
    let Some(feedback) = app.game().feedback() else {
        return;
    };
    let ascii_only = app.ui_options().ascii_only;

    let (accent, title) = match feedback.kind {
        FeedbackKind::Success => (palette.correct, format!(" {} Correct ", glyphs.correct)),
        FeedbackKind::Retry => (palette.caution, format!(" {} Try again ", glyphs.retry)),
    };

    let mut lines: Vec<Line<'static>> = Vec::new();
    if is_detailed_feedback(&feedback.message) {
        for section in feedback_sections(&feedback.message) {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            match section {
                FeedbackSection::Headline(text) => lines.push(Line::from(Span::styled(
                    strip_leading_symbols(text, ascii_only).to_string(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ))),
                FeedbackSection::Material(text) => {
                    push_labelled(&mut lines, "Material", text, palette.matter, palette);
                }
                FeedbackSection::Consciousness(text) => {
                    push_labelled(&mut lines, "Consciousness", text, palette.mind, palette);
                }
                FeedbackSection::Interaction(text) => {
                    push_labelled(&mut lines, "Interaction", text, palette.brand, palette);
                }
                FeedbackSection::Plain(text) => lines.push(Line::from(Span::styled(
                    text.to_string(),
                    Style::default().fg(palette.text),
                ))),
            }
        }
    } else {
        for (index, line) in feedback.message.lines().enumerate() {
            let text = if index == 0 {
                strip_leading_symbols(line, ascii_only)
            } else {
                line
            };
            let style = if index == 0 {
                Style::default().fg(accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.text)
            };
            lines.push(Line::from(Span::styled(text.to_string(), style)));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press any key to continue",
        styles::hint(palette),
    )));

    let area = frame.area();
    let width = area.width.saturating_sub(8).min(72);
    let text_width = width.saturating_sub(4).max(1) as usize;
    let wrapped: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(text_width))
        .sum();
    let height = (wrapped as u16).saturating_add(2);
    let popup = centered_rect(area, width, height);

    frame.render_widget(Clear, popup);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(accent))
                .padding(Padding::horizontal(1))
                .style(Style::default().bg(palette.popup))
                .title(Span::styled(
                    title,
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(paragraph, popup);
}

fn push_labelled(
    lines: &mut Vec<Line<'static>>,
    label: &'static str,
    text: &str,
    color: Color,
    palette: &Palette,
) {
    lines.push(Line::from(Span::styled(
        label,
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(palette.text),
    )));
}
