//! Color theme and glyphs for the mindmatter TUI.
//!
//! Kanagawa Wave by default; `high_contrast` swaps in plain ANSI colors.

use ratatui::style::{Color, Modifier, Style};

use mindmatter_types::{Provider, UiOptions};

/// Kanagawa Wave swatches, named as in the upstream theme.
mod kanagawa {
    use super::Color;

    pub const SUMI_INK_0: Color = Color::Rgb(22, 22, 29);
    pub const SUMI_INK_3: Color = Color::Rgb(31, 31, 40);
    pub const SUMI_INK_4: Color = Color::Rgb(42, 42, 55);
    pub const SUMI_INK_5: Color = Color::Rgb(54, 54, 70);
    pub const SUMI_INK_6: Color = Color::Rgb(84, 84, 109);

    pub const FUJI_WHITE: Color = Color::Rgb(220, 215, 186);
    pub const OLD_WHITE: Color = Color::Rgb(200, 192, 147);
    pub const FUJI_GRAY: Color = Color::Rgb(114, 113, 105);

    pub const ONI_VIOLET: Color = Color::Rgb(149, 127, 184);
    pub const SPRING_BLUE: Color = Color::Rgb(127, 180, 202);
    pub const SPRING_GREEN: Color = Color::Rgb(152, 187, 108);
    pub const CARP_YELLOW: Color = Color::Rgb(230, 195, 132);
    pub const SURIMI_ORANGE: Color = Color::Rgb(255, 160, 102);
    pub const PEACH_RED: Color = Color::Rgb(255, 93, 98);
}

const GOOGLE_BLUE: Color = Color::Rgb(66, 133, 244);

/// Colors by role. Matter is warm, consciousness is cool.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: Color,
    pub surface: Color,
    pub highlight: Color,
    pub popup: Color,
    pub frame: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_faint: Color,
    pub brand: Color,
    pub matter: Color,
    pub mind: Color,
    pub correct: Color,
    pub caution: Color,
    pub error: Color,
    gemini: Color,
    openai: Color,
}

impl Palette {
    #[must_use]
    pub fn standard() -> Self {
        use kanagawa::{
            CARP_YELLOW, FUJI_GRAY, FUJI_WHITE, OLD_WHITE, ONI_VIOLET, PEACH_RED, SPRING_BLUE,
            SPRING_GREEN, SUMI_INK_0, SUMI_INK_3, SUMI_INK_4, SUMI_INK_5, SUMI_INK_6,
            SURIMI_ORANGE,
        };
        Self {
            background: SUMI_INK_0,
            surface: SUMI_INK_3,
            highlight: SUMI_INK_4,
            popup: SUMI_INK_5,
            frame: SUMI_INK_6,
            text: FUJI_WHITE,
            text_dim: OLD_WHITE,
            text_faint: FUJI_GRAY,
            brand: ONI_VIOLET,
            matter: SURIMI_ORANGE,
            mind: SPRING_BLUE,
            correct: SPRING_GREEN,
            caution: CARP_YELLOW,
            error: PEACH_RED,
            gemini: GOOGLE_BLUE,
            openai: Color::White,
        }
    }

    /// Named ANSI colors only, so the terminal's own theme decides contrast.
    #[must_use]
    pub fn high_contrast() -> Self {
        Self {
            background: Color::Black,
            surface: Color::Black,
            highlight: Color::DarkGray,
            popup: Color::Black,
            frame: Color::Gray,
            text: Color::White,
            text_dim: Color::Gray,
            text_faint: Color::DarkGray,
            brand: Color::White,
            matter: Color::Yellow,
            mind: Color::Cyan,
            correct: Color::Green,
            caution: Color::Yellow,
            error: Color::Red,
            gemini: Color::Cyan,
            openai: Color::White,
        }
    }

    #[must_use]
    pub fn provider(&self, provider: Provider) -> Color {
        match provider {
            Provider::Gemini => self.gemini,
            Provider::OpenAI => self.openai,
        }
    }
}

#[must_use]
pub fn palette(options: UiOptions) -> Palette {
    if options.high_contrast {
        Palette::high_contrast()
    } else {
        Palette::standard()
    }
}

/// ASCII/Unicode glyphs for icons and spinners.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub material: &'static str,
    pub consciousness: &'static str,
    pub correct: &'static str,
    pub retry: &'static str,
    pub star: &'static str,
    pub bullet: &'static str,
    pub selected: &'static str,
    pub cursor: &'static str,
    pub history: &'static str,
    pub error: &'static str,
    pub spinner_frames: &'static [&'static str],
}

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const SPINNER_FRAMES_ASCII: &[&str] = &["|", "/", "-", "\\"];

#[must_use]
pub fn glyphs(options: UiOptions) -> Glyphs {
    if options.ascii_only {
        Glyphs {
            material: "[M]",
            consciousness: "[C]",
            correct: "OK",
            retry: "!",
            star: "*",
            bullet: "*",
            selected: "[x]",
            cursor: ">",
            history: "#",
            error: "X",
            spinner_frames: SPINNER_FRAMES_ASCII,
        }
    } else {
        Glyphs {
            material: "◆",
            consciousness: "◇",
            correct: "✓",
            retry: "✗",
            star: "★",
            bullet: "•",
            selected: "●",
            cursor: "▸",
            history: "≡",
            error: "⊘",
            spinner_frames: SPINNER_FRAMES,
        }
    }
}

/// When `reduced_motion` is enabled, returns a static glyph instead of cycling.
#[must_use]
pub fn spinner_frame(tick: usize, options: UiOptions) -> &'static str {
    let frames = glyphs(options).spinner_frames;
    if options.reduced_motion {
        frames[0]
    } else {
        frames[tick % frames.len()]
    }
}

/// Shared styles so both screens read the same.
pub mod styles {
    use super::{Modifier, Palette, Style};

    fn bold(style: Style) -> Style {
        style.add_modifier(Modifier::BOLD)
    }

    #[must_use]
    pub fn title(palette: &Palette) -> Style {
        bold(Style::default().fg(palette.brand))
    }

    #[must_use]
    pub fn tab_active(palette: &Palette) -> Style {
        bold(Style::default().fg(palette.background).bg(palette.brand))
    }

    #[must_use]
    pub fn tab_inactive(palette: &Palette) -> Style {
        Style::default().fg(palette.text_dim)
    }

    #[must_use]
    pub fn border(palette: &Palette) -> Style {
        Style::default().fg(palette.frame)
    }

    #[must_use]
    pub fn border_focused(palette: &Palette) -> Style {
        Style::default().fg(palette.mind)
    }

    /// Section headings inside panels ("Relationship", "Interaction", ...).
    #[must_use]
    pub fn label(palette: &Palette) -> Style {
        bold(Style::default().fg(palette.mind))
    }

    #[must_use]
    pub fn hint(palette: &Palette) -> Style {
        Style::default().fg(palette.text_faint)
    }

    /// A key name inside a hint, e.g. the `Enter` in "Enter to analyze".
    #[must_use]
    pub fn key(palette: &Palette) -> Style {
        bold(Style::default().fg(palette.matter))
    }
}

#[cfg(test)]
mod tests {
    use ratatui::style::Color;

    use mindmatter_types::{Provider, UiOptions};

    use super::{Palette, glyphs, palette, spinner_frame};

    fn reduced(ascii_only: bool) -> UiOptions {
        UiOptions {
            ascii_only,
            reduced_motion: true,
            ..UiOptions::default()
        }
    }

    #[test]
    fn spinner_advances_with_the_tick() {
        let options = UiOptions::default();
        assert_ne!(spinner_frame(0, options), spinner_frame(1, options));
        let frames = glyphs(options).spinner_frames.len();
        assert_eq!(spinner_frame(0, options), spinner_frame(frames, options));
    }

    #[test]
    fn reduced_motion_freezes_the_spinner() {
        for ascii_only in [false, true] {
            let options = reduced(ascii_only);
            let first = spinner_frame(0, options);
            assert!((1..40).all(|tick| spinner_frame(tick, options) == first));
        }
        assert_eq!(spinner_frame(7, reduced(true)), "|");
    }

    #[test]
    fn ascii_glyphs_are_ascii() {
        let g = glyphs(UiOptions {
            ascii_only: true,
            ..UiOptions::default()
        });
        for glyph in [
            g.material,
            g.consciousness,
            g.correct,
            g.retry,
            g.star,
            g.bullet,
            g.selected,
            g.cursor,
            g.history,
            g.error,
        ]
        .into_iter()
        .chain(g.spinner_frames.iter().copied())
        {
            assert!(glyph.is_ascii(), "{glyph:?} is not ascii");
        }
    }

    #[test]
    fn high_contrast_avoids_rgb() {
        let p = palette(UiOptions {
            high_contrast: true,
            ..UiOptions::default()
        });
        for color in [p.background, p.text, p.matter, p.mind, p.error] {
            assert!(!matches!(color, Color::Rgb(..)), "{color:?}");
        }
        assert_eq!(
            Palette::standard().provider(Provider::Gemini),
            Color::Rgb(66, 133, 244)
        );
        assert_ne!(p.matter, p.mind);
    }
}
