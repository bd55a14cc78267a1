//! Terminal text sanitization for model output and persisted history.
//!
//! Model text and anything read back from disk is untrusted: escape sequences
//! in it could move the cursor, rewrite the screen or set the clipboard.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';
const C1_CSI: char = '\u{009b}';

/// Strip escape sequences and control characters other than `\n` and `\t`.
///
/// Returns `Cow::Borrowed` when the input is already clean.
///
/// ```
/// use mindmatter_types::sanitize_terminal_text;
///
/// assert_eq!(sanitize_terminal_text("plain"), "plain");
/// assert_eq!(sanitize_terminal_text("a\x1b[2Jb"), "ab");
/// ```
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(is_disallowed) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => match chars.peek() {
                Some('[') => {
                    chars.next();
                    skip_csi(&mut chars);
                }
                Some(']' | 'P' | '^' | '_') => {
                    chars.next();
                    skip_string(&mut chars);
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            },
            C1_CSI => skip_csi(&mut chars),
            c if is_disallowed(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_disallowed(c: char) -> bool {
    match c {
        '\n' | '\t' => false,
        '\r' => true,
        c => c <= '\x1f' || c == '\x7f' || ('\u{0080}'..='\u{009f}').contains(&c),
    }
}

// CSI: parameter/intermediate bytes up to a final byte in 0x40..=0x7e.
fn skip_csi(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while let Some(&c) = chars.peek() {
        chars.next();
        if ('\x40'..='\x7e').contains(&c) || !('\x20'..='\x3f').contains(&c) {
            return;
        }
    }
}

// OSC/DCS/PM/APC: terminated by BEL or ESC \.
fn skip_string(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) {
    while let Some(c) = chars.next() {
        if c == BEL {
            return;
        }
        if c == ESC && chars.peek() == Some(&'\\') {
            chars.next();
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::sanitize_terminal_text;
    use std::borrow::Cow;

    #[test]
    fn clean_text_is_borrowed() {
        let input = "Vật chất quyết định ý thức.\n\tIndented";
        assert!(matches!(sanitize_terminal_text(input), Cow::Borrowed(_)));
    }

    #[test]
    fn strips_csi_and_osc() {
        assert_eq!(sanitize_terminal_text("red\x1b[31m text\x1b[0m"), "red text");
        assert_eq!(
            sanitize_terminal_text("link\x1b]8;;http://x\x07here"),
            "linkhere"
        );
        assert_eq!(
            sanitize_terminal_text("clip\x1b]52;c;SGVsbG8=\x1b\\board"),
            "clipboard"
        );
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(sanitize_terminal_text("a\rb\x07c\x7fd"), "abcd");
        assert_eq!(sanitize_terminal_text("x\u{009b}2Jy"), "xy");
    }
}
