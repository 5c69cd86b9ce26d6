//! Terminal text sanitization for list, item, and catalog names.
//!
//! Names come from the user or from an external catalog file and are drawn
//! directly into terminal cells. Escape sequences in them could move the
//! cursor, retitle the window, or write to the clipboard, so everything is
//! passed through [`sanitize_terminal_text`] before rendering.

use std::borrow::Cow;

const ESC: char = '\x1b';
const BEL: char = '\x07';
/// Single-character C1 control introducer equivalent to `ESC [`.
const C1_CSI: char = '\u{9b}';

/// Sanitize a single-line name for safe terminal display.
///
/// Strips ANSI escape sequences (CSI, OSC, and two-byte forms), C0/C1
/// control characters, and DEL. Tabs and line breaks collapse to a single
/// space so a name always occupies one row.
///
/// ```
/// use lico_types::sanitize_terminal_text;
///
/// assert_eq!(sanitize_terminal_text("Pan"), "Pan");
/// assert_eq!(sanitize_terminal_text("Pan\x1b[2Jrallado"), "Panrallado");
/// assert_eq!(sanitize_terminal_text("Pan\nrallado"), "Pan rallado");
/// ```
#[must_use]
pub fn sanitize_terminal_text(input: &str) -> Cow<'_, str> {
    if !input.chars().any(needs_attention) {
        return Cow::Borrowed(input);
    }

    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESC => match chars.peek().copied() {
                Some('[') => {
                    chars.next();
                    skip_csi(&mut chars);
                }
                Some(']' | 'P' | '^' | '_') => {
                    chars.next();
                    skip_string(&mut chars);
                }
                // Charset designation and line attributes carry one more byte.
                Some('(' | ')' | '*' | '+' | '#') => {
                    chars.next();
                    chars.next();
                }
                Some(_) => {
                    chars.next();
                }
                None => {}
            },
            C1_CSI => skip_csi(&mut chars),
            '\n' | '\r' | '\t' => {
                if !out.ends_with(' ') {
                    out.push(' ');
                }
            }
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn needs_attention(c: char) -> bool {
    c.is_control()
}

/// CSI: parameter/intermediate bytes up to and including a final byte in `@..=~`.
fn skip_csi<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) {
    while let Some(&c) = chars.peek() {
        if ('\x40'..='\x7e').contains(&c) {
            chars.next();
            return;
        }
        if !(' '..='?').contains(&c) {
            return;
        }
        chars.next();
    }
}

/// OSC/DCS/PM/APC: everything up to BEL or the string terminator `ESC \`.
fn skip_string<I: Iterator<Item = char>>(chars: &mut std::iter::Peekable<I>) {
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
