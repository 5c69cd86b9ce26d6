use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use lico_engine::DraftInput;
use lico_types::sanitize_terminal_text;

/// Sanitize user text and shorten it to `max` display columns.
pub(crate) fn truncate_with_ellipsis(raw: &str, max: usize) -> String {
    let clean = sanitize_terminal_text(raw.trim());
    if clean.width() <= max {
        return clean.into_owned();
    }
    let budget = max.saturating_sub(3);
    let mut out = String::new();
    let mut used = 0;
    for grapheme in clean.graphemes(true) {
        let w = grapheme.width();
        if used + w > budget {
            break;
        }
        out.push_str(grapheme);
        used += w;
    }
    out.push_str("...");
    out
}

/// Visible slice of a single-line field and the cursor column within it.
///
/// Scrolls horizontally so the cursor stays inside `width` columns.
pub(crate) fn field_window(draft: &DraftInput, width: usize) -> (String, u16) {
    let text = draft.text();
    let cursor_col = text[..draft.byte_index()].width();
    let width = width.max(1);
    if cursor_col < width {
        return (text.to_string(), cursor_col as u16);
    }

    let scroll_target = cursor_col - width + 1;
    let mut skipped = 0;
    let mut byte_offset = text.len();
    for (idx, grapheme) in text.grapheme_indices(true) {
        if skipped >= scroll_target {
            byte_offset = idx;
            break;
        }
        skipped += grapheme.width();
    }
    (
        text[byte_offset..].to_string(),
        cursor_col.saturating_sub(skipped) as u16,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_with_ellipsis("  Pan ", 10), "Pan");
    }

    #[test]
    fn long_text_gets_ellipsis() {
        assert_eq!(truncate_with_ellipsis("Leche semidesnatada", 10), "Leche s...");
    }

    #[test]
    fn field_window_keeps_cursor_visible() {
        let draft = DraftInput::with_text("abcdefghij");
        let (visible, col) = field_window(&draft, 4);
        assert_eq!(visible, "hij");
        assert_eq!(col, 3);

        let (visible, col) = field_window(&DraftInput::with_text("abc"), 10);
        assert_eq!(visible, "abc");
        assert_eq!(col, 3);
    }
}
