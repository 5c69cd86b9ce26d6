//! Input modes and the single-line text field used by every form.

use unicode_segmentation::UnicodeSegmentation;

/// Which key map is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Screen navigation and single-key actions.
    #[default]
    Normal,
    /// A text field on the current screen has focus.
    Insert,
    /// A dialog or menu is open and owns the keyboard.
    Modal,
}

/// Single-line text with a cursor counted in grapheme clusters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DraftInput {
    text: String,
    cursor: usize,
}

impl DraftInput {
    /// A field pre-filled with `text`, cursor at the end.
    #[must_use]
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut draft = Self::default();
        draft.set_text(text.into());
        draft
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn move_cursor_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_cursor_right(&mut self) {
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(1));
    }

    pub fn move_cursor_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_cursor_end(&mut self) {
        self.cursor = self.grapheme_count();
    }

    /// Insert a character. Line breaks never enter a single-line field.
    pub fn enter_char(&mut self, c: char) {
        if c == '\n' || c == '\r' {
            return;
        }
        let index = self.byte_index();
        self.text.insert(index, c);
        self.move_cursor_right();
    }

    /// Insert pasted text, flattening line breaks to spaces.
    pub fn enter_text(&mut self, text: &str) {
        let flattened: String = text
            .chars()
            .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
            .collect();
        if flattened.is_empty() {
            return;
        }
        let index = self.byte_index();
        self.text.insert_str(index, &flattened);
        let inserted = flattened.graphemes(true).count();
        self.cursor = self.clamp_cursor(self.cursor.saturating_add(inserted));
    }

    pub fn delete_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let start = self.byte_index_at(self.cursor - 1);
        let end = self.byte_index_at(self.cursor);
        self.text.replace_range(start..end, "");
        self.move_cursor_left();
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor >= self.grapheme_count() {
            return;
        }
        let start = self.byte_index_at(self.cursor);
        let end = self.byte_index_at(self.cursor + 1);
        self.text.replace_range(start..end, "");
    }

    pub fn delete_word_backwards(&mut self) {
        while self.cursor > 0 && self.grapheme_is_whitespace(self.cursor - 1) {
            self.delete_char();
        }
        while self.cursor > 0 && !self.grapheme_is_whitespace(self.cursor - 1) {
            self.delete_char();
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.cursor = self.grapheme_count();
    }

    /// Rewrite the start of the text in place.
    ///
    /// The cursor keeps its distance from the end, so it stays after the
    /// same grapheme when `f` grows or shrinks the text before it.
    pub fn map_text(&mut self, f: impl FnOnce(&str) -> String) {
        let mapped = f(&self.text);
        if mapped != self.text {
            let from_end = self.grapheme_count().saturating_sub(self.cursor);
            self.text = mapped;
            self.cursor = self.grapheme_count().saturating_sub(from_end);
        }
    }

    #[must_use]
    pub fn grapheme_count(&self) -> usize {
        self.text.graphemes(true).count()
    }

    /// Byte offset of the cursor.
    #[must_use]
    pub fn byte_index(&self) -> usize {
        self.byte_index_at(self.cursor)
    }

    fn grapheme_is_whitespace(&self, index: usize) -> bool {
        self.text
            .graphemes(true)
            .nth(index)
            .is_some_and(|grapheme| grapheme.chars().all(char::is_whitespace))
    }

    fn byte_index_at(&self, grapheme_index: usize) -> usize {
        self.text
            .grapheme_indices(true)
            .nth(grapheme_index)
            .map_or(self.text.len(), |(i, _)| i)
    }

    fn clamp_cursor(&self, cursor: usize) -> usize {
        cursor.min(self.grapheme_count())
    }
}
