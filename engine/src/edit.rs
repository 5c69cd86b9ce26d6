//! Proof-token access to the focused text field.
//!
//! Text can only be edited through [`TextEdit`], which can only be built from
//! an [`EditToken`], which [`App::edit_token`] only hands out while some text
//! field (screen field in Insert mode, or a form dialog) has focus.

use crate::App;
use crate::input::DraftInput;

/// Proof that a text field currently has focus.
#[derive(Debug)]
pub struct EditToken(());

/// Mode wrapper for editing the focused text field.
pub struct TextEdit<'a> {
    app: &'a mut App,
}

impl App {
    /// Get a proof token if a text field has focus.
    #[must_use]
    pub fn edit_token(&self) -> Option<EditToken> {
        self.has_active_draft().then_some(EditToken(()))
    }

    /// Get the text editor (requires proof token).
    pub fn text_edit(&mut self, _token: EditToken) -> TextEdit<'_> {
        TextEdit { app: self }
    }
}

impl TextEdit<'_> {
    fn apply(&mut self, f: impl FnOnce(&mut DraftInput)) {
        let Some(draft) = self.app.active_draft_mut() else {
            return;
        };
        let before = draft.text().to_string();
        f(draft);
        let changed = draft.text() != before;
        if changed {
            self.app.after_text_edit();
        }
    }

    pub fn enter_char(&mut self, c: char) {
        self.apply(|draft| draft.enter_char(c));
    }

    pub fn enter_text(&mut self, text: &str) {
        self.apply(|draft| draft.enter_text(text));
    }

    pub fn delete_char(&mut self) {
        self.apply(DraftInput::delete_char);
    }

    pub fn delete_char_forward(&mut self) {
        self.apply(DraftInput::delete_char_forward);
    }

    pub fn delete_word_backwards(&mut self) {
        self.apply(DraftInput::delete_word_backwards);
    }

    pub fn move_cursor_left(&mut self) {
        self.apply(DraftInput::move_cursor_left);
    }

    pub fn move_cursor_right(&mut self) {
        self.apply(DraftInput::move_cursor_right);
    }

    pub fn move_cursor_home(&mut self) {
        self.apply(DraftInput::move_cursor_home);
    }

    pub fn move_cursor_end(&mut self) {
        self.apply(DraftInput::move_cursor_end);
    }

    pub fn clear_line(&mut self) {
        self.apply(DraftInput::clear);
    }
}
