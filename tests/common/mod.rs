//! Shared test utilities and fixtures
//!
//! Builds an [`App`] over an in-memory store and a small seeded catalog, drives it
//! with key events the way the terminal would, and renders it into a vt100 screen.

#![allow(dead_code)]

use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;

use lico_config::ResolvedConfig;
use lico_engine::{App, ShoppingService};
use lico_store::{Catalog, ShoppingStore};
use lico_types::UiOptions;

use crate::vt100_backend::VT100Backend;

pub const SEED: &str = "\
id,name,category,supermarket
1,Leche entera,Lácteos,Mercadona
2,Leche desnatada,Lácteos,Mercadona
3,Pan de molde,Panadería,Mercadona
4,Queso curado,Lácteos,Mercadona
5,,Varios,Mercadona
";

/// App with ASCII glyphs, no debounce and an empty store.
pub fn test_app() -> App {
    let store = ShoppingStore::open_in_memory().expect("in-memory store");
    let service = ShoppingService::new(store).expect("service");
    let catalog = Catalog::from_seed(SEED).expect("seed catalog");
    let mut config = ResolvedConfig::defaults(Path::new("/tmp/lico-tests"));
    config.ui = UiOptions {
        ascii_only: true,
        high_contrast: false,
    };
    config.suggestions.debounce = Duration::ZERO;
    App::new(service, catalog, &config)
}

pub fn press(app: &mut App, code: KeyCode) {
    lico_tui::handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
}

pub fn press_ctrl(app: &mut App, c: char) {
    lico_tui::handle_key(app, KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
}

/// Type `text` one key at a time.
pub fn type_str(app: &mut App, text: &str) {
    for c in text.chars() {
        press(app, KeyCode::Char(c));
    }
}

/// Create a list from the overview and return to it.
pub fn create_list(app: &mut App, name: &str) {
    press(app, KeyCode::Char('n'));
    type_str(app, name);
    press(app, KeyCode::Enter);
}

/// Add an item through the manual dialog on the detail screen.
pub fn add_item(app: &mut App, name: &str, quantity: &str) {
    press(app, KeyCode::Char('n'));
    type_str(app, name);
    press(app, KeyCode::Tab);
    press_ctrl(app, 'u');
    type_str(app, quantity);
    press(app, KeyCode::Enter);
}

/// A drawn frame, read back as text.
pub struct Rendered {
    /// Every screen row, trimmed. Always `height` entries.
    pub rows: Vec<String>,
    /// Terminal cursor as `(column, row)`.
    pub cursor: (u16, u16),
}

impl Rendered {
    pub fn text(&self) -> String {
        self.rows.join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.rows.iter().any(|row| row.contains(needle))
    }

    pub fn header(&self) -> &str {
        &self.rows[1]
    }

    pub fn hints(&self) -> &str {
        &self.rows[self.rows.len() - 3]
    }

    pub fn status(&self) -> &str {
        &self.rows[self.rows.len() - 2]
    }

    /// Non-blank rows between the header and the key hints.
    pub fn body(&self) -> String {
        self.rows[2..self.rows.len() - 3]
            .iter()
            .filter(|row| !row.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run due lookups, then draw one frame.
pub fn render(app: &mut App, width: u16, height: u16) -> Rendered {
    app.tick(Instant::now());
    let mut terminal = Terminal::new(VT100Backend::new(width, height)).expect("terminal");
    terminal
        .draw(|frame| lico_tui::draw(frame, app))
        .expect("draw");
    let backend = terminal.backend();
    let mut rows = backend.rows();
    rows.resize(height as usize, String::new());
    Rendered {
        rows,
        cursor: backend.cursor(),
    }
}
