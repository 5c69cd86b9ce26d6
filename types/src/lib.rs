//! Core domain types for Lico.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application: the store maps rows
//! into these types, the engine mutates them, and the TUI renders them.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod ids;
mod item;
mod list;
mod product;
mod sanitize;
mod view;

pub use ids::{ItemId, ListId, ProductId};
pub use item::{DEFAULT_QUANTITY, DEFAULT_UNIT, ItemDraft, ItemDraftError, ShoppingItem, format_quantity};
pub use list::{Progress, ShoppingList, SortOption};
pub use product::{Product, UNNAMED_PRODUCT};
pub use sanitize::sanitize_terminal_text;
pub use view::{ListView, sort_items};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A string guaranteed to be non-empty (after trimming).
///
/// The stored value is the trimmed input, so `"  Pan "` becomes `"Pan"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(EmptyStringError)
        } else if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Title-case the first character of `value`, leaving the rest untouched.
///
/// Mirrors what the new-list field does as the user types: `"compra"` reads
/// `"Compra"` before it is ever submitted.
#[must_use]
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first.is_lowercase() => {
            let mut out = titlecase(first);
            out.extend(chars);
            out
        }
        _ => value.to_string(),
    }
}

/// Unicode titlecase of a single character.
///
/// Differs from `to_uppercase` for the Latin digraphs (`ǆ` -> `ǅ`) and for
/// characters whose upper case expands (`ß` -> `Ss`, `ﬁ` -> `Fi`).
fn titlecase(c: char) -> String {
    let digraph = match c {
        '\u{01C4}'..='\u{01C6}' => Some('\u{01C5}'),
        '\u{01C7}'..='\u{01C9}' => Some('\u{01C8}'),
        '\u{01CA}'..='\u{01CC}' => Some('\u{01CB}'),
        '\u{01F1}'..='\u{01F3}' => Some('\u{01F2}'),
        _ => None,
    };
    if let Some(title) = digraph {
        return title.to_string();
    }

    let mut upper = c.to_uppercase();
    let mut out = String::new();
    if let Some(head) = upper.next() {
        out.push(head);
    }
    out.extend(upper.flat_map(char::to_lowercase));
    out
}

/// Validated list name: non-blank, first character capitalised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ListName(NonEmptyString);

impl ListName {
    pub fn new(value: impl AsRef<str>) -> Result<Self, EmptyStringError> {
        NonEmptyString::new(capitalize_first(value.as_ref().trim())).map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0.into_inner()
    }
}

impl TryFrom<String> for ListName {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ListName> for String {
    fn from(value: ListName) -> Self {
        value.into_inner()
    }
}

impl std::fmt::Display for ListName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presentation options resolved from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
}
