use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{ItemId, ListId, ShoppingItem, format_quantity};

/// Per-list display order preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOption {
    /// Insertion order (item position).
    #[default]
    Default,
    /// Alphabetical, case-insensitive.
    Name,
    /// Largest quantity first.
    Quantity,
}

impl SortOption {
    pub const ALL: [Self; 3] = [Self::Default, Self::Name, Self::Quantity];

    /// Value stored in the `sort_option` column.
    #[must_use]
    pub const fn as_stored(self) -> &'static str {
        match self {
            Self::Default => "DEFAULT",
            Self::Name => "NAME",
            Self::Quantity => "QUANTITY",
        }
    }

    /// Parse the stored column value. Anything unrecognised reads as `Default`.
    #[must_use]
    pub fn from_stored(raw: &str) -> Self {
        match raw.trim() {
            "NAME" => Self::Name,
            "QUANTITY" => Self::Quantity,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Default => "Por defecto",
            Self::Name => "Alfabéticamente",
            Self::Quantity => "Por cantidad",
        }
    }
}

/// Purchased/total counts shown on each list card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub purchased: usize,
    pub total: usize,
}

impl Progress {
    /// Fraction of purchased items in `[0, 1]`; an empty list reports `0`.
    #[must_use]
    pub fn ratio(self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.purchased as f64 / self.total as f64
        }
    }
}

/// A named collection of items, joined with its items in position order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingList {
    pub id: ListId,
    pub name: String,
    pub sort_option: SortOption,
    pub items: Vec<ShoppingItem>,
}

impl ShoppingList {
    #[must_use]
    pub fn progress(&self) -> Progress {
        Progress {
            purchased: self.items.iter().filter(|item| item.is_purchased).count(),
            total: self.items.len(),
        }
    }

    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&ShoppingItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Detached copy under a new name: ids cleared, every item back to pending.
    ///
    /// Positions and sort preference carry over so the copy reads the same way.
    #[must_use]
    pub fn copy_named(&self, name: impl Into<String>) -> Self {
        Self {
            id: ListId::new(0),
            name: name.into(),
            sort_option: self.sort_option,
            items: self
                .items
                .iter()
                .map(|item| ShoppingItem {
                    id: ItemId::new(0),
                    is_purchased: false,
                    ..item.clone()
                })
                .collect(),
        }
    }

    /// Plain-text rendition for sharing outside the app.
    #[must_use]
    pub fn share_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Lista: {}", self.name);
        for item in &self.items {
            let _ = writeln!(
                out,
                "- {} ({} {})",
                item.name,
                format_quantity(item.quantity),
                item.unit
            );
        }
        out
    }
}
