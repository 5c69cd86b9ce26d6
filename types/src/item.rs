//! Shopping items and the validated draft used to create or edit them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ItemId, NonEmptyString};

/// Unit used when the user leaves the unit field blank.
pub const DEFAULT_UNIT: &str = "uds";
/// Quantity used when the quantity field does not hold a usable number.
pub const DEFAULT_QUANTITY: f64 = 1.0;

/// A purchasable entry belonging to one list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub is_purchased: bool,
    /// Insertion order inside the owning list. Dense `0..n` after deletions.
    pub position: u32,
}

impl ShoppingItem {
    /// Quantity and unit as displayed next to the item name, e.g. `"2 uds"`.
    #[must_use]
    pub fn amount_label(&self) -> String {
        format!("{} {}", format_quantity(self.quantity), self.unit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItemDraftError {
    #[error("product name must not be empty")]
    EmptyName,
}

/// User input for a new or edited item, already normalized.
///
/// Invariant: `name` is non-blank, `quantity` is finite and positive, `unit` is non-blank.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemDraft {
    name: NonEmptyString,
    quantity: f64,
    unit: String,
}

impl ItemDraft {
    /// Build a draft from already-typed values.
    ///
    /// Quantities that are not finite and positive fall back to [`DEFAULT_QUANTITY`];
    /// a blank unit falls back to `default_unit`.
    pub fn new(
        name: impl Into<String>,
        quantity: f64,
        unit: impl AsRef<str>,
        default_unit: &str,
    ) -> Result<Self, ItemDraftError> {
        let name = NonEmptyString::new(name).map_err(|_| ItemDraftError::EmptyName)?;
        let quantity = if quantity.is_finite() && quantity > 0.0 {
            quantity
        } else {
            DEFAULT_QUANTITY
        };
        let unit = unit.as_ref().trim();
        let unit = if unit.is_empty() { default_unit } else { unit };
        Ok(Self {
            name,
            quantity,
            unit: unit.to_string(),
        })
    }

    /// Build a draft from raw form fields. Unparseable quantities become `1`.
    ///
    /// Accepts a decimal comma (`"1,5"`) as well as a decimal point.
    pub fn parse(
        name: &str,
        quantity: &str,
        unit: &str,
        default_unit: &str,
    ) -> Result<Self, ItemDraftError> {
        let quantity = quantity
            .trim()
            .replace(',', ".")
            .parse::<f64>()
            .unwrap_or(DEFAULT_QUANTITY);
        Self::new(name, quantity, unit, default_unit)
    }

    /// A single unit of a named product, as added from the suggestion screen.
    pub fn single(name: impl Into<String>, default_unit: &str) -> Result<Self, ItemDraftError> {
        Self::new(name, DEFAULT_QUANTITY, default_unit, default_unit)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    #[must_use]
    pub fn quantity(&self) -> f64 {
        self.quantity
    }

    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }
}

/// Format a quantity for display: integral values drop the fraction.
#[must_use]
pub fn format_quantity(quantity: f64) -> String {
    if quantity.fract() == 0.0 && quantity.abs() < 1e15 {
        format!("{quantity:.0}")
    } else {
        format!("{quantity}")
    }
}
