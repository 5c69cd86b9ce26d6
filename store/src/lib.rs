//! SQLite persistence for Lico.
//!
//! Two databases live behind this crate:
//! - [`ShoppingStore`]: the user's lists and items, read-write, foreign keys on.
//! - [`Catalog`]: a read-only product table used only for name suggestions.

mod catalog;
mod shopping_store;
mod sqlite_util;

pub use catalog::Catalog;
pub use shopping_store::{ListRow, NewItem, ShoppingStore};
