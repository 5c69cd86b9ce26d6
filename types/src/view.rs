//! Derived view of a single list as shown on the detail screen.

use crate::{ShoppingItem, ShoppingList, SortOption};

/// Filtered, sorted and partitioned items of one list.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListView {
    pub pending: Vec<ShoppingItem>,
    pub purchased: Vec<ShoppingItem>,
    /// Nothing visible to show: no pending items, and the purchased section
    /// is either already expanded or empty.
    pub has_no_results: bool,
}

impl ListView {
    #[must_use]
    pub fn build(list: &ShoppingList, search: &str, show_purchased: bool) -> Self {
        let needle = search.to_lowercase();
        let mut items: Vec<ShoppingItem> = list
            .items
            .iter()
            .filter(|item| needle.is_empty() || item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();

        sort_items(&mut items, list.sort_option);

        let (purchased, pending): (Vec<_>, Vec<_>) =
            items.into_iter().partition(|item| item.is_purchased);
        let has_no_results = pending.is_empty() && (show_purchased || purchased.is_empty());

        Self {
            pending,
            purchased,
            has_no_results,
        }
    }

    /// Items in the order the detail screen lists them.
    pub fn visible(&self, show_purchased: bool) -> impl Iterator<Item = &ShoppingItem> {
        let purchased: &[ShoppingItem] = if show_purchased { &self.purchased } else { &[] };
        self.pending.iter().chain(purchased)
    }
}

/// Stable sort of `items` by `option`.
pub fn sort_items(items: &mut [ShoppingItem], option: SortOption) {
    match option {
        SortOption::Default => items.sort_by_key(|item| item.position),
        SortOption::Name => items.sort_by_cached_key(|item| item.name.to_lowercase()),
        SortOption::Quantity => items.sort_by(|a, b| b.quantity.total_cmp(&a.quantity)),
    }
}
