use std::fmt;

/// Row identifiers are SQLite `INTEGER PRIMARY KEY` values, so every id wraps an `i64`.
macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a row in `shopping_lists`.
    ListId
);
row_id!(
    /// Identifier of a row in `shopping_items`.
    ItemId
);
row_id!(
    /// Identifier of a catalog product.
    ProductId
);
