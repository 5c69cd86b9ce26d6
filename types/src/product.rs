use serde::{Deserialize, Serialize};

use crate::ProductId;

/// Shown for catalog rows without a name.
pub const UNNAMED_PRODUCT: &str = "Producto";

/// A row of the read-only product catalog. Every column except the id is nullable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: Option<String>,
    pub category: Option<String>,
    pub supermarket: Option<String>,
}

impl Product {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNNAMED_PRODUCT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back() {
        let mut product = Product {
            id: ProductId::new(1),
            name: None,
            category: None,
            supermarket: None,
        };
        assert_eq!(product.display_name(), "Producto");
        product.name = Some("  ".to_string());
        assert_eq!(product.display_name(), "Producto");
        product.name = Some("Leche entera".to_string());
        assert_eq!(product.display_name(), "Leche entera");
    }
}
