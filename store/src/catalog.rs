//! Read-only product catalog used for name suggestions.

use std::path::Path;

use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags, Row, params};

use lico_types::{Product, ProductId};

const CATALOG_SCHEMA: &str = r"
    CREATE TABLE IF NOT EXISTS products (
        id INTEGER PRIMARY KEY,
        name TEXT,
        category TEXT,
        supermarket TEXT
    );
";

pub struct Catalog {
    db: Connection,
}

impl Catalog {
    /// Open an existing catalog file. The connection can never write.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open catalog at {}", path.display()))?;

        let has_products: bool = db
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'products')",
                [],
                |row| row.get(0),
            )
            .context("Failed to inspect catalog schema")?;
        if !has_products {
            bail!("Catalog at {} has no products table", path.display());
        }

        tracing::debug!(path = %path.display(), "Opened product catalog");
        Ok(Self { db })
    }

    /// Build an in-memory catalog from CSV text with an
    /// `id,name,category,supermarket` header. Empty fields become NULL.
    pub fn from_seed(seed: &str) -> Result<Self> {
        let mut db =
            Connection::open_in_memory().context("Failed to open in-memory product catalog")?;
        db.execute_batch(CATALOG_SCHEMA)
            .context("Failed to create product catalog schema")?;

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(seed.as_bytes());

        let tx = db
            .transaction()
            .context("Failed to start catalog seed transaction")?;
        let mut count = 0usize;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO products (id, name, category, supermarket) VALUES (?1, ?2, ?3, ?4)",
                )
                .context("Failed to prepare catalog insert")?;
            for record in reader.records() {
                let record = record.context("Malformed catalog CSV")?;
                let line = record.position().map_or(0, csv::Position::line);
                let id: i64 = record
                    .get(0)
                    .unwrap_or_default()
                    .parse()
                    .with_context(|| format!("Invalid product id on catalog line {line}"))?;
                let column = |index| record.get(index).filter(|field: &&str| !field.is_empty());
                stmt.execute(params![id, column(1), column(2), column(3)])
                    .with_context(|| format!("Failed to insert catalog line {line}"))?;
                count += 1;
            }
        }
        tx.commit().context("Failed to commit catalog seed")?;

        tracing::debug!(products = count, "Seeded product catalog");
        Ok(Self { db })
    }

    /// Products whose name contains `query` (ASCII case-insensitive), in id order.
    ///
    /// `%`, `_` and `\` in `query` match literally.
    pub fn search_by_name(&self, query: &str, limit: usize) -> Result<Vec<Product>> {
        let mut stmt = self
            .db
            .prepare_cached(
                r"SELECT id, name, category, supermarket FROM products
                  WHERE name LIKE '%' || ?1 || '%' ESCAPE '\'
                  ORDER BY id ASC LIMIT ?2",
            )
            .context("Failed to prepare catalog search")?;
        let rows = stmt
            .query_map(params![escape_like(query), limit as i64], product_from_row)
            .context("Failed to search catalog")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read catalog row")
    }

    pub fn by_category(&self, category: &str, limit: usize) -> Result<Vec<Product>> {
        let mut stmt = self
            .db
            .prepare_cached(
                "SELECT id, name, category, supermarket FROM products
                 WHERE category = ?1 ORDER BY id ASC LIMIT ?2",
            )
            .context("Failed to prepare catalog category query")?;
        let rows = stmt
            .query_map(params![category, limit as i64], product_from_row)
            .context("Failed to query catalog category")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read catalog row")
    }

    pub fn len(&self) -> Result<usize> {
        let count: i64 = self
            .db
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))
            .context("Failed to count catalog products")?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn escape_like(query: &str) -> String {
    let mut out = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: ProductId::new(row.get(0)?),
        name: row.get(1)?,
        category: row.get(2)?,
        supermarket: row.get(3)?,
    })
}
