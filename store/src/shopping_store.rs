//! Shopping lists and their items.
//!
//! Items reference their list with `ON DELETE CASCADE`, so deleting a list
//! removes its items in the same statement. Every write is a single statement
//! or a single transaction.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, params};

use lico_types::{ItemId, ListId, ShoppingItem, ShoppingList, SortOption};

use crate::sqlite_util::{now_iso8601, open_secure_db};

/// A `shopping_lists` row without its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: ListId,
    pub name: String,
    pub sort_option: SortOption,
    pub created_at: String,
}

/// Values for an item insert; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub is_purchased: bool,
    pub position: u32,
}

impl From<&ShoppingItem> for NewItem {
    fn from(item: &ShoppingItem) -> Self {
        Self {
            name: item.name.clone(),
            quantity: item.quantity,
            unit: item.unit.clone(),
            is_purchased: item.is_purchased,
            position: item.position,
        }
    }
}

pub struct ShoppingStore {
    db: Connection,
}

const ITEM_COLUMNS: &str = "id, name, quantity, unit, is_purchased, position";

impl ShoppingStore {
    const SCHEMA: &'static str = r"
        CREATE TABLE IF NOT EXISTS shopping_lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            sort_option TEXT NOT NULL DEFAULT 'DEFAULT',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS shopping_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            quantity REAL NOT NULL,
            unit TEXT NOT NULL,
            is_purchased INTEGER NOT NULL DEFAULT 0,
            list_id INTEGER NOT NULL,
            position INTEGER NOT NULL,
            FOREIGN KEY (list_id) REFERENCES shopping_lists(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_items_list
        ON shopping_items(list_id);
    ";

    /// Open or create the store at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let db = open_secure_db(path)?;
        tracing::debug!(path = %path.display(), "Opened shopping store");
        Self::initialize(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory shopping store")?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self> {
        db.execute_batch(
            "PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL; PRAGMA foreign_keys=ON;",
        )
        .context("Failed to set shopping store pragmas")?;
        db.execute_batch(Self::SCHEMA)
            .context("Failed to create shopping store schema")?;
        ensure_lists_sort_option(&db)?;
        Ok(Self { db })
    }

    // ── Lists ───────────────────────────────────────────────────────────

    pub fn insert_list(&self, name: &str, sort_option: SortOption) -> Result<ListId> {
        self.db
            .execute(
                "INSERT INTO shopping_lists (name, sort_option, created_at) VALUES (?1, ?2, ?3)",
                params![name, sort_option.as_stored(), now_iso8601()],
            )
            .context("Failed to insert list")?;
        let id = ListId::new(self.db.last_insert_rowid());
        tracing::debug!(%id, "Inserted list");
        Ok(id)
    }

    /// Insert a list and all of its items atomically.
    pub fn insert_list_with_items(
        &mut self,
        name: &str,
        sort_option: SortOption,
        items: &[NewItem],
    ) -> Result<ListId> {
        let tx = self
            .db
            .transaction()
            .context("Failed to start list insert transaction")?;
        tx.execute(
            "INSERT INTO shopping_lists (name, sort_option, created_at) VALUES (?1, ?2, ?3)",
            params![name, sort_option.as_stored(), now_iso8601()],
        )
        .context("Failed to insert list")?;
        let list_id = ListId::new(tx.last_insert_rowid());
        for item in items {
            insert_item_row(&tx, list_id, item)?;
        }
        tx.commit()
            .context("Failed to commit list insert transaction")?;
        tracing::debug!(id = %list_id, items = items.len(), "Inserted list with items");
        Ok(list_id)
    }

    /// Rename in place. Returns `false` when no such list exists.
    pub fn rename_list(&self, id: ListId, name: &str) -> Result<bool> {
        let changed = self
            .db
            .execute(
                "UPDATE shopping_lists SET name = ?1 WHERE id = ?2",
                params![name, id.value()],
            )
            .context("Failed to rename list")?;
        Ok(changed > 0)
    }

    /// Delete a list; its items go with it.
    pub fn delete_list(&self, id: ListId) -> Result<bool> {
        let changed = self
            .db
            .execute("DELETE FROM shopping_lists WHERE id = ?1", params![id.value()])
            .context("Failed to delete list")?;
        Ok(changed > 0)
    }

    pub fn update_sort_option(&self, id: ListId, sort_option: SortOption) -> Result<bool> {
        let changed = self
            .db
            .execute(
                "UPDATE shopping_lists SET sort_option = ?1 WHERE id = ?2",
                params![sort_option.as_stored(), id.value()],
            )
            .context("Failed to update sort option")?;
        Ok(changed > 0)
    }

    pub fn list(&self, id: ListId) -> Result<Option<ListRow>> {
        self.db
            .query_row(
                "SELECT id, name, sort_option, created_at FROM shopping_lists WHERE id = ?1",
                params![id.value()],
                list_from_row,
            )
            .optional()
            .context("Failed to load list")
    }

    /// All lists in creation order.
    pub fn all_lists(&self) -> Result<Vec<ListRow>> {
        let mut stmt = self
            .db
            .prepare("SELECT id, name, sort_option, created_at FROM shopping_lists ORDER BY id ASC")
            .context("Failed to prepare all_lists query")?;
        let rows = stmt
            .query_map([], list_from_row)
            .context("Failed to query lists")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read list row")
    }

    // ── Items ───────────────────────────────────────────────────────────

    pub fn insert_item(&self, list_id: ListId, item: &NewItem) -> Result<ItemId> {
        let id = insert_item_row(&self.db, list_id, item)?;
        tracing::debug!(list = %list_id, %id, position = item.position, "Inserted item");
        Ok(id)
    }

    /// Overwrite every mutable column of an existing item.
    pub fn update_item(&self, item: &ShoppingItem) -> Result<bool> {
        let changed = self
            .db
            .execute(
                "UPDATE shopping_items
                 SET name = ?1, quantity = ?2, unit = ?3, is_purchased = ?4, position = ?5
                 WHERE id = ?6",
                params![
                    item.name,
                    item.quantity,
                    item.unit,
                    item.is_purchased,
                    item.position,
                    item.id.value()
                ],
            )
            .context("Failed to update item")?;
        Ok(changed > 0)
    }

    pub fn set_purchased(&self, id: ItemId, purchased: bool) -> Result<bool> {
        let changed = self
            .db
            .execute(
                "UPDATE shopping_items SET is_purchased = ?1 WHERE id = ?2",
                params![purchased, id.value()],
            )
            .context("Failed to update purchased flag")?;
        Ok(changed > 0)
    }

    pub fn set_position(&self, id: ItemId, position: u32) -> Result<bool> {
        let changed = self
            .db
            .execute(
                "UPDATE shopping_items SET position = ?1 WHERE id = ?2",
                params![position, id.value()],
            )
            .context("Failed to update item position")?;
        Ok(changed > 0)
    }

    pub fn delete_item(&self, id: ItemId) -> Result<bool> {
        let changed = self
            .db
            .execute("DELETE FROM shopping_items WHERE id = ?1", params![id.value()])
            .context("Failed to delete item")?;
        Ok(changed > 0)
    }

    /// Items of one list ordered by position (ties broken by id).
    pub fn items_for_list(&self, list_id: ListId) -> Result<Vec<ShoppingItem>> {
        let mut stmt = self
            .db
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM shopping_items
                 WHERE list_id = ?1 ORDER BY position ASC, id ASC"
            ))
            .context("Failed to prepare items_for_list query")?;
        let rows = stmt
            .query_map(params![list_id.value()], item_from_row)
            .context("Failed to query items")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read item row")
    }

    /// Every item with its owning list, ordered like [`Self::items_for_list`].
    pub fn all_items(&self) -> Result<Vec<(ListId, ShoppingItem)>> {
        let mut stmt = self
            .db
            .prepare(&format!(
                "SELECT {ITEM_COLUMNS}, list_id FROM shopping_items
                 ORDER BY list_id ASC, position ASC, id ASC"
            ))
            .context("Failed to prepare all_items query")?;
        let rows = stmt
            .query_map([], |row| {
                let item = item_from_row(row)?;
                let list_id: i64 = row.get(6)?;
                Ok((ListId::new(list_id), item))
            })
            .context("Failed to query items")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read item row")
    }

    /// Highest position in the list, or `None` when it has no items.
    pub fn max_position(&self, list_id: ListId) -> Result<Option<u32>> {
        self.db
            .query_row(
                "SELECT MAX(position) FROM shopping_items WHERE list_id = ?1",
                params![list_id.value()],
                |row| row.get::<_, Option<u32>>(0),
            )
            .context("Failed to query max item position")
    }

    /// Renumber the list's items to `0..n`, keeping their order.
    ///
    /// Only rows whose position actually changes are written. Returns the
    /// number of rows updated.
    pub fn normalize_positions(&mut self, list_id: ListId) -> Result<usize> {
        let tx = self
            .db
            .transaction()
            .context("Failed to start position normalisation")?;
        let updated = renumber_items(&tx, list_id)?;
        tx.commit().context("Failed to commit position normalisation")?;
        Ok(updated)
    }

    /// Delete an item and renumber the rest of its list in one transaction.
    ///
    /// Returns `false` (and writes nothing) when the item is not in `list_id`.
    pub fn delete_item_and_normalize(&mut self, list_id: ListId, item_id: ItemId) -> Result<bool> {
        let tx = self
            .db
            .transaction()
            .context("Failed to start item deletion")?;
        let deleted = tx
            .execute(
                "DELETE FROM shopping_items WHERE id = ?1 AND list_id = ?2",
                params![item_id.value(), list_id.value()],
            )
            .context("Failed to delete item")?;
        if deleted == 0 {
            return Ok(false);
        }
        renumber_items(&tx, list_id)?;
        tx.commit().context("Failed to commit item deletion")?;
        Ok(true)
    }

    /// Every list joined with its items, lists in creation order and items by position.
    pub fn lists_with_items(&self) -> Result<Vec<ShoppingList>> {
        let mut grouped: HashMap<ListId, Vec<ShoppingItem>> = HashMap::new();
        for (list_id, item) in self.all_items()? {
            grouped.entry(list_id).or_default().push(item);
        }
        Ok(self
            .all_lists()?
            .into_iter()
            .map(|row| ShoppingList {
                items: grouped.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                sort_option: row.sort_option,
            })
            .collect())
    }
}

fn insert_item_row(db: &Connection, list_id: ListId, item: &NewItem) -> Result<ItemId> {
    db.execute(
        "INSERT INTO shopping_items (name, quantity, unit, is_purchased, list_id, position)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            item.name,
            item.quantity,
            item.unit,
            item.is_purchased,
            list_id.value(),
            item.position
        ],
    )
    .with_context(|| format!("Failed to insert item into list {list_id}"))?;
    Ok(ItemId::new(db.last_insert_rowid()))
}

fn list_from_row(row: &Row<'_>) -> rusqlite::Result<ListRow> {
    let sort_option: String = row.get(2)?;
    Ok(ListRow {
        id: ListId::new(row.get(0)?),
        name: row.get(1)?,
        sort_option: SortOption::from_stored(&sort_option),
        created_at: row.get(3)?,
    })
}

/// Write `0..n` positions for `list_id` inside `tx`, touching only rows that move.
fn renumber_items(tx: &Transaction<'_>, list_id: ListId) -> Result<usize> {
    let stale: Vec<(ItemId, u32)> = {
        let mut stmt = tx
            .prepare_cached(
                "SELECT id, position FROM shopping_items
                 WHERE list_id = ?1 ORDER BY position ASC, id ASC",
            )
            .context("Failed to prepare position scan")?;
        let rows = stmt
            .query_map(params![list_id.value()], |row| {
                Ok((ItemId::new(row.get(0)?), row.get::<_, u32>(1)?))
            })
            .context("Failed to scan item positions")?;
        rows.collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read item position")?
            .into_iter()
            .zip(0u32..)
            .filter(|((_, position), index)| position != index)
            .map(|((id, _), index)| (id, index))
            .collect()
    };
    if stale.is_empty() {
        return Ok(0);
    }

    let mut stmt = tx
        .prepare_cached("UPDATE shopping_items SET position = ?1 WHERE id = ?2")
        .context("Failed to prepare position update")?;
    for (id, position) in &stale {
        stmt.execute(params![position, id.value()])
            .context("Failed to renumber item")?;
    }
    tracing::debug!(list = %list_id, updated = stale.len(), "Normalised item positions");
    Ok(stale.len())
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<ShoppingItem> {
    Ok(ShoppingItem {
        id: ItemId::new(row.get(0)?),
        name: row.get(1)?,
        quantity: row.get(2)?,
        unit: row.get(3)?,
        is_purchased: row.get(4)?,
        position: row.get(5)?,
    })
}

/// Migration: databases created before per-list sorting lack `sort_option`.
fn ensure_lists_sort_option(db: &Connection) -> Result<()> {
    if lists_have_sort_option(db)? {
        return Ok(());
    }
    db.execute(
        "ALTER TABLE shopping_lists ADD COLUMN sort_option TEXT NOT NULL DEFAULT 'DEFAULT'",
        [],
    )
    .context("Failed to add sort_option column to shopping_lists")?;
    tracing::info!("Migrated shopping_lists: added sort_option column");
    Ok(())
}

fn lists_have_sort_option(db: &Connection) -> Result<bool> {
    let mut stmt = db
        .prepare("PRAGMA table_info(shopping_lists)")
        .context("Failed to inspect shopping_lists schema")?;
    let rows = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .context("Failed to query shopping_lists columns")?;
    for name in rows {
        if name? == "sort_option" {
            return Ok(true);
        }
    }
    Ok(false)
}
