//! Catalog store backed by SQLite
//!
//! Owns the `translations` and `translation_values` tables. Batch saves run
//! in a single transaction: either every item is applied or none is.
//!
//! # Example
//!
//! ```ignore
//! use sitelang::{CatalogStore, SiteItem, TranslationQuery};
//!
//! let mut store = CatalogStore::open_in_memory()?;
//! store.save_batch(&[SiteItem::new("nav.home").with_value(1, "Home")])?;
//!
//! let page = store.list(&TranslationQuery::new().search("home"))?;
//! assert_eq!(page[0].values[&1], "Home");
//! ```

use crate::error::{CatalogError, CatalogResult};
use crate::item::{SiteItem, Translation, TranslationId};
use crate::site::SiteId;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::Value;
use rusqlite::{Connection, ErrorCode, OptionalExtension, Transaction, params, params_from_iter};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

const SCHEMA: &str = "
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS translations (
    id INTEGER PRIMARY KEY,
    key TEXT NOT NULL UNIQUE,
    group_name TEXT,
    description TEXT,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS translation_values (
    id INTEGER PRIMARY KEY,
    translation_id INTEGER NOT NULL REFERENCES translations(id) ON DELETE CASCADE,
    site_id INTEGER NOT NULL,
    value TEXT NOT NULL,
    date_created TEXT NOT NULL,
    date_updated TEXT NOT NULL,
    UNIQUE (translation_id, site_id)
);

CREATE INDEX IF NOT EXISTS translations_group_idx ON translations (group_name);
";

/// Search, group filter and paging for [`CatalogStore::list`] and [`CatalogStore::count`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationQuery {
    /// Substring matched against key or description, case-insensitive
    pub search: Option<String>,
    /// Exact group match; empty means no filter
    pub group: Option<String>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl TranslationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    pub fn paginate(mut self, limit: usize, offset: usize) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// WHERE clause and its positional parameters
    fn filter_clause(&self) -> (String, Vec<Value>) {
        let mut clauses = Vec::new();
        let mut values = Vec::new();

        if let Some(group) = self.group.as_deref().filter(|g| !g.is_empty()) {
            clauses.push("group_name = ?");
            values.push(Value::Text(group.to_string()));
        }

        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(
                "(ulower(key) LIKE ? ESCAPE '\\' OR ulower(description) LIKE ? ESCAPE '\\')",
            );
            let pattern = like_pattern(&search.to_lowercase());
            values.push(Value::Text(pattern.clone()));
            values.push(Value::Text(pattern));
        }

        if clauses.is_empty() {
            (String::new(), values)
        } else {
            (format!(" WHERE {}", clauses.join(" AND ")), values)
        }
    }
}

fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Trim optional metadata; blank becomes NULL
fn normalize_meta(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[derive(Debug)]
struct StoredKey {
    id: TranslationId,
    group: Option<String>,
    description: Option<String>,
}

#[derive(Debug)]
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Open (and if needed create) the catalog database at `path`
    pub fn open(path: &Path) -> CatalogResult<Self> {
        debug!("Opening catalog database at {}", path.display());
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> CatalogResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> CatalogResult<Self> {
        conn.execute_batch(SCHEMA)?;
        register_functions(&conn)?;
        Ok(CatalogStore { conn })
    }

    // ========== Queries ==========

    /// Translations with their values, ordered by key
    pub fn list(&self, query: &TranslationQuery) -> CatalogResult<Vec<Translation>> {
        let (filter, mut values) = query.filter_clause();
        let limit = query
            .limit
            .map(|l| i64::try_from(l).unwrap_or(i64::MAX))
            .unwrap_or(-1);
        values.push(Value::Integer(limit));
        values.push(Value::Integer(
            i64::try_from(query.offset).unwrap_or(i64::MAX),
        ));

        let sql = format!(
            "SELECT t.id, t.key, t.group_name, t.description, v.site_id, v.value
             FROM (SELECT id, key, group_name, description FROM translations{}
                   ORDER BY key ASC LIMIT ? OFFSET ?) t
             LEFT JOIN translation_values v ON v.translation_id = t.id
             ORDER BY t.key ASC, v.site_id ASC",
            filter
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(values))?;

        let mut translations: Vec<Translation> = Vec::new();
        while let Some(row) = rows.next()? {
            let id: TranslationId = row.get(0)?;
            let site_id: Option<SiteId> = row.get(4)?;
            let value: Option<String> = row.get(5)?;

            if translations.last().map(|t| t.id) != Some(id) {
                translations.push(Translation {
                    id,
                    key: row.get(1)?,
                    group: row.get(2)?,
                    description: row.get(3)?,
                    values: BTreeMap::new(),
                });
            }

            if let (Some(site_id), Some(value), Some(current)) =
                (site_id, value, translations.last_mut())
            {
                current.values.insert(site_id, value);
            }
        }

        Ok(translations)
    }

    /// Number of translations matching the query's filters; paging is ignored
    pub fn count(&self, query: &TranslationQuery) -> CatalogResult<usize> {
        let (filter, values) = query.filter_clause();
        let sql = format!("SELECT COUNT(*) FROM translations{}", filter);
        let count: i64 = self
            .conn
            .query_row(&sql, params_from_iter(values), |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Distinct non-empty groups in use, sorted ascending
    pub fn groups(&self) -> CatalogResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT group_name FROM translations
             WHERE group_name IS NOT NULL AND group_name <> ''
             ORDER BY group_name ASC",
        )?;
        let groups = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(groups)
    }

    pub fn find_by_key(&self, key: &str) -> CatalogResult<Option<Translation>> {
        let id = find_key_in(&self.conn, key.trim())?.map(|stored| stored.id);
        match id {
            Some(id) => self.find_by_id(id),
            None => Ok(None),
        }
    }

    pub fn find_by_id(&self, id: TranslationId) -> CatalogResult<Option<Translation>> {
        let translation = self
            .conn
            .query_row(
                "SELECT id, key, group_name, description FROM translations WHERE id = ?1",
                params![id],
                |row| {
                    Ok(Translation {
                        id: row.get(0)?,
                        key: row.get(1)?,
                        group: row.get(2)?,
                        description: row.get(3)?,
                        values: BTreeMap::new(),
                    })
                },
            )
            .optional()?;

        let Some(mut translation) = translation else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare_cached(
            "SELECT site_id, value FROM translation_values
             WHERE translation_id = ?1 ORDER BY site_id ASC",
        )?;
        for row in stmt.query_map(params![id], |row| {
            Ok((row.get::<_, SiteId>(0)?, row.get::<_, String>(1)?))
        })? {
            let (site_id, value) = row?;
            translation.values.insert(site_id, value);
        }

        Ok(Some(translation))
    }

    /// The stored value of `key` at `site_id`, if any
    pub fn value(&self, key: &str, site_id: SiteId) -> CatalogResult<Option<String>> {
        let value = self
            .conn
            .prepare_cached(
                "SELECT v.value FROM translations t
                 INNER JOIN translation_values v ON v.translation_id = t.id
                 WHERE t.key = ?1 AND v.site_id = ?2",
            )?
            .query_row(params![key, site_id], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Every key mapped to its value at `site_id`; keys without a value map to ""
    pub fn values_for_site(&self, site_id: SiteId) -> CatalogResult<BTreeMap<String, String>> {
        let mut stmt = self.conn.prepare(
            "SELECT t.key, v.value FROM translations t
             LEFT JOIN translation_values v
                ON v.translation_id = t.id AND v.site_id = ?1
             ORDER BY t.key ASC",
        )?;
        let mut map = BTreeMap::new();
        for row in stmt.query_map(params![site_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })? {
            let (key, value) = row?;
            map.insert(key, value.unwrap_or_default());
        }
        Ok(map)
    }

    // ========== Mutations ==========

    /// Apply every item atomically
    ///
    /// Any failing item rolls back the whole batch. Items without an id that
    /// name an existing key update that key instead of creating a duplicate.
    pub fn save_batch(&mut self, items: &[SiteItem]) -> CatalogResult<()> {
        for item in items {
            let deletes_by_id = item.delete && item.id.is_some();
            if !deletes_by_id && item.key.trim().is_empty() {
                return Err(CatalogError::Validation(
                    "Translation key cannot be empty".to_string(),
                ));
            }
        }

        let tx = self.conn.transaction()?;
        for item in items {
            apply_item(&tx, item)?;
        }
        tx.commit()?;

        info!("Saved batch of {} translation items", items.len());
        Ok(())
    }

    /// Create `key` with no group or description unless it already exists
    ///
    /// Returns whether a new translation was created. A concurrent creation of
    /// the same key is not an error.
    pub fn ensure_key_exists(&self, key: &str) -> CatalogResult<bool> {
        let key = key.trim();
        if key.is_empty() {
            return Ok(false);
        }
        if find_key_in(&self.conn, key)?.is_some() {
            return Ok(false);
        }
        insert_key_tolerating_race(&self.conn, key)
    }

    /// Delete a translation and its values; returns false when it did not exist
    pub fn delete_by_id(&self, id: TranslationId) -> CatalogResult<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM translations WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

/// `ulower(text)`: full Unicode lowercase; SQLite `lower` and `LIKE` fold ASCII only
fn register_functions(conn: &Connection) -> CatalogResult<()> {
    conn.create_scalar_function(
        "ulower",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: Option<String> = ctx.get(0)?;
            Ok(text.map(|t| t.to_lowercase()))
        },
    )?;
    Ok(())
}

fn find_key_in(conn: &Connection, key: &str) -> CatalogResult<Option<StoredKey>> {
    let stored = conn
        .prepare_cached("SELECT id, group_name, description FROM translations WHERE key = ?1")?
        .query_row(params![key], |row| {
            Ok(StoredKey {
                id: row.get(0)?,
                group: row.get(1)?,
                description: row.get(2)?,
            })
        })
        .optional()?;
    Ok(stored)
}

fn find_id_in(conn: &Connection, id: TranslationId) -> CatalogResult<Option<StoredKey>> {
    let stored = conn
        .prepare_cached("SELECT id, group_name, description FROM translations WHERE id = ?1")?
        .query_row(params![id], |row| {
            Ok(StoredKey {
                id: row.get(0)?,
                group: row.get(1)?,
                description: row.get(2)?,
            })
        })
        .optional()?;
    Ok(stored)
}

fn insert_key_tolerating_race(conn: &Connection, key: &str) -> CatalogResult<bool> {
    let result = conn.execute(
        "INSERT INTO translations (key, group_name, description, date_created, date_updated)
         VALUES (?1, NULL, NULL, datetime('now'), datetime('now'))",
        params![key],
    );
    match result {
        Ok(_) => {
            debug!("Created missing translation key '{}'", key);
            Ok(true)
        }
        Err(rusqlite::Error::SqliteFailure(err, _)) if err.code == ErrorCode::ConstraintViolation => {
            warn!("Translation key '{}' was created concurrently", key);
            Ok(false)
        }
        Err(err) => Err(err.into()),
    }
}

/// Apply one item inside the batch transaction
fn apply_item(tx: &Transaction<'_>, item: &SiteItem) -> CatalogResult<()> {
    if item.delete {
        if let Some(id) = item.id {
            tx.execute("DELETE FROM translations WHERE id = ?1", params![id])?;
            return Ok(());
        }
    }

    let key = item.key.trim();
    let by_id = match item.id {
        Some(id) => find_id_in(tx, id)?,
        None => None,
    };
    let existing = match by_id {
        Some(stored) => Some(stored),
        None => find_key_in(tx, key)?,
    };

    let translation_id = match existing {
        Some(stored) => {
            let group = if item.group.is_some() || !item.preserve_meta {
                normalize_meta(item.group.as_deref())
            } else {
                stored.group
            };
            let description = if item.description.is_some() || !item.preserve_meta {
                normalize_meta(item.description.as_deref())
            } else {
                stored.description
            };
            tx.execute(
                "UPDATE translations
                 SET key = ?1, group_name = ?2, description = ?3, date_updated = datetime('now')
                 WHERE id = ?4",
                params![key, group, description, stored.id],
            )?;
            stored.id
        }
        None => {
            tx.execute(
                "INSERT INTO translations (key, group_name, description, date_created, date_updated)
                 VALUES (?1, ?2, ?3, datetime('now'), datetime('now'))",
                params![
                    key,
                    normalize_meta(item.group.as_deref()),
                    normalize_meta(item.description.as_deref())
                ],
            )?;
            tx.last_insert_rowid()
        }
    };

    for (site_id, value) in &item.values {
        if value.is_empty() {
            tx.prepare_cached(
                "DELETE FROM translation_values WHERE translation_id = ?1 AND site_id = ?2",
            )?
            .execute(params![translation_id, site_id])?;
            continue;
        }

        tx.prepare_cached(
            "INSERT INTO translation_values
                (translation_id, site_id, value, date_created, date_updated)
             VALUES (?1, ?2, ?3, datetime('now'), datetime('now'))
             ON CONFLICT (translation_id, site_id)
             DO UPDATE SET value = excluded.value, date_updated = excluded.date_updated",
        )?
        .execute(params![translation_id, site_id, value])?;
    }

    Ok(())
}
