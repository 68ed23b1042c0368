// 🗄️ Repository - Key-value persistence for suppliers, rules and import batches
//
// The engine never touches storage; callers inject a Repository into the
// workflows. Values are JSON documents addressed by (collection, key) and the
// last write wins.

use crate::error::{Error, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::RwLock;
use tracing::debug;

// ============================================================================
// COLLECTIONS
// ============================================================================

pub const SUPPLIERS: &str = "suppliers";
pub const QUALIFICATIONS: &str = "qualifications";
pub const GRADING_RULES: &str = "grading_rules";
pub const PURCHASE_ORDERS: &str = "purchase_orders";
pub const IMPORT_BATCHES: &str = "import_batches";
pub const META: &str = "meta";

// ============================================================================
// REPOSITORY TRAIT
// ============================================================================

pub trait Repository {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    fn put(&self, collection: &str, key: &str, value: &Value) -> Result<()>;

    /// Returns true when a value was removed
    fn delete(&self, collection: &str, key: &str) -> Result<bool>;

    /// Keys of a collection in ascending order
    fn keys(&self, collection: &str) -> Result<Vec<String>>;
}

/// Typed access on top of any [`Repository`]
pub trait RepositoryExt: Repository {
    fn get_json<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Option<T>> {
        match self.get(collection, key)? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, collection: &str, key: &str, value: &T) -> Result<()> {
        self.put(collection, key, &serde_json::to_value(value)?)
    }

    /// Every value of a collection, in key order
    fn list_json<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();
        for key in self.keys(collection)? {
            if let Some(item) = self.get_json(collection, &key)? {
                items.push(item);
            }
        }
        Ok(items)
    }

    fn require_json<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<T> {
        self.get_json(collection, key)?
            .ok_or_else(|| Error::NotFound(format!("{}/{}", collection, key)))
    }
}

impl<R: Repository + ?Sized> RepositoryExt for R {}

// ============================================================================
// SQLITE REPOSITORY
// ============================================================================

pub struct SqliteRepository {
    conn: Connection,
}

impl SqliteRepository {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        // Enable WAL mode for crash recovery
        conn.pragma_update(None, "journal_mode", "WAL")?;
        let repo = SqliteRepository { conn };
        repo.setup()?;
        debug!(path = %path.display(), "sqlite repository opened");
        Ok(repo)
    }

    pub fn open_in_memory() -> Result<Self> {
        let repo = SqliteRepository {
            conn: Connection::open_in_memory()?,
        };
        repo.setup()?;
        Ok(repo)
    }

    fn setup(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (collection, key)
            )",
            [],
        )?;
        Ok(())
    }

    /// Number of stored values in a collection
    pub fn count(&self, collection: &str) -> Result<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM kv_store WHERE collection = ?1",
            params![collection],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl Repository for SqliteRepository {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE collection = ?1 AND key = ?2",
                params![collection, key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn put(&self, collection: &str, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO kv_store (collection, key, value, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(collection, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at",
            params![collection, key, text, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let removed = self.conn.execute(
            "DELETE FROM kv_store WHERE collection = ?1 AND key = ?2",
            params![collection, key],
        )?;
        Ok(removed > 0)
    }

    fn keys(&self, collection: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM kv_store WHERE collection = ?1 ORDER BY key")?;

        let keys = stmt
            .query_map(params![collection], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;

        Ok(keys)
    }
}

// ============================================================================
// IN-MEMORY REPOSITORY
// ============================================================================

/// Map-backed repository for tests and dry runs
#[derive(Default)]
pub struct InMemoryRepository {
    data: RwLock<BTreeMap<(String, String), Value>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> Error {
    Error::LockPoisoned("in-memory repository".to_string())
}

impl Repository for InMemoryRepository {
    fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data.get(&(collection.to_string(), key.to_string())).cloned())
    }

    fn put(&self, collection: &str, key: &str, value: &Value) -> Result<()> {
        let mut data = self.data.write().map_err(poisoned)?;
        data.insert((collection.to_string(), key.to_string()), value.clone());
        Ok(())
    }

    fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let mut data = self.data.write().map_err(poisoned)?;
        Ok(data.remove(&(collection.to_string(), key.to_string())).is_some())
    }

    fn keys(&self, collection: &str) -> Result<Vec<String>> {
        let data = self.data.read().map_err(poisoned)?;
        Ok(data
            .keys()
            .filter(|(c, _)| c == collection)
            .map(|(_, k)| k.clone())
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
