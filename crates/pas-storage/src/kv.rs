//! String key-value stores.
//!
//! `KeyValueStore` is the only persistence primitive the partition and index
//! logic sees. `Database` provides the durable implementation, `MemoryStore`
//! an in-process one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rusqlite::OptionalExtension;

use pas_core::error::{PasError, Result};

use crate::db::Database;

/// Origin-scoped string key-value store.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored at `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored at `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Every stored key, in ascending order.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Shared store reference.
pub type SharedStore = Arc<dyn KeyValueStore>;

fn entry_size(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// Fail when `other_bytes` plus the new entry exceeds `quota`.
fn check_quota(other_bytes: u64, key: &str, value: &str, quota: Option<u64>) -> Result<()> {
    if let Some(quota) = quota {
        let needed = other_bytes + entry_size(key, value);
        if needed > quota {
            return Err(PasError::QuotaExceeded { needed, quota });
        }
    }
    Ok(())
}

impl KeyValueStore for Database {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM kv_store WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| PasError::Storage(format!("Failed to read {}: {}", key, e)))
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let quota = self.quota();
        self.with_conn(|conn| {
            if quota.is_some() {
                let other: i64 = conn
                    .query_row(
                        "SELECT COALESCE(SUM(LENGTH(CAST(key AS BLOB)) + LENGTH(CAST(value AS BLOB))), 0)
                         FROM kv_store WHERE key != ?1",
                        rusqlite::params![key],
                        |row| row.get(0),
                    )
                    .map_err(|e| PasError::Storage(format!("Failed to measure store: {}", e)))?;
                check_quota(other.max(0) as u64, key, value, quota)?;
            }

            conn.execute(
                "INSERT INTO kv_store (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now'))
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at",
                rusqlite::params![key, value],
            )
            .map_err(|e| PasError::Storage(format!("Failed to write {}: {}", key, e)))?;
            Ok(())
        })
    }

    fn keys(&self) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT key FROM kv_store ORDER BY key")
                .map_err(|e| PasError::Storage(e.to_string()))?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| PasError::Storage(e.to_string()))?;
            rows.collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| PasError::Storage(format!("Failed to list keys: {}", e)))
        })
    }
}

/// In-process store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: Option<u64>) -> Self {
        Self {
            items: Mutex::default(),
            quota_bytes: quota,
        }
    }

    pub fn len(&self) -> usize {
        self.items.lock().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|e| PasError::Storage(e.to_string()))?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|e| PasError::Storage(e.to_string()))?;
        let other: u64 = items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| entry_size(k, v))
            .sum();
        check_quota(other, key, value, self.quota_bytes)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let items = self
            .items
            .lock()
            .map_err(|e| PasError::Storage(e.to_string()))?;
        let mut keys: Vec<String> = items.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
