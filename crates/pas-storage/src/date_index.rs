//! Index of dates that have a stored partition.
//!
//! Stored as a JSON array of `YYYY-MM-DD` strings under [`keys::index_key`],
//! sorted descending (most recent first). Entries are never removed.

use tracing::{debug, warn};

use pas_core::error::Result;

use crate::keys;
use crate::kv::SharedStore;

/// Read/maintain the date index in a key-value store.
pub struct DateIndex {
    store: SharedStore,
}

impl DateIndex {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Add `date` to the index if it is not already listed.
    ///
    /// A missing index, or one that is not a JSON array, is treated as empty
    /// and is replaced by the rewritten one. Non-string entries are dropped
    /// on rewrite. Registering a date that is already present does not write
    /// at all.
    pub(crate) fn register(&self, date: &str) -> Result<()> {
        let key = keys::index_key();
        let mut dates = match self.store.get_item(&key)? {
            Some(raw) => parse_dates(&key, &raw).unwrap_or_default(),
            None => Vec::new(),
        };

        if dates.iter().any(|d| d == date) {
            return Ok(());
        }

        dates.push(date.to_string());
        dates.sort_unstable_by(|a, b| b.cmp(a));

        let value = serde_json::to_string(&dates)?;
        self.store.set_item(&key, &value)?;
        debug!(date, total = dates.len(), "Registered date in index");
        Ok(())
    }

    /// All indexed dates, most recent first. Never fails: an unreadable or
    /// malformed index yields an empty list.
    pub fn list(&self) -> Vec<String> {
        let key = keys::index_key();
        match self.store.get_item(&key) {
            Ok(Some(raw)) => parse_dates(&key, &raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read date index");
                Vec::new()
            }
        }
    }

    pub fn contains(&self, date: &str) -> bool {
        self.list().iter().any(|d| d == date)
    }
}

/// String entries of the stored index, or `None` when it is not a JSON array.
fn parse_dates(key: &str, raw: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Vec<serde_json::Value>>(raw) {
        Ok(entries) => {
            let total = entries.len();
            let dates: Vec<String> = entries
                .into_iter()
                .filter_map(|entry| match entry {
                    serde_json::Value::String(date) => Some(date),
                    _ => None,
                })
                .collect();
            if dates.len() < total {
                warn!(key = %key, skipped = total - dates.len(), "Ignoring non-string date index entries");
            }
            Some(dates)
        }
        Err(e) => {
            warn!(key = %key, error = %e, "Malformed date index, treating as empty");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::kv::{KeyValueStore, MemoryStore};

    fn make_index() -> (Arc<MemoryStore>, DateIndex) {
        let store = Arc::new(MemoryStore::new());
        let index = DateIndex::new(store.clone());
        (store, index)
    }

    #[test]
    fn test_list_empty_when_absent() {
        let (_, index) = make_index();
        assert!(index.list().is_empty());
    }

    #[test]
    fn test_register_sorts_descending() {
        let (_, index) = make_index();
        index.register("2023-11-14").unwrap();
        index.register("2024-01-02").unwrap();
        index.register("2023-12-31").unwrap();
        assert_eq!(index.list(), vec!["2024-01-02", "2023-12-31", "2023-11-14"]);
    }

    #[test]
    fn test_register_is_idempotent() {
        let (_, index) = make_index();
        index.register("2023-11-14").unwrap();
        index.register("2023-11-14").unwrap();
        assert_eq!(index.list(), vec!["2023-11-14"]);
    }

    #[test]
    fn test_register_existing_date_does_not_rewrite() {
        let (store, index) = make_index();
        // Deliberately unsorted: a rewrite would sort it.
        store
            .set_item(&keys::index_key(), r#"["2023-01-01","2023-05-05"]"#)
            .unwrap();
        index.register("2023-01-01").unwrap();
        assert_eq!(
            store.get_item(&keys::index_key()).unwrap().as_deref(),
            Some(r#"["2023-01-01","2023-05-05"]"#)
        );
    }

    #[test]
    fn test_list_malformed_is_empty() {
        let (store, index) = make_index();
        store.set_item(&keys::index_key(), "{not json").unwrap();
        assert!(index.list().is_empty());
        store.set_item(&keys::index_key(), r#"{"a": 1}"#).unwrap();
        assert!(index.list().is_empty());
    }

    #[test]
    fn test_register_replaces_malformed_index() {
        let (store, index) = make_index();
        store.set_item(&keys::index_key(), "garbage").unwrap();
        index.register("2023-11-14").unwrap();
        assert_eq!(index.list(), vec!["2023-11-14"]);
    }

    #[test]
    fn test_register_keeps_dates_beside_non_string_entries() {
        let (store, index) = make_index();
        store
            .set_item(&keys::index_key(), r#"["2023-11-14", 5]"#)
            .unwrap();
        assert_eq!(index.list(), vec!["2023-11-14"]);

        index.register("2023-11-15").unwrap();
        assert_eq!(index.list(), vec!["2023-11-15", "2023-11-14"]);
    }

    #[test]
    fn test_contains() {
        let (_, index) = make_index();
        index.register("2023-11-14").unwrap();
        assert!(index.contains("2023-11-14"));
        assert!(!index.contains("2023-11-15"));
    }
}
