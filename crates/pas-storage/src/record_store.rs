//! Date-partitioned scan record persistence.
//!
//! Each calendar date owns one JSON array of [`ScanRecord`] stored under
//! [`keys::partition_key`]. Appends go to the partition for the clock's
//! current local date, not the date of the record's own timestamp.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pas_core::error::{PasError, Result};
use pas_core::types::ScanRecord;

use crate::clock::Clock;
use crate::date_index::DateIndex;
use crate::keys;
use crate::kv::SharedStore;

/// Appends and reads scan record partitions.
pub struct RecordStore {
    store: SharedStore,
    index: DateIndex,
    clock: Arc<dyn Clock>,
    /// Serializes read-append-write within this process.
    write_lock: Mutex<()>,
}

impl RecordStore {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            index: DateIndex::new(Arc::clone(&store)),
            store,
            clock,
            write_lock: Mutex::new(()),
        }
    }

    pub fn index(&self) -> &DateIndex {
        &self.index
    }

    /// Today's date as `YYYY-MM-DD`, per the injected clock.
    pub fn today(&self) -> String {
        keys::format_date(self.clock.today())
    }

    /// Append a record to today's partition and register today in the index.
    ///
    /// Fails if the store cannot be read or rejects the write. The index is
    /// only touched after the partition write succeeded; a failure there is
    /// logged and leaves the partition unindexed.
    pub fn append(&self, record: &ScanRecord) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| PasError::Storage(format!("Record store lock poisoned: {}", e)))?;

        let date = self.today();
        let key = keys::partition_key(&date);

        let mut partition = match self.store.get_item(&key)? {
            Some(raw) => parse_partition(&key, &raw).unwrap_or_default(),
            None => {
                info!(key = %key, "Creating new partition");
                Vec::new()
            }
        };

        partition.push(StoredRecord::Scan(record.clone()));
        let value = serde_json::to_string(&partition)?;
        self.store.set_item(&key, &value)?;
        debug!(key = %key, records = partition.len(), "Scan record saved");

        if let Err(e) = self.index.register(&date) {
            warn!(date = %date, error = %e, "Partition written but date index update failed");
        }

        Ok(())
    }

    /// Records for `date` (today when `None`), in insertion order.
    ///
    /// Missing or malformed partitions read as empty.
    pub fn read(&self, date: Option<&str>) -> Vec<ScanRecord> {
        let date = match date {
            Some(d) => d.to_string(),
            None => self.today(),
        };
        self.read_existing(&date).unwrap_or_default()
    }

    /// Records for `date`, or `None` when the partition is missing or
    /// cannot be read.
    pub fn read_existing(&self, date: &str) -> Option<Vec<ScanRecord>> {
        let key = keys::partition_key(date);
        match self.store.get_item(&key) {
            Ok(Some(raw)) => parse_partition(&key, &raw).map(|items| decode_records(&key, items)),
            Ok(None) => None,
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to read partition");
                None
            }
        }
    }
}

/// One element of a stored partition array.
///
/// Elements that do not decode as a [`ScanRecord`] are kept as plain JSON so an
/// append never drops what was already stored.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum StoredRecord {
    Scan(ScanRecord),
    Other(serde_json::Value),
}

/// Partition elements, or `None` when the stored text is not a JSON array.
fn parse_partition(key: &str, raw: &str) -> Option<Vec<StoredRecord>> {
    match serde_json::from_str::<Vec<StoredRecord>>(raw) {
        Ok(items) => Some(items),
        Err(e) => {
            warn!(key = %key, error = %e, "Malformed partition, treating as empty");
            None
        }
    }
}

fn decode_records(key: &str, items: Vec<StoredRecord>) -> Vec<ScanRecord> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(position, item)| match item {
            StoredRecord::Scan(record) => Some(record),
            StoredRecord::Other(_) => {
                warn!(key = %key, position, "Skipping unreadable scan record");
                None
            }
        })
        .collect()
}
