//! Scanner storage crate - date-partitioned scan persistence and export.
//!
//! Scan records are filed into one JSON array per calendar date inside a
//! string key-value store (SQLite-backed by default). A separate index key
//! lists every date that has a partition, most recent first. Exports are
//! assembled on demand from the index and the partitions.

pub mod clock;
pub mod date_index;
pub mod db;
pub mod export;
pub mod history;
pub mod keys;
pub mod kv;
pub mod migrations;
pub mod record_store;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date_index::DateIndex;
pub use db::Database;
pub use export::{all_data_file_name, date_file_name, write_export, ExportAssembler, FullExport};
pub use history::{AreaCount, HistoryFilter, HistorySummary};
pub use kv::{KeyValueStore, MemoryStore};
pub use record_store::RecordStore;
pub use service::ScanStorage;
