//! Collaborator-facing storage facade.
//!
//! Read operations never fail: corrupt or missing data reads as empty.
//! Write and full-export failures surface once, wrapped in
//! [`PasError::SaveFailed`] / [`PasError::ExportFailed`].

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use pas_core::config::StorageConfig;
use pas_core::error::{PasError, Result};
use pas_core::types::ScanRecord;

use crate::clock::{Clock, SystemClock};
use crate::db::Database;
use crate::export::ExportAssembler;
use crate::history::{summarize, HistoryFilter, HistorySummary};
use crate::kv::{MemoryStore, SharedStore};
use crate::record_store::RecordStore;

/// Scan persistence, listing, history and export behind one handle.
pub struct ScanStorage {
    records: Arc<RecordStore>,
    exports: ExportAssembler,
    clock: Arc<dyn Clock>,
}

impl ScanStorage {
    pub fn new(store: SharedStore, clock: Arc<dyn Clock>) -> Self {
        let records = Arc::new(RecordStore::new(store, Arc::clone(&clock)));
        Self {
            exports: ExportAssembler::new(Arc::clone(&records)),
            records,
            clock,
        }
    }

    /// Open storage as configured: an SQLite file under `data_dir`, or an
    /// in-memory store when `config.in_memory` is set.
    pub fn open(data_dir: &Path, config: &StorageConfig) -> Result<Self> {
        let store: SharedStore = if config.in_memory {
            info!("Using in-memory scan store");
            Arc::new(MemoryStore::with_quota(config.quota()))
        } else {
            let path = data_dir.join(&config.database_file);
            Arc::new(Database::new(&path)?.with_quota(config.quota()))
        };
        Ok(Self::new(store, Arc::new(SystemClock)))
    }

    /// Persist a scan under today's date.
    pub async fn save_scan_data(&self, record: &ScanRecord) -> Result<()> {
        self.records.append(record).map_err(|e| {
            error!(error = %e, id_number = %record.id_number, "Error saving scan data");
            PasError::save_failed(e)
        })
    }

    /// Records for `date` (today when `None`). Never fails.
    pub fn get_scan_data_by_date(&self, date: Option<&str>) -> Vec<ScanRecord> {
        self.records.read(date)
    }

    /// Dates that have stored scans, most recent first. Never fails.
    pub fn get_all_stored_dates(&self) -> Vec<String> {
        self.records.index().list()
    }

    /// Pretty-printed JSON object of every stored date's records.
    pub fn export_all_data(&self) -> Result<String> {
        self.exports.export_all().map_err(|e| {
            error!(error = %e, "Error exporting all data");
            PasError::export_failed(e)
        })
    }

    /// Pretty-printed JSON array of one date's records.
    pub fn export_data_for_date(&self, date: &str) -> Result<String> {
        self.exports.export_one(date)
    }

    /// Every stored scan matching `filter`, most recent first.
    pub fn scan_history(&self, filter: &HistoryFilter) -> Vec<ScanRecord> {
        let all: Vec<ScanRecord> = self
            .get_all_stored_dates()
            .iter()
            .flat_map(|date| self.records.read(Some(date.as_str())))
            .collect();
        filter.apply(all, self.clock.now_millis())
    }

    /// Headline numbers over the filter's date range.
    ///
    /// Area filters narrow the listing only; totals and per-area counts
    /// always cover every area scanned in the range.
    pub fn history_summary(&self, filter: &HistoryFilter) -> HistorySummary {
        summarize(&self.scan_history(&filter.date_range_only()))
    }

    /// Today's date as used for new partitions.
    pub fn today(&self) -> String {
        self.records.today()
    }
}
