//! Export document assembly.
//!
//! A full export is a JSON object mapping each indexed date to its records,
//! keys in index order. A per-date export is the bare record array. Both are
//! pretty-printed with two-space indentation.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, info};

use pas_core::error::Result;
use pas_core::types::ScanRecord;

use crate::record_store::RecordStore;

const ALL_DATA_FILE_NAME: &str = "pas-scanner-all-data.json";

/// File name for a full export.
pub fn all_data_file_name() -> &'static str {
    ALL_DATA_FILE_NAME
}

/// File name for a single-date export.
pub fn date_file_name(date: &str) -> String {
    format!("pas-scanner-data-{}.json", date)
}

/// Write an export document to `dir/file_name`, creating `dir` if needed.
pub fn write_export(dir: &Path, file_name: &str, document: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, document)?;
    info!(path = %path.display(), bytes = document.len(), "Export written");
    Ok(path)
}

/// Date-to-records mapping that serializes in index order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FullExport {
    partitions: Vec<(String, Vec<ScanRecord>)>,
}

impl FullExport {
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.partitions.iter().map(|(date, _)| date.as_str())
    }

    pub fn records(&self, date: &str) -> Option<&[ScanRecord]> {
        self.partitions
            .iter()
            .find(|(d, _)| d == date)
            .map(|(_, records)| records.as_slice())
    }

    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn total_records(&self) -> usize {
        self.partitions.iter().map(|(_, records)| records.len()).sum()
    }
}

impl Serialize for FullExport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.partitions.len()))?;
        for (date, records) in &self.partitions {
            map.serialize_entry(date, records)?;
        }
        map.end()
    }
}

/// Builds export documents from the record store and its date index.
pub struct ExportAssembler {
    records: Arc<RecordStore>,
}

impl ExportAssembler {
    pub fn new(records: Arc<RecordStore>) -> Self {
        Self { records }
    }

    /// Serialized records for one date; `[]` when the date has none.
    pub fn export_one(&self, date: &str) -> Result<String> {
        let records = self.records.read(Some(date));
        Ok(serde_json::to_string_pretty(&records)?)
    }

    /// Collect every indexed date whose partition can be read.
    ///
    /// Dates whose partition is missing or malformed are left out entirely.
    pub fn assemble_all(&self) -> FullExport {
        let partitions: Vec<(String, Vec<ScanRecord>)> = self
            .records
            .index()
            .list()
            .into_iter()
            .filter_map(|date| {
                let records = self.records.read_existing(&date);
                if records.is_none() {
                    debug!(date = %date, "Indexed date has no readable partition, omitted");
                }
                records.map(|r| (date, r))
            })
            .collect();
        FullExport { partitions }
    }

    /// Serialized full export.
    pub fn export_all(&self) -> Result<String> {
        let export = self.assemble_all();
        Ok(serde_json::to_string_pretty(&export)?)
    }
}
