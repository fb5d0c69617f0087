use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

// =============================================================================
// Scan records
// =============================================================================

/// One completed identification card scan.
///
/// Field order here is the field order of every serialized partition and
/// export document. `scan_timestamp` is assigned by the caller at scan time
/// and never changes afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecord {
    /// Card holder name.
    pub name: String,
    /// Identification number printed on the card.
    pub id_number: String,
    /// Authority that issued the card.
    pub issuing_authority: String,
    /// Work location of the card holder.
    pub location: String,
    /// Job position of the card holder.
    pub position: String,
    /// Employing company.
    pub company: String,
    /// Access-area codes granted by the card (short labels). Older records
    /// may omit the field.
    #[serde(default)]
    pub access_areas: Vec<String>,
    /// Expiry date as printed; not necessarily ISO formatted.
    pub expiry_date: String,
    /// Area where the scan took place.
    pub scan_area: String,
    /// Milliseconds since the Unix epoch.
    pub scan_timestamp: i64,
}

impl ScanRecord {
    /// Local wall-clock time of the scan, if the timestamp is representable.
    pub fn scanned_at(&self) -> Option<DateTime<Local>> {
        Local.timestamp_millis_opt(self.scan_timestamp).single()
    }

    /// Whether the card grants the given access-area code.
    pub fn grants_access_to(&self, area: &str) -> bool {
        self.access_areas.iter().any(|a| a == area)
    }
}
