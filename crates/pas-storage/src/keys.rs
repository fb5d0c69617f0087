//! Storage key scheme.
//!
//! Partition keys are `pas_scanner_data_` followed by a `YYYY-MM-DD` date;
//! the date index lives under the reserved key `pas_scanner_data_dates_list`.

use chrono::NaiveDate;

use pas_core::error::{PasError, Result};

/// Prefix shared by every key this crate writes.
pub const STORAGE_PREFIX: &str = "pas_scanner_data_";

/// Suffix of the reserved date-index key.
pub const DATES_LIST_SUFFIX: &str = "dates_list";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Render a calendar date as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| PasError::InvalidDate(format!("{}: {}", text, e)))
}

/// Key of the partition for a date string. The date is not validated.
pub fn partition_key(date: &str) -> String {
    format!("{}{}", STORAGE_PREFIX, date)
}

/// Key of the partition for a calendar date.
pub fn partition_key_for(date: NaiveDate) -> String {
    partition_key(&format_date(date))
}

/// Date portion of a partition key, returned verbatim.
///
/// Keys without the prefix are returned unchanged.
pub fn date_from_key(key: &str) -> &str {
    key.strip_prefix(STORAGE_PREFIX).unwrap_or(key)
}

/// The reserved key holding the serialized date index.
pub fn index_key() -> String {
    format!("{}{}", STORAGE_PREFIX, DATES_LIST_SUFFIX)
}
