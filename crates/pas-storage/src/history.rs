//! Scan history filtering and summaries for the dashboard.

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};

use pas_core::types::ScanRecord;

/// Date range and area filter over scan history.
///
/// Dates are inclusive local calendar days. With neither bound set no time
/// filtering happens; a missing start means the epoch and a missing end means
/// "now".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// Exact match on `scanArea`.
    pub scan_area: Option<String>,
    /// Card must grant this access-area code.
    pub access_area: Option<String>,
}

impl HistoryFilter {
    pub fn is_empty(&self) -> bool {
        self.start_date.is_none()
            && self.end_date.is_none()
            && self.scan_area.is_none()
            && self.access_area.is_none()
    }

    /// The same date range with the area filters cleared.
    pub fn date_range_only(&self) -> HistoryFilter {
        HistoryFilter {
            start_date: self.start_date,
            end_date: self.end_date,
            ..Default::default()
        }
    }

    /// Millisecond bounds of the date range, or `None` when unbounded.
    pub fn time_bounds(&self, now_millis: i64) -> Option<(i64, i64)> {
        if self.start_date.is_none() && self.end_date.is_none() {
            return None;
        }
        let start = self
            .start_date
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(local_millis)
            .unwrap_or(0);
        let end = self
            .end_date
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .map(local_millis)
            .unwrap_or(now_millis);
        Some((start, end))
    }

    pub fn matches(&self, record: &ScanRecord, now_millis: i64) -> bool {
        if let Some((start, end)) = self.time_bounds(now_millis) {
            if record.scan_timestamp < start || record.scan_timestamp > end {
                return false;
            }
        }
        if let Some(area) = &self.scan_area {
            if &record.scan_area != area {
                return false;
            }
        }
        if let Some(code) = &self.access_area {
            if !record.grants_access_to(code) {
                return false;
            }
        }
        true
    }

    /// Matching records, most recent first.
    pub fn apply(&self, records: Vec<ScanRecord>, now_millis: i64) -> Vec<ScanRecord> {
        let matching = records
            .into_iter()
            .filter(|r| self.matches(r, now_millis))
            .collect();
        most_recent_first(matching)
    }
}

fn local_millis(naive: NaiveDateTime) -> i64 {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        // Inside a DST gap: fall back to reading the wall time as UTC.
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Order by `scanTimestamp` descending, keeping input order for ties.
pub fn most_recent_first(mut records: Vec<ScanRecord>) -> Vec<ScanRecord> {
    records.sort_by(|a, b| b.scan_timestamp.cmp(&a.scan_timestamp));
    records
}

/// Scan count for one scan area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaCount {
    pub area: String,
    pub count: u64,
}

/// Headline numbers for a set of scans.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySummary {
    pub total_scans: usize,
    pub last_scan_area: Option<String>,
    /// Largest count first; ties ordered by area name.
    pub area_counts: Vec<AreaCount>,
}

pub fn summarize(records: &[ScanRecord]) -> HistorySummary {
    // max_by_key keeps the last maximum; iterate in reverse so ties resolve
    // to the earliest record.
    let last_scan_area = records
        .iter()
        .rev()
        .max_by_key(|r| r.scan_timestamp)
        .map(|r| r.scan_area.clone());

    let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
    for record in records {
        *counts.entry(record.scan_area.as_str()).or_insert(0) += 1;
    }
    let mut area_counts: Vec<AreaCount> = counts
        .into_iter()
        .map(|(area, count)| AreaCount {
            area: area.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the BTreeMap's name order among equal counts.
    area_counts.sort_by(|a, b| b.count.cmp(&a.count));

    HistorySummary {
        total_scans: records.len(),
        last_scan_area,
        area_counts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(area: &str, ts: i64) -> ScanRecord {
        ScanRecord {
            name: "Dewi".to_string(),
            id_number: "PAS-77".to_string(),
            issuing_authority: "Otoritas".to_string(),
            location: "Cargo".to_string(),
            position: "Supervisor".to_string(),
            company: "PT Kargo".to_string(),
            access_areas: vec!["B".to_string()],
            expiry_date: "2027-06-30".to_string(),
            scan_area: area.to_string(),
            scan_timestamp: ts,
        }
    }

    fn date(text: &str) -> NaiveDate {
        NaiveDate::parse_from_str(text, "%Y-%m-%d").unwrap()
    }

    fn local_ts(text: &str) -> i64 {
        let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S").unwrap();
        Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap()
            .timestamp_millis()
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = HistoryFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.time_bounds(0), None);
        assert!(filter.matches(&make_record("Gate 1", -5), 0));
    }

    #[test]
    fn test_date_range_is_inclusive_local_days() {
        let filter = HistoryFilter {
            start_date: Some(date("2023-11-14")),
            end_date: Some(date("2023-11-15")),
            ..Default::default()
        };
        let now = local_ts("2024-01-01 00:00:00");
        assert!(filter.matches(&make_record("G", local_ts("2023-11-14 00:00:00")), now));
        assert!(filter.matches(&make_record("G", local_ts("2023-11-15 23:59:59")), now));
        assert!(!filter.matches(&make_record("G", local_ts("2023-11-13 23:59:59")), now));
        assert!(!filter.matches(&make_record("G", local_ts("2023-11-16 00:00:00")), now));
    }

    #[test]
    fn test_open_end_uses_now() {
        let filter = HistoryFilter {
            start_date: Some(date("2023-11-14")),
            ..Default::default()
        };
        let now = local_ts("2023-11-20 10:00:00");
        assert!(filter.matches(&make_record("G", local_ts("2023-11-20 09:59:59")), now));
        assert!(!filter.matches(&make_record("G", local_ts("2023-11-20 10:00:01")), now));
    }

    #[test]
    fn test_area_filters() {
        let mut record = make_record("Gate 3", 10);
        record.access_areas = vec!["A".to_string(), "C".to_string()];

        let by_scan_area = HistoryFilter {
            scan_area: Some("Gate 3".to_string()),
            ..Default::default()
        };
        assert!(by_scan_area.matches(&record, 0));

        let wrong_area = HistoryFilter {
            scan_area: Some("Gate 4".to_string()),
            ..Default::default()
        };
        assert!(!wrong_area.matches(&record, 0));

        let by_access = HistoryFilter {
            access_area: Some("C".to_string()),
            ..Default::default()
        };
        assert!(by_access.matches(&record, 0));

        let no_access = HistoryFilter {
            access_area: Some("B".to_string()),
            ..Default::default()
        };
        assert!(!no_access.matches(&record, 0));
    }

    #[test]
    fn test_apply_orders_most_recent_first() {
        let records = vec![
            make_record("Gate 1", 100),
            make_record("Gate 2", 300),
            make_record("Gate 1", 200),
        ];
        let filter = HistoryFilter {
            scan_area: Some("Gate 1".to_string()),
            ..Default::default()
        };
        let result = filter.apply(records, 0);
        let stamps: Vec<i64> = result.iter().map(|r| r.scan_timestamp).collect();
        assert_eq!(stamps, vec![200, 100]);
    }

    #[test]
    fn test_most_recent_first_is_stable() {
        let mut a = make_record("G", 5);
        a.name = "first".to_string();
        let mut b = make_record("G", 5);
        b.name = "second".to_string();
        let sorted = most_recent_first(vec![a, make_record("G", 1), b]);
        assert_eq!(sorted[0].name, "first");
        assert_eq!(sorted[1].name, "second");
        assert_eq!(sorted[2].scan_timestamp, 1);
    }

    #[test]
    fn test_summarize() {
        let records = vec![
            make_record("Gate 2", 100),
            make_record("Gate 1", 400),
            make_record("Gate 2", 300),
            make_record("Apron", 200),
        ];
        let summary = summarize(&records);
        assert_eq!(summary.total_scans, 4);
        assert_eq!(summary.last_scan_area.as_deref(), Some("Gate 1"));
        assert_eq!(
            summary.area_counts,
            vec![
                AreaCount { area: "Gate 2".to_string(), count: 2 },
                AreaCount { area: "Apron".to_string(), count: 1 },
                AreaCount { area: "Gate 1".to_string(), count: 1 },
            ]
        );
    }

    #[test]
    fn test_summarize_empty() {
        assert_eq!(summarize(&[]), HistorySummary::default());
    }
}
