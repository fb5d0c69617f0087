//! Benchmarks for full export assembly.
//!
//! Fills an in-memory SQLite store with a month of scans (40 per day) and
//! measures `export_all_data`, which reads the index, every partition, and
//! pretty-prints the result.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use criterion::{criterion_group, criterion_main, Criterion};

use pas_core::types::ScanRecord;
use pas_storage::{Clock, Database, FixedClock, ScanStorage};

const DAYS: i64 = 30;
const SCANS_PER_DAY: i64 = 40;

fn make_record(index: i64) -> ScanRecord {
    ScanRecord {
        name: format!("Card Holder {}", index),
        id_number: format!("PAS-{:06}", index),
        issuing_authority: "Otoritas Bandara Wilayah I".to_string(),
        location: "Terminal 3".to_string(),
        position: "Ground Handling".to_string(),
        company: "PT Gapura".to_string(),
        access_areas: vec!["A".to_string(), "B".to_string()],
        expiry_date: "31-12-2026".to_string(),
        scan_area: format!("Gate {}", index % 6),
        scan_timestamp: 1_700_000_000_000 + index * 60_000,
    }
}

fn build_storage() -> ScanStorage {
    let start = NaiveDate::from_ymd_opt(2023, 11, 1).unwrap();
    let clock = Arc::new(FixedClock::new(start));
    let db = Arc::new(Database::in_memory().unwrap());
    let storage = ScanStorage::new(db, clock.clone());

    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        for day in 0..DAYS {
            clock.set(start + Duration::days(day));
            for i in 0..SCANS_PER_DAY {
                let record = make_record(day * SCANS_PER_DAY + i);
                storage.save_scan_data(&record).await.unwrap();
            }
        }
    });
    assert_eq!(clock.today(), start + Duration::days(DAYS - 1));
    storage
}

fn bench_export_all(c: &mut Criterion) {
    let storage = build_storage();
    c.bench_function("export_all_data_30_days", |b| {
        b.iter(|| storage.export_all_data().unwrap())
    });
}

fn bench_export_one(c: &mut Criterion) {
    let storage = build_storage();
    c.bench_function("export_data_for_date", |b| {
        b.iter(|| storage.export_data_for_date("2023-11-15").unwrap())
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20);
    targets = bench_export_all, bench_export_one
}
criterion_main!(benches);
