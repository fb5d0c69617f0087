//! pas-scanner binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Open the scan store (SQLite file or in-memory)
//! 4. Run the requested command against the storage facade

mod cli;

use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use pas_core::config::PasConfig;
use pas_core::types::ScanRecord;
use pas_storage::{all_data_file_name, date_file_name, write_export, HistoryFilter, ScanStorage};

use cli::{CliArgs, Command};

/// Expand ~ to home directory in a path string.
fn resolve_dir(dir: &str) -> PathBuf {
    if dir.starts_with("~/") || dir.starts_with("~\\") {
        #[cfg(target_os = "windows")]
        let home = std::env::var("USERPROFILE").unwrap_or_else(|_| ".".to_string());
        #[cfg(not(target_os = "windows"))]
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(&dir[2..])
    } else {
        PathBuf::from(dir)
    }
}

fn read_record(file: Option<&PathBuf>) -> Result<ScanRecord, Box<dyn std::error::Error>> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    Ok(serde_json::from_str(&text)?)
}

async fn run(
    command: Command,
    storage: &ScanStorage,
    config: &PasConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Save { file } => {
            let record = read_record(file.as_ref())?;
            storage.save_scan_data(&record).await?;
            println!("Saved scan for {} under {}", record.id_number, storage.today());
        }
        Command::Dates => {
            for date in storage.get_all_stored_dates() {
                println!("{}", date);
            }
        }
        Command::Show { date } => {
            let records = storage.get_scan_data_by_date(date.as_deref());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::Export { date, out } => {
            let dir = out.unwrap_or_else(|| resolve_dir(&config.export.output_dir));
            let (file_name, document) = match date {
                Some(d) => (date_file_name(&d), storage.export_data_for_date(&d)?),
                None => (all_data_file_name().to_string(), storage.export_all_data()?),
            };
            let path = write_export(&dir, &file_name, &document)?;
            println!("{}", path.display());
        }
        Command::History {
            from,
            to,
            area,
            access,
        } => {
            let filter = HistoryFilter {
                start_date: from,
                end_date: to,
                scan_area: area,
                access_area: access,
            };
            let summary = storage.history_summary(&filter);
            let records = storage.scan_history(&filter);

            println!("Total scans: {}", summary.total_scans);
            println!(
                "Last scanned area: {}",
                summary.last_scan_area.as_deref().unwrap_or("N/A")
            );
            for entry in &summary.area_counts {
                println!("  {:<20} {}", entry.area, entry.count);
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config. Loaded before tracing is installed, so load failures fall back
    // silently to defaults here.
    let config_file = args.resolve_config_path();
    let mut config = PasConfig::load_or_default(&config_file);
    if let Some(dir) = args.resolve_data_dir() {
        config.general.data_dir = dir;
    }
    if let Some(level) = args.resolve_log_level() {
        config.general.log_level = level;
    }
    if args.in_memory {
        config.storage.in_memory = true;
    }

    // Tracing. Logs go to stderr so command output stays pipeable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::debug!("Starting pas-scanner v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(path = %config_file.display(), "Configuration resolved");

    // Storage.
    let data_dir = resolve_dir(&config.general.data_dir);
    let storage = ScanStorage::open(&data_dir, &config.storage)?;
    tracing::debug!(
        path = %data_dir.display(),
        in_memory = config.storage.in_memory,
        "Scan store opened"
    );

    run(args.command, &storage, &config).await
}
