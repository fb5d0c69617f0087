//! CLI argument definitions for the scanner dashboard backend.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// pas-scanner — store, browse and export identification card scans.
#[derive(Parser, Debug)]
#[command(name = "pas-scanner", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the scan database.
    #[arg(short = 'd', long = "data-dir", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Keep scans in memory only.
    #[arg(long = "in-memory", global = true)]
    pub in_memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Store one scan record (JSON object) from a file or stdin.
    Save {
        /// File containing the record; reads stdin when omitted.
        file: Option<PathBuf>,
    },
    /// List dates that have stored scans, most recent first.
    Dates,
    /// Print the scans stored for a date.
    Show {
        /// Date as YYYY-MM-DD; today when omitted.
        #[arg(long)]
        date: Option<String>,
    },
    /// Write an export file for one date or for all dates.
    Export {
        /// Export only this date (YYYY-MM-DD).
        #[arg(long)]
        date: Option<String>,
        /// Output directory; defaults to the configured export directory.
        #[arg(short = 'o', long = "out")]
        out: Option<PathBuf>,
    },
    /// Summarize and list scan history with optional filters.
    History {
        /// First day to include (YYYY-MM-DD).
        #[arg(long, value_parser = parse_day)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD).
        #[arg(long, value_parser = parse_day)]
        to: Option<NaiveDate>,
        /// Only scans taken at this scan area.
        #[arg(long)]
        area: Option<String>,
        /// Only cards granting this access-area code.
        #[arg(long)]
        access: Option<String>,
    },
}

fn parse_day(text: &str) -> Result<NaiveDate, String> {
    pas_storage::keys::parse_date(text).map_err(|e| e.to_string())
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PAS_SCANNER_CONFIG env var > platform default
    /// (~/.pas-scanner/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PAS_SCANNER_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the data directory path.
    ///
    /// Priority: --data-dir flag > config file value.
    /// Returns `None` if not overridden (use config default).
    pub fn resolve_data_dir(&self) -> Option<String> {
        self.data_dir
            .as_ref()
            .map(|p| p.to_string_lossy().to_string())
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".pas-scanner").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".pas-scanner").join("config.toml");
    }
    PathBuf::from("config.toml")
}
