use thiserror::Error;

/// Top-level error type for the scanner dashboard backend.
///
/// Store-level failures (`Storage`, `QuotaExceeded`, `Serialization`) are
/// wrapped into `SaveFailed` / `ExportFailed` at the collaborator boundary so
/// callers see a fixed message while the cause stays reachable via `source()`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PasError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Storage quota exceeded: {needed} bytes exceeds {quota} bytes")]
    QuotaExceeded { needed: u64, quota: u64 },

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Failed to save scan data")]
    SaveFailed {
        #[source]
        source: Box<PasError>,
    },

    #[error("Failed to export all data")]
    ExportFailed {
        #[source]
        source: Box<PasError>,
    },
}

impl PasError {
    /// Wrap a store failure as the error reported to `save_scan_data` callers.
    pub fn save_failed(source: PasError) -> Self {
        PasError::SaveFailed {
            source: Box::new(source),
        }
    }

    /// Wrap a failure as the error reported to `export_all_data` callers.
    pub fn export_failed(source: PasError) -> Self {
        PasError::ExportFailed {
            source: Box::new(source),
        }
    }
}

impl From<toml::de::Error> for PasError {
    fn from(err: toml::de::Error) -> Self {
        PasError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PasError {
    fn from(err: toml::ser::Error) -> Self {
        PasError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PasError {
    fn from(err: serde_json::Error) -> Self {
        PasError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for scanner storage operations.
pub type Result<T> = std::result::Result<T, PasError>;
