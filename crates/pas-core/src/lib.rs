pub mod config;
pub mod error;
pub mod types;

pub use config::PasConfig;
pub use error::{PasError, Result};
pub use types::*;
