//! Shared domain types and configuration for the catalog migration pipeline.

pub mod app_config;
pub mod catalog;
pub mod config;
pub mod records;
pub mod tables;

use thiserror::Error;

pub use app_config::{AppConfig, WeightUnit};
pub use catalog::{AxisName, CatalogRow, OptionSchema};
pub use config::{load_app_config, load_app_config_from_env};
pub use records::{FamilyKey, RawRecord, RecordId};
pub use tables::{load_tables, CategoryValue, PatternLabel, Placeholders, TablesFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tables file {path}: {source}")]
    TablesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tables file: {0}")]
    TablesFileParse(#[source] serde_yaml::Error),

    #[error("tables validation failed: {0}")]
    Validation(String),
}
