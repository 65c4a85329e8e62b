//! Error types for the snapshot sources and configuration loading.
//!
//! The analytics functions themselves are total and never return these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migration error
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// Configuration file could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("DATABASE_URL must be set to read from Postgres")]
    MissingDatabaseUrl,

    /// Record that cannot be stored as given
    #[error("invalid record {key}: {message}")]
    InvalidRecord { key: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
