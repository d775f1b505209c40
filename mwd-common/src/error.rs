//! Common error types for the MWD service

use thiserror::Error;

/// Common result type for storage and configuration operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised below the HTTP layer
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failure (database directory, config file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed TOML bootstrap file
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration value out of range or unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feature column name outside the canonical five
    #[error("Unknown feature: {0}")]
    UnknownFeature(String),

    /// Requested row does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request payload failed validation
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
