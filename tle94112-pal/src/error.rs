//! Common error types for tle94112-pal.
//!
//! This module provides a centralized Error enum using thiserror for the
//! hosted side of the crate. Register access returns
//! [`hw_trait::Result`](crate::hw_trait::Result) directly so that it stays
//! usable without `std`.

use thiserror::Error;

/// Error loading or validating configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors while reading configuration
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("Configuration parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration that parses but cannot be used
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
