//! Error types for shepherd operations

use thiserror::Error;

/// Errors that can occur during shepherd operations
#[derive(Error, Debug)]
pub enum ShepherdError {
    /// Storage layer error
    #[error("Storage error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}
