//! Error types for Pathik

use crate::config::ConfigLoadError;
use crate::navigation::NavError;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pathik error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    /// Navigation controller fault
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavError),

    /// Drive train rejected a command
    #[error("Actuator error: {0}")]
    Actuator(String),

    /// Log stream failure
    #[error("Logger error: {0}")]
    Logger(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
