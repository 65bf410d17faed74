//! Configuration loading errors.

use thiserror::Error;

/// Config load error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigLoadError {
    /// File could not be read
    #[error("IO error: {0}")]
    Io(String),
    /// YAML did not parse
    #[error("Parse error: {0}")]
    Parse(String),
    /// Parsed values are inconsistent
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
