//! Error types for Scrollcast.

use crate::ids::MediaId;
use thiserror::Error;

/// Main error type for Scrollcast operations.
#[derive(Error, Debug)]
pub enum ScrollcastError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No player available for media {0}")]
    UnknownMedia(MediaId),

    #[error("Invalid value for setting {key}: {value}")]
    InvalidSetting { key: String, value: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Scrollcast operations.
pub type Result<T> = std::result::Result<T, ScrollcastError>;
