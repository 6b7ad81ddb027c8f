//! Error types for Drishti

use thiserror::Error;

/// Drishti error type
#[derive(Error, Debug)]
pub enum DrishtiError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid map descriptor: {0}")]
    InvalidMap(String),

    #[error("Map not loaded: {0}")]
    MapUnavailable(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Session error: {0}")]
    Session(String),

    #[error("Mission error: {0}")]
    Mission(String),
}

impl From<serde_json::Error> for DrishtiError {
    fn from(e: serde_json::Error) -> Self {
        DrishtiError::Decode(e.to_string())
    }
}

impl From<toml::de::Error> for DrishtiError {
    fn from(e: toml::de::Error) -> Self {
        DrishtiError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DrishtiError>;
