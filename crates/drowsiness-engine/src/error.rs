//! Error types

use thiserror::Error;

/// Engine error types
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Invalid configuration, fatal at construction time
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} must be finite and positive, got {value}")]
    InvalidThreshold { field: &'static str, value: f64 },

    #[error("{0} must be at least one frame")]
    ZeroFrameCount(&'static str),

    #[error("{0} must hold at least one value")]
    ZeroWindow(&'static str),

    #[error("Failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
}

/// Malformed landmark set
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Expected {expected} landmarks, got {actual}")]
    WrongCardinality { expected: usize, actual: usize },

    #[error("Landmark {index} has non-finite coordinates ({x}, {y})")]
    NonFinite { index: usize, x: f64, y: f64 },
}

/// Failure of an optional collaborator (face landmarker, phone, gaze)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SignalError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),

    #[error("{source_name} failed: {message}")]
    Failed {
        source_name: &'static str,
        message: String,
    },
}

impl SignalError {
    pub fn failed(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            source_name,
            message: message.into(),
        }
    }
}
