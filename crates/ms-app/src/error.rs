//! Error types for the ms-app service layer.

use std::path::PathBuf;

use ms_form::SchemaError;
use ms_readings::ReadingError;
use ms_session::SessionError;
use ms_transport::TransportError;

/// Application error type wrapping the component errors for front ends.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Failed to read config file: {path}")]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Config validation failed: {0}")]
    Validation(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Grade error: {0}")]
    Schema(String),

    #[error("Reading error: {0}")]
    Reading(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<SessionError> for AppError {
    fn from(e: SessionError) -> Self {
        AppError::Session(e.to_string())
    }
}

impl From<SchemaError> for AppError {
    fn from(e: SchemaError) -> Self {
        AppError::Schema(e.to_string())
    }
}

impl From<ReadingError> for AppError {
    fn from(e: ReadingError) -> Self {
        AppError::Reading(e.to_string())
    }
}

impl From<TransportError> for AppError {
    fn from(e: TransportError) -> Self {
        AppError::Transport(e.to_string())
    }
}
