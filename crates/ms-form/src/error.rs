use ms_transport::TransportError;
use thiserror::Error;

pub type SchemaResult<T> = Result<T, SchemaError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Grade lookup failed: {0}")]
    Transport(#[from] TransportError),

    #[error("Unexpected response for grade '{grade}': {message}")]
    Malformed { grade: String, message: String },
}
