use ms_transport::TransportError;
use thiserror::Error;

pub type ReadingResult<T> = Result<T, ReadingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReadingError {
    #[error("Select a grade before generating a reading")]
    NoGradeSelected,

    #[error("Synthetic reading failed: {0}")]
    Source(#[from] TransportError),

    #[error("Invalid reading mode '{0}' (expected metal-alone, scrap-alone or scrap-metal)")]
    UnknownMode(String),
}
