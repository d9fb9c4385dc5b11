use ms_transport::TransportError;
use thiserror::Error;

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("OPC connect failed: {0}")]
    ConnectFailed(#[source] TransportError),

    #[error("Duplicate device id: {id}")]
    DuplicateDevice { id: u32 },
}
