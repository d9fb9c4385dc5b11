use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid device id: {value}")]
    InvalidDeviceId { value: u32 },

    #[error("Invalid element symbol: {raw:?}")]
    InvalidElement { raw: String },
}
