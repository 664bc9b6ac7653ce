use orei_api::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Unable to contact HDMI matrix at {0}")]
    Unreachable(String),

    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Zone {0} has no active source")]
    NoActiveSource(u8),

    #[error("Invalid service call: {0}")]
    InvalidService(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;
