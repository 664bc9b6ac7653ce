use instr_client::InstrError;
use thiserror::Error;

/// High-level API errors for matrix operations
///
/// Transport problems, malformed replies and exhausted retries are all
/// ordinary values here; nothing in this crate panics on device behaviour.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network communication error
    ///
    /// Connection refused, DNS failure, timeout or an I/O error while reading
    /// the body.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The device answered with a status other than HTTP 200
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// The reply was not a JSON object, or a field had an unexpected type
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Well-formed JSON that does not match the command that was sent
    #[error("Invalid response to '{comhead}': {reason}")]
    InvalidResponse { comhead: String, reason: String },

    /// Every attempt of a status query failed
    #[error("'{comhead}' on {host} failed after {attempts} attempts")]
    Unavailable {
        host: String,
        comhead: String,
        attempts: u32,
    },

    /// Invalid parameter value
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Rejected client configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApiError {
    /// Whether the matrix could not be reached or did not produce usable data
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            ApiError::NetworkError(_)
                | ApiError::HttpStatus(_)
                | ApiError::ParseError(_)
                | ApiError::InvalidResponse { .. }
                | ApiError::Unavailable { .. }
        )
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

impl From<InstrError> for ApiError {
    fn from(error: InstrError) -> Self {
        match error {
            InstrError::Network(msg) => ApiError::NetworkError(msg),
            InstrError::Status(code) => ApiError::HttpStatus(code),
            InstrError::Parse(msg) => ApiError::ParseError(msg),
        }
    }
}
