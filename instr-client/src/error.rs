//! Error types for the instr client

use thiserror::Error;

/// Errors that can occur while talking to the matrix's `/cgi-bin/instr` endpoint
#[derive(Debug, Error)]
pub enum InstrError {
    /// Connection, timeout or I/O failure
    #[error("Network/HTTP error: {0}")]
    Network(String),

    /// The device answered with something other than HTTP 200
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// The body was not valid JSON
    #[error("JSON parsing error: {0}")]
    Parse(String),
}
