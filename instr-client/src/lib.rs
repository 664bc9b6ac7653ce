//! Private HTTP/JSON client for OREI HDMI matrix communication
//!
//! The matrix exposes a single proprietary endpoint, `/cgi-bin/instr`, which
//! accepts a JSON command object via POST and answers with a JSON object
//! echoing the command's `comhead`. This crate only moves bytes: it knows
//! nothing about command kinds, caching or retries.

mod error;

pub use error::InstrError;

use serde_json::Value;
use std::time::Duration;

/// Path of the command endpoint on every matrix
pub const INSTR_PATH: &str = "/cgi-bin/instr";

/// Default timeout applied to each request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// A minimal JSON client for the matrix command endpoint
#[derive(Debug, Clone)]
pub struct InstrClient {
    agent: ureq::Agent,
}

impl InstrClient {
    /// Create a new client with the default 5 second timeout
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    /// POST `body` to `http://{host}/cgi-bin/instr` and return the parsed JSON reply
    ///
    /// Exactly one request is issued. Anything other than an HTTP 200 carrying
    /// a JSON body is reported as an error.
    pub fn call(&self, host: &str, body: &Value) -> Result<Value, InstrError> {
        let url = instr_url(host);

        let response = self
            .agent
            .post(&url)
            .set("Accept", "application/json")
            .send_json(body)
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => InstrError::Status(code),
                ureq::Error::Transport(t) => InstrError::Network(t.to_string()),
            })?;

        if response.status() != 200 {
            return Err(InstrError::Status(response.status()));
        }

        let text = response
            .into_string()
            .map_err(|e| InstrError::Network(e.to_string()))?;

        serde_json::from_str(&text).map_err(|e| InstrError::Parse(e.to_string()))
    }
}

impl Default for InstrClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the endpoint URL for a host (which may carry a `:port` suffix)
pub fn instr_url(host: &str) -> String {
    format!("http://{}{}", host, INSTR_PATH)
}
