//! Transport seam between the client and the network

use instr_client::InstrClient;

use crate::command::Command;
use crate::error::Result;
use crate::response::Response;

/// Sends one command to one host and returns the parsed reply
///
/// Implementations issue exactly one request per call and never retry;
/// retrying, caching and validation belong to [`crate::MatrixClient`].
pub trait Transport: Send + Sync {
    fn send(&self, host: &str, command: &Command) -> Result<Response>;
}

impl Transport for InstrClient {
    fn send(&self, host: &str, command: &Command) -> Result<Response> {
        let value = self.call(host, &command.to_body())?;
        Response::from_value(value)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, host: &str, command: &Command) -> Result<Response> {
        (**self).send(host, command)
    }
}
