//! Typed API for OREI HDMI matrix switches
//!
//! This crate speaks the matrix's JSON-over-HTTP protocol (`POST /cgi-bin/instr`)
//! through the private `instr-client` crate and adds what the raw protocol
//! lacks: typed commands and replies, shape validation, a short-lived cache of
//! status replies, and retrying of status queries.
//!
//! ```rust,no_run
//! use orei_api::{MatrixClient, EdidMode};
//!
//! let client = MatrixClient::new();
//!
//! let outputs = client.get_output_status("192.168.1.131")?;
//! for (idx, name) in outputs.name.iter().enumerate() {
//!     println!("{}: input {}", name, outputs.allsource[idx]);
//! }
//!
//! client.set_input_edid("192.168.1.131", 1, EdidMode::Edid4k2k60444HdAudio71Hdr)?;
//! # Ok::<(), orei_api::ApiError>(())
//! ```
//!
//! Status queries are answered from the cache for five seconds after a
//! validated reply. Pass a custom [`Transport`] to
//! [`MatrixClient::with_transport`] to run against something other than HTTP.

pub mod cache;
pub mod client;
pub mod command;
pub mod config;
pub mod error;
pub mod modes;
pub mod response;
pub mod transport;
pub mod validate;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use cache::CommandCache;
pub use client::MatrixClient;
pub use command::{CecTarget, Command, CommandKind, CEC_PORT_COUNT};
pub use config::{ClientConfig, RetryPolicy};
pub use error::{ApiError, Result};
pub use modes::{EdidMode, InputCecCommand, OutputCecCommand, ScalerMode};
pub use response::{Ack, InputStatus, OutputStatus, Response, StatusDocument, VideoStatus};
pub use transport::Transport;
pub use validate::{missing_fields, validate};
