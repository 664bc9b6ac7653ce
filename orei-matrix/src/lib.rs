//! Zone-level control of OREI HDMI matrix switches
//!
//! [`MatrixSystem`] connects to a matrix and exposes each output as a
//! [`Zone`]: the routed source, scaler/ARC/stream/HDCP state of the output,
//! and EDID/activity of the routed input, refreshed on demand from the
//! device.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use orei_api::MatrixClient;
//! use orei_matrix::{MatrixSystem, ServiceCall, SystemConfig};
//! use serde_json::json;
//!
//! let client = Arc::new(MatrixClient::new());
//! let system = MatrixSystem::connect("192.168.1.131", SystemConfig::default(), client)?;
//!
//! let call = ServiceCall::from_service("hdmi_matrix_set_zone", &json!({"source": "Xbox"}))?;
//! system.dispatch(&call, None)?;
//! # Ok::<(), orei_matrix::MatrixError>(())
//! ```
//!
//! Nothing here spawns threads; refresh scheduling is up to the caller.

mod error;
pub mod logging;
pub mod service;
mod system;
mod zone;

pub use error::{MatrixError, Result};
pub use service::ServiceCall;
pub use system::{MatrixSystem, SystemConfig, ALL_OUTPUTS_NAME, DEFAULT_NAME_PREFIX};
pub use zone::{PowerState, SourceMap, Zone, ZoneAttributes, ZoneState, ALL_OUTPUTS_ZONE_ID};

pub use orei_api;
