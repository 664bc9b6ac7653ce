use parking_lot::Mutex;
use std::fmt;
use std::thread;

use instr_client::InstrClient;

use crate::cache::CommandCache;
use crate::command::{Command, CEC_PORT_COUNT};
use crate::config::ClientConfig;
use crate::modes::{EdidMode, InputCecCommand, OutputCecCommand, ScalerMode};
use crate::response::{Ack, InputStatus, OutputStatus, Response, StatusDocument, VideoStatus};
use crate::transport::Transport;
use crate::validate::rejection_reason;
use crate::{ApiError, Result};

/// A client for executing matrix commands against actual devices
///
/// Every call names its target host, so one client can serve several
/// matrices; cached replies are keyed by host and never leak between them.
///
/// Status queries (`get_*_status`) are served from a short-lived cache when
/// possible and otherwise retried until a reply validates. Mutating commands
/// bypass the cache and are attempted exactly once.
///
/// All device calls made through one client are serialized by a single lock
/// that covers the cache lookup, the network round trip(s) and the cache
/// store. Share the client behind an `Arc` rather than creating one per zone.
///
/// # Example
///
/// ```rust,no_run
/// use orei_api::{MatrixClient, ScalerMode};
///
/// let client = MatrixClient::new();
/// let status = client.get_video_status("192.168.1.131")?;
/// println!("output 1 shows input {}", status.allsource[0]);
///
/// client.video_switch("192.168.1.131", 2, 1)?;
/// client.video_scaler("192.168.1.131", 1, ScalerMode::Auto)?;
/// # Ok::<(), orei_api::ApiError>(())
/// ```
pub struct MatrixClient {
    transport: Box<dyn Transport>,
    config: ClientConfig,
    cache: Mutex<CommandCache>,
}

impl MatrixClient {
    /// Create a client with the default configuration over HTTP
    pub fn new() -> Self {
        let config = ClientConfig::default();
        Self::with_transport(InstrClient::with_timeout(config.request_timeout), config)
    }

    /// Create an HTTP client with a custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_transport(
            InstrClient::with_timeout(config.request_timeout),
            config,
        ))
    }

    /// Create a client over a custom transport
    ///
    /// `config.request_timeout` is not applied; the transport owns its timeouts.
    pub fn with_transport<T: Transport + 'static>(transport: T, config: ClientConfig) -> Self {
        let cache = CommandCache::new(config.cache_ttl);
        Self {
            transport: Box::new(transport),
            config,
            cache: Mutex::new(cache),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of cached replies, fresh or not yet evicted
    pub fn cached_entries(&self) -> usize {
        self.cache.lock().len()
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
    }

    // ========================================================================
    // Status queries
    // ========================================================================

    /// Routing and port names
    pub fn get_video_status(&self, host: &str) -> Result<VideoStatus> {
        self.query(host)
    }

    /// Per-output scaler, HDCP, stream, connection and ARC state
    pub fn get_output_status(&self, host: &str) -> Result<OutputStatus> {
        self.query(host)
    }

    /// Per-input EDID, activity and names
    pub fn get_input_status(&self, host: &str) -> Result<InputStatus> {
        self.query(host)
    }

    // ========================================================================
    // Mutating commands
    // ========================================================================

    /// Route `input` to `output`
    pub fn video_switch(&self, host: &str, input: u8, output: u8) -> Result<Ack> {
        self.mutate(host, Command::VideoSwitch { input, output })
    }

    /// Enable or disable the TX stream of `output`
    pub fn tx_stream(&self, host: &str, output: u8, on: bool) -> Result<Ack> {
        self.mutate(host, Command::TxStream { output, on })
    }

    /// Enable or disable Audio Return Channel on `output`
    pub fn set_arc(&self, host: &str, output: u8, on: bool) -> Result<Ack> {
        self.mutate(host, Command::SetArc { output, on })
    }

    pub fn video_scaler(&self, host: &str, output: u8, mode: ScalerMode) -> Result<Ack> {
        self.mutate(host, Command::VideoScaler { output, mode })
    }

    /// Assign an EDID preset to `input`
    pub fn set_input_edid(&self, host: &str, input: u8, mode: EdidMode) -> Result<Ack> {
        self.mutate(host, Command::SetEdid { input, mode })
    }

    /// Send a CEC command to the output in slot `port` (0..8) of the port vector
    pub fn output_cec_command(&self, host: &str, port: u8, command: OutputCecCommand) -> Result<Ack> {
        check_cec_port(port)?;
        self.mutate(host, Command::output_cec(port, command))
    }

    /// Send a CEC command to the input in slot `port` (0..8) of the port vector
    pub fn input_cec_command(&self, host: &str, port: u8, command: InputCecCommand) -> Result<Ack> {
        check_cec_port(port)?;
        self.mutate(host, Command::input_cec(port, command))
    }

    /// Execute any command and return the validated raw reply
    ///
    /// Status queries go through the cache and retry loop exactly like the
    /// typed getters; mutating commands are sent once.
    pub fn execute(&self, host: &str, command: &Command) -> Result<Response> {
        let kind = command.kind();
        let mut cache = self.cache.lock();

        if !kind.is_cacheable() {
            return self.attempt(host, command);
        }

        if let Some(cached) = cache.get(host, kind) {
            tracing::debug!("Cache hit: '{}' on {}", kind, host);
            return Ok(cached);
        }
        tracing::debug!("Cache miss: '{}' on {}", kind, host);

        let (response, ()) = self.fetch_with_retry(host, command, |_| Ok(()))?;
        cache.put(host, kind, &response);
        Ok(response)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn query<T: StatusDocument>(&self, host: &str) -> Result<T> {
        let kind = T::KIND;
        let mut cache = self.cache.lock();

        if let Some(cached) = cache.get(host, kind) {
            match cached.decode::<T>() {
                Ok(document) => {
                    tracing::debug!("Cache hit: '{}' on {}", kind, host);
                    return Ok(document);
                }
                Err(e) => tracing::warn!("Discarding undecodable cache entry for '{}': {}", kind, e),
            }
        }
        tracing::debug!("Cache miss: '{}' on {}", kind, host);

        let (response, document) = self.fetch_with_retry(host, &T::command(), Response::decode::<T>)?;
        cache.put(host, kind, &response);
        Ok(document)
    }

    /// Single attempt of a mutating command
    fn mutate(&self, host: &str, command: Command) -> Result<Ack> {
        let _guard = self.cache.lock();
        tracing::debug!("Sending '{}' to {}: {}", command.kind(), host, command.to_body());
        let response = self.attempt(host, &command)?;
        Ok(Ack::from_response(&response))
    }

    /// Try a status query until a reply validates and decodes
    ///
    /// Sleeps `retry.delay` between attempts. Must be called with the device
    /// lock held.
    fn fetch_with_retry<T>(
        &self,
        host: &str,
        command: &Command,
        decode: impl Fn(&Response) -> Result<T>,
    ) -> Result<(Response, T)> {
        let kind = command.kind();
        let attempts = self.config.retry.max_attempts.max(1);

        for attempt in 1..=attempts {
            if let Ok(response) = self.attempt(host, command) {
                match decode(&response) {
                    Ok(document) => return Ok((response, document)),
                    Err(e) => tracing::error!(
                        "Unusable '{}' reply from {}: {}: '{}'",
                        kind,
                        host,
                        e,
                        response.clone().into_value()
                    ),
                }
            }

            let delay = self.config.retry.delay_after(attempt);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }

        tracing::warn!("Giving up on '{}' to {} after {} attempts", kind, host, attempts);
        Err(ApiError::Unavailable {
            host: host.to_string(),
            comhead: kind.comhead().to_string(),
            attempts,
        })
    }

    /// One transport round trip plus shape validation
    fn attempt(&self, host: &str, command: &Command) -> Result<Response> {
        let kind = command.kind();

        let response = self.transport.send(host, command).map_err(|e| {
            tracing::error!("Error connecting to the HDMI matrix at {}: {}", host, e);
            e
        })?;

        if let Some(reason) = rejection_reason(kind, Some(&response)) {
            tracing::error!(
                "Invalid data from device for cmd '{}': '{}': {}",
                command.to_body(),
                response.clone().into_value(),
                reason
            );
            return Err(ApiError::InvalidResponse {
                comhead: kind.comhead().to_string(),
                reason,
            });
        }

        Ok(response)
    }
}

impl Default for MatrixClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MatrixClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixClient")
            .field("config", &self.config)
            .field("cached_entries", &self.cache.try_lock().map(|cache| cache.len()))
            .finish_non_exhaustive()
    }
}

fn check_cec_port(port: u8) -> Result<()> {
    if usize::from(port) >= CEC_PORT_COUNT {
        return Err(ApiError::InvalidParameter(format!(
            "CEC port {} is outside 0..{}",
            port, CEC_PORT_COUNT
        )));
    }
    Ok(())
}
