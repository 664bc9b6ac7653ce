//! Zone handle with aggregated state
//!
//! A zone is one output of the matrix. Its state is rebuilt on every
//! [`Zone::update`] from the three status documents the matrix serves; the
//! shared client's cache makes refreshing several zones in a row cost one
//! round trip per document.

use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use orei_api::{
    Ack, EdidMode, InputCecCommand, InputStatus, MatrixClient, OutputCecCommand, OutputStatus,
    ScalerMode, VideoStatus,
};

use crate::error::{MatrixError, Result};

/// Id of the synthetic zone that addresses every output at once
pub const ALL_OUTPUTS_ZONE_ID: u8 = 9;

/// Source ids and names, fixed when the zone is created
///
/// Ids are the matrix's 1-based input numbers. If two inputs share a name,
/// the name resolves to the higher id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceMap {
    id_name: BTreeMap<u8, String>,
    name_id: HashMap<String, u8>,
    names: Vec<String>,
}

impl SourceMap {
    /// Number the names from 1 in the order given
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id_name: BTreeMap<u8, String> = (1..=u8::MAX)
            .zip(names.into_iter().map(Into::into))
            .collect();

        let name_id: HashMap<String, u8> = id_name
            .iter()
            .map(|(id, name)| (name.clone(), *id))
            .collect();

        let mut ordered: Vec<(&String, &u8)> = name_id.iter().collect();
        ordered.sort_by_key(|(_, id)| **id);
        let names = ordered.into_iter().map(|(name, _)| name.clone()).collect();

        Self {
            id_name,
            name_id,
            names,
        }
    }

    pub fn name(&self, id: u8) -> Option<&str> {
        self.id_name.get(&id).map(String::as_str)
    }

    pub fn id(&self, name: &str) -> Option<u8> {
        self.name_id.get(name).copied()
    }

    /// Source names ordered by id
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.id_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_name.is_empty()
    }
}

/// Power state as far as the matrix reports it
///
/// The matrix has no notion of an output being off; a zone is either known
/// to be on or could not be read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PowerState {
    #[default]
    Unknown,
    On,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::Unknown => f.write_str("unknown"),
            PowerState::On => f.write_str("on"),
        }
    }
}

/// Per-zone details read from the output and input status documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoneAttributes {
    pub scaler_mode: Option<ScalerMode>,
    /// TX stream enabled
    pub stream: Option<bool>,
    pub arc: Option<bool>,
    /// A sink is connected to the output
    pub connected: Option<bool>,
    pub hdcp: Option<bool>,
    /// EDID preset of the active source input
    pub input_edid: Option<EdidMode>,
    /// The active source input carries a signal
    pub input_active: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZoneState {
    pub power: PowerState,
    /// 1-based input routed to this zone
    pub source_id: Option<u8>,
    pub attributes: ZoneAttributes,
}

impl ZoneState {
    /// Rebuild routing and attributes from a complete set of status documents
    ///
    /// Indices the documents do not cover leave the affected value absent.
    pub fn apply(
        &mut self,
        zone_id: u8,
        video: &VideoStatus,
        output: &OutputStatus,
        input: &InputStatus,
    ) {
        let zone_idx = usize::from(zone_id).wrapping_sub(1);
        let source_id = video.allsource.get(zone_idx).copied();

        let mut attributes = ZoneAttributes::default();

        if zone_id != ALL_OUTPUTS_ZONE_ID {
            attributes.scaler_mode = output
                .allscaler
                .get(zone_idx)
                .copied()
                .and_then(ScalerMode::from_code);
            attributes.stream = output.allout.get(zone_idx).copied();
            attributes.arc = output.allarc.get(zone_idx).copied();
            attributes.connected = output.allconnect.get(zone_idx).copied();
            attributes.hdcp = output.allhdcp.get(zone_idx).copied();
        }

        if let Some(input_idx) = source_id.and_then(|id| usize::from(id).checked_sub(1)) {
            attributes.input_edid = input
                .edid
                .get(input_idx)
                .copied()
                .and_then(EdidMode::from_device_code);
            attributes.input_active = input.inactive.get(input_idx).copied();
        }

        self.source_id = source_id;
        self.attributes = attributes;
        self.power = PowerState::On;
    }
}

/// One output of the matrix, presented as a controllable unit
///
/// Handles are cheap to share: the client is reference counted and state is
/// behind a lock, so zones are normally held as `Arc<Zone>`.
pub struct Zone {
    host: String,
    zone_id: u8,
    name: String,
    sources: SourceMap,
    client: Arc<MatrixClient>,
    state: RwLock<ZoneState>,
}

impl Zone {
    pub fn new(
        host: impl Into<String>,
        zone_id: u8,
        name: impl Into<String>,
        sources: SourceMap,
        client: Arc<MatrixClient>,
    ) -> Self {
        Self {
            host: host.into(),
            zone_id,
            name: name.into(),
            sources,
            client,
            state: RwLock::new(ZoneState::default()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn zone_id(&self) -> u8 {
        self.zone_id
    }

    /// `"{host}-{zone_id}"`
    pub fn unique_id(&self) -> String {
        format!("{}-{}", self.host, self.zone_id)
    }

    pub fn is_all_outputs(&self) -> bool {
        self.zone_id == ALL_OUTPUTS_ZONE_ID
    }

    pub fn state(&self) -> PowerState {
        self.state.read().power
    }

    /// Copy of the full zone state
    pub fn snapshot(&self) -> ZoneState {
        self.state.read().clone()
    }

    pub fn source_id(&self) -> Option<u8> {
        self.state.read().source_id
    }

    /// Name of the routed source, absent if its id is not in the source map
    pub fn source(&self) -> Option<String> {
        let source_id = self.state.read().source_id?;
        self.sources.name(source_id).map(str::to_string)
    }

    pub fn source_list(&self) -> &[String] {
        self.sources.names()
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn attributes(&self) -> ZoneAttributes {
        self.state.read().attributes
    }

    /// Present attributes as a flat map
    ///
    /// Flags are rendered `"on"`/`"off"`; `input_active` stays a boolean.
    pub fn extra_attributes(&self) -> Map<String, Value> {
        let attrs = self.attributes();
        let mut map = Map::new();

        if let Some(mode) = attrs.scaler_mode {
            map.insert("scaler_mode".to_string(), json!(mode.label()));
        }
        for (key, flag) in [
            ("stream", attrs.stream),
            ("arc", attrs.arc),
            ("connected", attrs.connected),
            ("hdcp", attrs.hdcp),
        ] {
            if let Some(flag) = flag {
                map.insert(key.to_string(), json!(on_off(flag)));
            }
        }
        if let Some(mode) = attrs.input_edid {
            map.insert("input_edid".to_string(), json!(mode.label()));
        }
        if let Some(active) = attrs.input_active {
            map.insert("input_active".to_string(), json!(active));
        }

        map
    }

    /// Retrieve the latest state from the matrix
    ///
    /// If any of the three status documents cannot be fetched the zone
    /// becomes [`PowerState::Unknown`] and keeps its previous source and
    /// attributes.
    pub fn update(&self) -> PowerState {
        match self.fetch_status() {
            Ok((video, output, input)) => {
                let mut state = self.state.write();
                state.apply(self.zone_id, &video, &output, &input);
                tracing::debug!(
                    "Zone {} updated: source {:?}, {:?}",
                    self.zone_id,
                    state.source_id,
                    state.attributes
                );
                state.power
            }
            Err(e) => {
                tracing::warn!("Zone {} on {} could not be refreshed: {}", self.zone_id, self.host, e);
                let mut state = self.state.write();
                state.power = PowerState::Unknown;
                state.power
            }
        }
    }

    fn fetch_status(&self) -> orei_api::Result<(VideoStatus, OutputStatus, InputStatus)> {
        let video = self.client.get_video_status(&self.host)?;
        let output = self.client.get_output_status(&self.host)?;
        let input = self.client.get_input_status(&self.host)?;
        Ok((video, output, input))
    }

    // ========================================================================
    // Mutators
    // ========================================================================

    /// Route the named source to this zone
    pub fn select_source(&self, source: &str) -> Result<Ack> {
        let Some(input) = self.sources.id(source) else {
            tracing::debug!("Zone {}: ignoring unknown source '{}'", self.zone_id, source);
            return Err(MatrixError::UnknownSource(source.to_string()));
        };

        tracing::debug!("Setting zone {} source to {}", self.zone_id, input);
        self.send("video switch", |client, host| client.video_switch(host, input, self.zone_id))
    }

    pub fn set_scaler(&self, mode: ScalerMode) -> Result<Ack> {
        self.send("video scaler", |client, host| client.video_scaler(host, self.zone_id, mode))
    }

    pub fn set_arc(&self, on: bool) -> Result<Ack> {
        self.send("set arc", |client, host| client.set_arc(host, self.zone_id, on))
    }

    pub fn set_tx_stream(&self, on: bool) -> Result<Ack> {
        self.send("tx stream", |client, host| client.tx_stream(host, self.zone_id, on))
    }

    /// Set the EDID preset of the input currently routed to this zone
    pub fn set_input_edid(&self, mode: EdidMode) -> Result<Ack> {
        let input = self.active_source()?;
        self.send("set edid", |client, host| client.set_input_edid(host, input, mode))
    }

    /// CEC command to this zone's output, addressed by its slot in the port vector
    pub fn send_output_cec(&self, command: OutputCecCommand) -> Result<Ack> {
        let port = self.zone_id.saturating_sub(1);
        self.send("output cec", |client, host| client.output_cec_command(host, port, command))
    }

    /// CEC command to the input currently routed to this zone
    pub fn send_input_cec(&self, command: InputCecCommand) -> Result<Ack> {
        let port = self.active_source()?.saturating_sub(1);
        self.send("input cec", |client, host| client.input_cec_command(host, port, command))
    }

    fn active_source(&self) -> Result<u8> {
        self.source_id()
            .ok_or(MatrixError::NoActiveSource(self.zone_id))
    }

    /// Run one mutating call, logging rather than escalating device failures
    fn send<F>(&self, what: &str, op: F) -> Result<Ack>
    where
        F: FnOnce(&MatrixClient, &str) -> orei_api::Result<Ack>,
    {
        match op(&self.client, &self.host) {
            Ok(ack) => {
                if let Some(result) = ack.result.as_ref().filter(|_| !ack.is_success()) {
                    tracing::warn!("Zone {}: '{}' reported result {}", self.zone_id, what, result);
                }
                Ok(ack)
            }
            Err(e) => {
                tracing::warn!("Zone {}: '{}' failed: {}", self.zone_id, what, e);
                Err(e.into())
            }
        }
    }
}

impl fmt::Debug for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zone")
            .field("host", &self.host)
            .field("zone_id", &self.zone_id)
            .field("name", &self.name)
            .field("state", &*self.state.read())
            .finish_non_exhaustive()
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
