//! MatrixSystem - entry point for zone-level control
//!
//! Connects to one matrix, discovers its inputs and outputs from the video
//! status document, and hands out one [`Zone`] per output.

use std::sync::Arc;

use orei_api::MatrixClient;

use crate::error::{MatrixError, Result};
use crate::service::ServiceCall;
use crate::zone::{PowerState, SourceMap, Zone, ALL_OUTPUTS_ZONE_ID};

/// Default prefix of zone display names
pub const DEFAULT_NAME_PREFIX: &str = "OREI HDMI Matrix Zone";

/// Display name of the synthetic all-outputs zone
pub const ALL_OUTPUTS_NAME: &str = "All Outputs";

/// Setup options for [`MatrixSystem::connect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemConfig {
    /// Zones are named `"{name_prefix} - {output name}"`
    pub name_prefix: String,
    /// Add zone 9, which addresses every output at once
    pub include_all_outputs_zone: bool,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            include_all_outputs_zone: false,
        }
    }
}

impl SystemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.name_prefix = prefix.into();
        self
    }

    pub fn with_all_outputs_zone(mut self, include: bool) -> Self {
        self.include_all_outputs_zone = include;
        self
    }
}

/// One matrix and its zones
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use orei_api::MatrixClient;
/// use orei_matrix::{MatrixSystem, SystemConfig};
///
/// let client = Arc::new(MatrixClient::new());
/// let system = MatrixSystem::connect("192.168.1.131", SystemConfig::default(), client)?;
///
/// system.refresh_all();
/// for zone in system.zones() {
///     println!("{}: {:?}", zone.name(), zone.source());
/// }
///
/// if let Some(zone) = system.zone(1) {
///     zone.select_source("Apple TV")?;
/// }
/// # Ok::<(), orei_matrix::MatrixError>(())
/// ```
#[derive(Debug)]
pub struct MatrixSystem {
    host: String,
    client: Arc<MatrixClient>,
    sources: SourceMap,
    zones: Vec<Arc<Zone>>,
}

impl MatrixSystem {
    /// Read the matrix layout and create its zones
    ///
    /// Fails with [`MatrixError::Unreachable`] if the video status cannot be
    /// fetched. Zones start in [`PowerState::Unknown`] until refreshed.
    pub fn connect(
        host: impl Into<String>,
        config: SystemConfig,
        client: Arc<MatrixClient>,
    ) -> Result<Self> {
        let host = host.into();

        let video = client.get_video_status(&host).map_err(|e| {
            tracing::error!("Failed to setup, unable to contact host at {}: {}", host, e);
            MatrixError::Unreachable(host.clone())
        })?;

        let sources = SourceMap::from_names(video.allinputname.iter().cloned());

        let mut zones: Vec<Arc<Zone>> = (1..=u8::MAX)
            .zip(video.alloutputname.iter())
            .map(|(zone_id, output_name)| {
                tracing::info!("Adding zone {} - {}", zone_id, output_name);
                Arc::new(Zone::new(
                    host.clone(),
                    zone_id,
                    format!("{} - {}", config.name_prefix, output_name),
                    sources.clone(),
                    Arc::clone(&client),
                ))
            })
            .collect();

        if config.include_all_outputs_zone {
            tracing::info!("Adding zone {} - {}", ALL_OUTPUTS_ZONE_ID, ALL_OUTPUTS_NAME);
            zones.push(Arc::new(Zone::new(
                host.clone(),
                ALL_OUTPUTS_ZONE_ID,
                format!("{} - {}", config.name_prefix, ALL_OUTPUTS_NAME),
                sources.clone(),
                Arc::clone(&client),
            )));
        }

        Ok(Self {
            host,
            client,
            sources,
            zones,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn client(&self) -> &Arc<MatrixClient> {
        &self.client
    }

    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    /// Zones ordered by id
    pub fn zones(&self) -> &[Arc<Zone>] {
        &self.zones
    }

    pub fn zone(&self, zone_id: u8) -> Option<Arc<Zone>> {
        self.zones.iter().find(|z| z.zone_id() == zone_id).cloned()
    }

    pub fn zone_by_unique_id(&self, unique_id: &str) -> Option<Arc<Zone>> {
        self.zones
            .iter()
            .find(|z| z.unique_id() == unique_id)
            .cloned()
    }

    pub fn zone_by_name(&self, name: &str) -> Option<Arc<Zone>> {
        self.zones.iter().find(|z| z.name() == name).cloned()
    }

    /// Refresh every zone, returning how many are on
    pub fn refresh_all(&self) -> usize {
        self.zones
            .iter()
            .map(|zone| zone.update())
            .filter(|state| *state == PowerState::On)
            .count()
    }

    /// Apply a service call to the addressed zones
    ///
    /// `targets` are zone unique ids; `None` addresses every zone. Unknown
    /// targets are skipped, but a call that matches no zone at all fails with
    /// [`MatrixError::ZoneNotFound`]. Per-zone failures are logged and do not
    /// stop the remaining zones. Returns the number of zones that accepted
    /// the call.
    pub fn dispatch(&self, call: &ServiceCall, targets: Option<&[String]>) -> Result<usize> {
        let zones = self.resolve_targets(targets)?;
        tracing::debug!("Dispatching {} to {} zone(s)", call.name(), zones.len());

        let accepted = zones
            .iter()
            .filter(|zone| match call.apply(zone) {
                Ok(_) => true,
                Err(e) => {
                    tracing::debug!("{} skipped on {}: {}", call.name(), zone.unique_id(), e);
                    false
                }
            })
            .count();

        Ok(accepted)
    }

    fn resolve_targets(&self, targets: Option<&[String]>) -> Result<Vec<Arc<Zone>>> {
        let Some(targets) = targets else {
            return Ok(self.zones.clone());
        };

        let mut zones = Vec::with_capacity(targets.len());
        for target in targets {
            match self.zone_by_unique_id(target) {
                Some(zone) => zones.push(zone),
                None => tracing::warn!("Ignoring unknown zone '{}'", target),
            }
        }

        if zones.is_empty() {
            return Err(MatrixError::ZoneNotFound(targets.join(", ")));
        }
        Ok(zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orei_api::testing::{FakeMatrix, ScriptedTransport};
    use orei_api::{ClientConfig, CommandKind, RetryPolicy};
    use serde_json::json;
    use std::time::Duration;

    fn config() -> ClientConfig {
        ClientConfig::new().with_retry(RetryPolicy::fixed(2, Duration::from_millis(1)))
    }

    fn connect(fake: &Arc<FakeMatrix>, system_config: SystemConfig) -> MatrixSystem {
        let client = Arc::new(MatrixClient::with_transport(Arc::clone(fake), config()));
        MatrixSystem::connect("10.0.0.5", system_config, client).unwrap()
    }

    #[test]
    fn test_connect_builds_zones_from_outputs() {
        let fake = Arc::new(FakeMatrix::new(&["Apple TV", "Xbox"], &["Living Room", "Den"]));
        let system = connect(&fake, SystemConfig::default());

        assert_eq!(system.zones().len(), 2);
        let names: Vec<&str> = system.zones().iter().map(|z| z.name()).collect();
        assert_eq!(
            names,
            vec!["OREI HDMI Matrix Zone - Living Room", "OREI HDMI Matrix Zone - Den"]
        );
        assert_eq!(system.sources().names(), ["Apple TV", "Xbox"]);
        assert_eq!(system.zone(2).unwrap().unique_id(), "10.0.0.5-2");
        assert!(system.zone(3).is_none());
        assert!(system.zones().iter().all(|z| z.state() == PowerState::Unknown));
    }

    #[test]
    fn test_connect_with_all_outputs_zone() {
        let fake = Arc::new(FakeMatrix::new(&["A"], &["Z1", "Z2"]));
        let config = SystemConfig::new()
            .with_name_prefix("Matrix")
            .with_all_outputs_zone(true);
        let system = connect(&fake, config);

        assert_eq!(system.zones().len(), 3);
        let all = system.zone(ALL_OUTPUTS_ZONE_ID).unwrap();
        assert_eq!(all.name(), "Matrix - All Outputs");
        assert!(all.is_all_outputs());
        assert!(system.zone_by_name("Matrix - Z2").is_some());
    }

    #[test]
    fn test_connect_unreachable() {
        let client = Arc::new(MatrixClient::with_transport(ScriptedTransport::new(), config()));
        let result = MatrixSystem::connect("10.0.0.9", SystemConfig::default(), client);
        assert!(matches!(result, Err(MatrixError::Unreachable(host)) if host == "10.0.0.9"));
    }

    #[test]
    fn test_refresh_all_counts_zones_on() {
        let fake = Arc::new(FakeMatrix::new(&["A", "B"], &["Z1", "Z2"]));
        fake.set_field(CommandKind::GetVideoStatus, "allsource", json!([2, 1]));
        let system = connect(&fake, SystemConfig::default());
        system.client().clear_cache();

        assert_eq!(system.refresh_all(), 2);
        assert_eq!(system.zone(1).unwrap().source(), Some("B".to_string()));
        assert_eq!(system.zone(2).unwrap().source(), Some("A".to_string()));

        fake.set_offline(true);
        system.client().clear_cache();
        assert_eq!(system.refresh_all(), 0);
        assert_eq!(system.zone(1).unwrap().source(), Some("B".to_string()));
    }

    #[test]
    fn test_dispatch_to_all_zones() {
        let fake = Arc::new(FakeMatrix::new(&["A", "B"], &["Z1", "Z2"]));
        let system = connect(&fake, SystemConfig::default());

        let call = ServiceCall::SetZone {
            source: "B".to_string(),
        };
        assert_eq!(system.dispatch(&call, None).unwrap(), 2);
        assert_eq!(fake.field(CommandKind::GetVideoStatus, "allsource"), json!([2, 2]));
    }

    #[test]
    fn test_dispatch_to_targets() {
        let fake = Arc::new(FakeMatrix::new(&["A", "B"], &["Z1", "Z2"]));
        let system = connect(&fake, SystemConfig::default());

        let targets = vec!["10.0.0.5-2".to_string(), "10.0.0.5-7".to_string()];
        let call = ServiceCall::SetArc { on: true };
        assert_eq!(system.dispatch(&call, Some(&targets)).unwrap(), 1);
        assert_eq!(fake.field(CommandKind::GetOutputStatus, "allarc"), json!([0, 1]));
    }

    #[test]
    fn test_dispatch_no_matching_zone() {
        let fake = Arc::new(FakeMatrix::new(&["A"], &["Z1"]));
        let system = connect(&fake, SystemConfig::default());

        let targets = vec!["other-1".to_string()];
        let result = system.dispatch(&ServiceCall::SetTxStream { on: true }, Some(&targets));
        assert!(matches!(result, Err(MatrixError::ZoneNotFound(_))));
    }

    #[test]
    fn test_dispatch_unknown_source_is_ignored() {
        let fake = Arc::new(FakeMatrix::new(&["A"], &["Z1"]));
        let log = fake.log();
        let system = connect(&fake, SystemConfig::default());
        log.clear();

        let call = ServiceCall::SetZone {
            source: "Cable".to_string(),
        };
        assert_eq!(system.dispatch(&call, None).unwrap(), 0);
        assert_eq!(log.count(), 0);
    }
}
