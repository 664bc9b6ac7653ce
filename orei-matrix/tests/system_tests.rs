//! End-to-end zone scenarios against a fake matrix

use proptest::prelude::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use orei_api::testing::{FakeMatrix, ScriptedTransport};
use orei_api::{ClientConfig, CommandKind, EdidMode, MatrixClient, RetryPolicy, ScalerMode};
use orei_matrix::{MatrixSystem, PowerState, ServiceCall, SystemConfig};

// ============================================================================
// Test Helpers
// ============================================================================

fn fast_config() -> ClientConfig {
    ClientConfig::new().with_retry(RetryPolicy::fixed(5, Duration::from_millis(2)))
}

fn system_on(fake: &Arc<FakeMatrix>) -> MatrixSystem {
    let client = Arc::new(MatrixClient::with_transport(Arc::clone(fake), fast_config()));
    MatrixSystem::connect("192.168.1.131", SystemConfig::default(), client).unwrap()
}

fn video_status(sources: &[u8]) -> serde_json::Value {
    json!({
        "comhead": "get video status",
        "allsource": sources,
        "allinputname": ["A", "B"],
        "alloutputname": ["Z1", "Z2"]
    })
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_zone_one_follows_video_status() {
    let transport = ScriptedTransport::new()
        .then_ok(video_status(&[2, 1]))
        .then_ok(json!({
            "comhead": "get output status",
            "allsource": [2, 1],
            "allscaler": [3, 0],
            "allhdcp": [1, 0],
            "allout": [1, 1],
            "allconnect": [1, 0],
            "allarc": [0, 0],
            "name": ["Z1", "Z2"]
        }))
        .then_ok(json!({
            "comhead": "get input status",
            "edid": [0, 4],
            "inactive": [0, 1],
            "inname": ["A", "B"],
            "power": 1
        }));
    let log = transport.log();
    let client = Arc::new(MatrixClient::with_transport(transport, fast_config()));
    let system = MatrixSystem::connect("matrix", SystemConfig::default(), client).unwrap();

    let zone = system.zone(1).unwrap();
    assert_eq!(zone.update(), PowerState::On);
    assert_eq!(zone.source(), Some("B".to_string()));

    let attrs = zone.attributes();
    assert_eq!(attrs.scaler_mode, Some(ScalerMode::Auto));
    assert_eq!(attrs.input_edid, Some(EdidMode::Edid1080iDolbyDts51));
    assert_eq!(attrs.input_active, Some(true));

    // connect and the refresh share one video status fetch
    assert_eq!(log.count(), 3);
    assert_eq!(log.count_kind(CommandKind::GetVideoStatus), 1);
}

#[test]
fn test_switch_then_refresh() {
    let fake = Arc::new(FakeMatrix::new(&["Apple TV", "Xbox", "PC"], &["Den", "Bar"]));
    let system = system_on(&fake);
    system.refresh_all();
    assert_eq!(system.zone(2).unwrap().source(), Some("Apple TV".to_string()));

    let targets = vec!["192.168.1.131-2".to_string()];
    let call = ServiceCall::from_service("hdmi_matrix_set_zone", &json!({"source": "PC"})).unwrap();
    assert_eq!(system.dispatch(&call, Some(&targets)).unwrap(), 1);

    system.client().clear_cache();
    system.refresh_all();
    assert_eq!(system.zone(1).unwrap().source(), Some("Apple TV".to_string()));
    assert_eq!(system.zone(2).unwrap().source(), Some("PC".to_string()));
}

#[test]
fn test_edid_service_applies_to_routed_input() {
    let fake = Arc::new(FakeMatrix::new(&["A", "B", "C"], &["Z1"]));
    fake.set_field(CommandKind::GetVideoStatus, "allsource", json!([3]));
    let system = system_on(&fake);
    system.refresh_all();

    let call = ServiceCall::from_service(
        "hdmi_matrix_set_input_edid",
        &json!({"input_edid": "4K2K60_444, Stereo Audio 2.0 HDR"}),
    )
    .unwrap();
    assert_eq!(system.dispatch(&call, None).unwrap(), 1);
    assert_eq!(fake.field(CommandKind::GetInputStatus, "edid"), json!([0, 0, 18]));

    system.client().clear_cache();
    system.refresh_all();
    assert_eq!(
        system.zone(1).unwrap().attributes().input_edid,
        Some(EdidMode::Edid4k2k60444StereoAudio20Hdr)
    );
}

#[test]
fn test_outage_marks_unknown_and_recovers() {
    let fake = Arc::new(FakeMatrix::new(&["A", "B"], &["Z1", "Z2"]));
    fake.set_field(CommandKind::GetVideoStatus, "allsource", json!([2, 2]));
    let system = system_on(&fake);
    system.client().clear_cache();
    assert_eq!(system.refresh_all(), 2);

    fake.set_offline(true);
    system.client().clear_cache();
    assert_eq!(system.refresh_all(), 0);
    let zone = system.zone(1).unwrap();
    assert_eq!(zone.state(), PowerState::Unknown);
    assert_eq!(zone.source(), Some("B".to_string()));
    assert_eq!(zone.extra_attributes()["stream"], "on");

    fake.set_offline(false);
    assert_eq!(system.refresh_all(), 2);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Every zone shows the name of the input routed to it, or nothing when
    /// the routed id has no name
    #[test]
    fn prop_zone_source_matches_routing(routing in prop::collection::vec(1u8..=6, 1..=8)) {
        let inputs = ["I1", "I2", "I3", "I4"];
        let outputs: Vec<String> = (1..=routing.len()).map(|i| format!("O{}", i)).collect();
        let output_refs: Vec<&str> = outputs.iter().map(String::as_str).collect();

        let fake = Arc::new(FakeMatrix::new(&inputs, &output_refs));
        fake.set_field(CommandKind::GetVideoStatus, "allsource", json!(routing));
        let system = system_on(&fake);

        prop_assert_eq!(system.refresh_all(), routing.len());
        for (idx, input) in routing.iter().enumerate() {
            let zone = system.zone(idx as u8 + 1).unwrap();
            let expected = inputs.get(usize::from(*input) - 1).map(|name| name.to_string());
            prop_assert_eq!(zone.source(), expected);
        }
    }
}
