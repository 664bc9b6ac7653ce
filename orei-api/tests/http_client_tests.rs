//! End-to-end tests of `MatrixClient` over HTTP against a mock matrix

use mockito::{Matcher, Server};
use serde_json::json;
use std::time::Duration;

use orei_api::{ApiError, ClientConfig, MatrixClient, RetryPolicy, ScalerMode};

fn client() -> MatrixClient {
    let config = ClientConfig::new()
        .with_request_timeout(Duration::from_secs(2))
        .with_retry(RetryPolicy::fixed(3, Duration::from_millis(5)));
    MatrixClient::with_config(config).unwrap()
}

#[test]
fn test_video_status_fetched_once_and_cached() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/cgi-bin/instr")
        .match_body(Matcher::PartialJson(json!({"comhead": "get video status"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "comhead": "get video status",
                "allsource": [2, 1],
                "allinputname": ["A", "B"],
                "alloutputname": ["Z1", "Z2"]
            })
            .to_string(),
        )
        .expect(1)
        .create();

    let client = client();
    let host = server.host_with_port();

    let status = client.get_video_status(&host).unwrap();
    assert_eq!(status.allsource, vec![2, 1]);
    assert_eq!(status.allinputname, vec!["A", "B"]);

    let again = client.get_video_status(&host).unwrap();
    assert_eq!(status, again);
    mock.assert();
}

#[test]
fn test_status_retried_then_unavailable() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/cgi-bin/instr")
        .with_status(503)
        .expect(3)
        .create();

    let client = client();
    let result = client.get_input_status(&server.host_with_port());

    assert!(matches!(result, Err(ApiError::Unavailable { attempts: 3, .. })));
    mock.assert();
}

#[test]
fn test_scaler_command_body() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/cgi-bin/instr")
        .match_body(Matcher::Json(json!({
            "comhead": "video scaler",
            "scaler": [2, 3],
            "language": 0
        })))
        .with_status(200)
        .with_body(r#"{"comhead":"video scaler","result":1}"#)
        .expect(1)
        .create();

    let client = client();
    let ack = client
        .video_scaler(&server.host_with_port(), 2, ScalerMode::Auto)
        .unwrap();

    assert!(ack.is_success());
    mock.assert();
}

#[test]
fn test_failed_mutation_is_not_retried() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/cgi-bin/instr")
        .with_status(500)
        .expect(1)
        .create();

    let client = client();
    let result = client.tx_stream(&server.host_with_port(), 1, false);

    assert!(matches!(result, Err(ApiError::HttpStatus(500))));
    mock.assert();
}
