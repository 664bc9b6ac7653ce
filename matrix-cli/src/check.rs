//! Live smoke test of the three status documents
//!
//! Sends each status query once, straight through the transport with no
//! cache, retry or validation in between, and reports which required fields
//! the matrix left out.

use orei_api::{missing_fields, Command, CommandKind, Transport};

/// Result of probing one status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub kind: CommandKind,
    pub problems: Vec<String>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.problems.is_empty()
    }
}

const STATUS_QUERIES: [Command; 3] = [
    Command::GetVideoStatus,
    Command::GetOutputStatus,
    Command::GetInputStatus,
];

pub fn run_check(transport: &dyn Transport, host: &str) -> Vec<CheckOutcome> {
    STATUS_QUERIES
        .iter()
        .map(|command| check_one(transport, host, command))
        .collect()
}

fn check_one(transport: &dyn Transport, host: &str, command: &Command) -> CheckOutcome {
    let kind = command.kind();

    let response = match transport.send(host, command) {
        Ok(response) => response,
        Err(e) => {
            return CheckOutcome {
                kind,
                problems: vec![format!("request failed: {}", e)],
            }
        }
    };
    tracing::info!("{}: {}", kind, response.clone().into_value());

    let mut problems = Vec::new();
    match response.comhead() {
        Some(comhead) if comhead.contains(kind.comhead()) => {}
        Some(comhead) => problems.push(format!("unexpected comhead '{}'", comhead)),
        None => problems.push("field 'comhead' not found".to_string()),
    }
    problems.extend(
        missing_fields(kind, &response)
            .into_iter()
            .map(|field| format!("field '{}' not found", field)),
    );

    CheckOutcome { kind, problems }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orei_api::testing::{FakeMatrix, ScriptedTransport};
    use serde_json::json;

    #[test]
    fn test_healthy_matrix_passes() {
        let fake = FakeMatrix::new(&["A", "B"], &["Z1", "Z2"]);
        let outcomes = run_check(&fake, "matrix");

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(CheckOutcome::passed));
        assert_eq!(fake.log().count(), 3);
    }

    #[test]
    fn test_reports_missing_fields() {
        let fake = FakeMatrix::new(&["A"], &["Z1"]);
        fake.remove_field(CommandKind::GetOutputStatus, "allhdcp");
        fake.remove_field(CommandKind::GetOutputStatus, "name");

        let outcomes = run_check(&fake, "matrix");
        assert!(outcomes[0].passed());
        assert_eq!(
            outcomes[1].problems,
            vec!["field 'allhdcp' not found", "field 'name' not found"]
        );
        assert!(outcomes[2].passed());
    }

    #[test]
    fn test_reports_transport_failure_and_wrong_comhead() {
        let transport = ScriptedTransport::new()
            .then_fail("connection refused")
            .then_ok(json!({"comhead": "get video status"}))
            .then_ok(json!({"edid": [], "inactive": [], "inname": [], "power": 0}));

        let outcomes = run_check(&transport, "matrix");
        assert!(outcomes[0].problems[0].starts_with("request failed"));
        assert!(outcomes[1].problems[0].contains("unexpected comhead"));
        assert_eq!(outcomes[2].problems, vec!["field 'comhead' not found"]);
    }
}
