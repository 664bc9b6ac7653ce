//! Response-shape validation per command kind
//!
//! A reply is usable only if it is a non-empty object, echoes the `comhead`
//! of the command that was sent, and carries every field the kind requires.
//! A single missing field invalidates the whole reply.

use crate::command::CommandKind;
use crate::response::Response;

/// Decide whether `response` is a well-formed reply to a `kind` command
pub fn validate(kind: CommandKind, response: Option<&Response>) -> bool {
    let Some(response) = response else {
        return false;
    };
    if response.is_empty() {
        return false;
    }

    let mut valid = response.comhead() == Some(kind.comhead());
    for field in kind.required_fields() {
        valid &= response.contains(field);
    }
    valid
}

/// Required fields absent from `response`, for diagnostics
pub fn missing_fields(kind: CommandKind, response: &Response) -> Vec<&'static str> {
    kind.required_fields()
        .iter()
        .copied()
        .filter(|field| !response.contains(field))
        .collect()
}

/// Human-readable reason a reply was rejected, `None` if it validates
pub fn rejection_reason(kind: CommandKind, response: Option<&Response>) -> Option<String> {
    if validate(kind, response) {
        return None;
    }

    let reason = match response {
        None => "no response".to_string(),
        Some(resp) if resp.is_empty() => "empty response".to_string(),
        Some(resp) if resp.comhead() != Some(kind.comhead()) => format!(
            "comhead mismatch: expected '{}', got {:?}",
            kind.comhead(),
            resp.comhead()
        ),
        Some(resp) => format!("missing fields {:?}", missing_fields(kind, resp)),
    };
    Some(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{json, Value};

    fn response(value: Value) -> Response {
        Response::from_value(value).unwrap()
    }

    fn full_output_status() -> Value {
        json!({
            "comhead": "get output status",
            "allsource": [1],
            "allscaler": [0],
            "allhdcp": [1],
            "allout": [1],
            "allconnect": [1],
            "allarc": [0],
            "name": ["TV"]
        })
    }

    #[test]
    fn test_absent_and_empty_are_invalid() {
        assert!(!validate(CommandKind::VideoSwitch, None));
        assert!(!validate(CommandKind::VideoSwitch, Some(&Response::default())));
    }

    #[test]
    fn test_comhead_must_match() {
        let resp = response(json!({"comhead": "set arc", "result": 1}));
        assert!(!validate(CommandKind::VideoSwitch, Some(&resp)));
        assert!(validate(CommandKind::SetArc, Some(&resp)));
    }

    #[test]
    fn test_switch_ack_needs_only_comhead() {
        let resp = response(json!({"comhead": "video switch", "result": 1}));
        assert!(validate(CommandKind::VideoSwitch, Some(&resp)));

        let bare = response(json!({"comhead": "video switch"}));
        assert!(validate(CommandKind::VideoSwitch, Some(&bare)));
    }

    #[test]
    fn test_output_status_missing_hdcp_is_rejected() {
        let mut value = full_output_status();
        assert!(validate(CommandKind::GetOutputStatus, Some(&response(value.clone()))));

        value.as_object_mut().unwrap().remove("allhdcp");
        let resp = response(value);
        assert!(!validate(CommandKind::GetOutputStatus, Some(&resp)));
        assert_eq!(missing_fields(CommandKind::GetOutputStatus, &resp), vec!["allhdcp"]);
    }

    #[rstest]
    #[case(CommandKind::GetVideoStatus, json!({"comhead": "get video status", "allsource": [], "allinputname": [], "alloutputname": []}), true)]
    #[case(CommandKind::GetVideoStatus, json!({"comhead": "get video status", "allsource": [], "allinputname": []}), false)]
    #[case(CommandKind::GetInputStatus, json!({"comhead": "get input status", "edid": [], "inactive": [], "inname": [], "power": 1}), true)]
    #[case(CommandKind::GetInputStatus, json!({"comhead": "get input status", "edid": [], "inactive": [], "inname": []}), false)]
    #[case(CommandKind::GetInputStatus, json!({"edid": [], "inactive": [], "inname": [], "power": 1}), false)]
    #[case(CommandKind::CecCommand, json!({"comhead": "cec command"}), true)]
    fn test_validate_cases(#[case] kind: CommandKind, #[case] value: Value, #[case] expected: bool) {
        assert_eq!(validate(kind, Some(&response(value))), expected);
    }

    #[test]
    fn test_rejection_reason() {
        assert_eq!(
            rejection_reason(CommandKind::SetEdid, None).as_deref(),
            Some("no response")
        );

        let resp = response(json!({"comhead": "get video status", "allsource": []}));
        let reason = rejection_reason(CommandKind::GetVideoStatus, Some(&resp)).unwrap();
        assert!(reason.contains("allinputname"));
        assert!(reason.contains("alloutputname"));

        let ok = response(json!({"comhead": "tx stream"}));
        assert_eq!(rejection_reason(CommandKind::TxStream, Some(&ok)), None);
    }
}
