//! Named zone services and their parameters
//!
//! A host platform invokes services by name with a JSON object of
//! parameters. [`ServiceCall::from_service`] turns that pair into a typed
//! call, which [`crate::MatrixSystem::dispatch`] then applies to zones.

use serde_json::Value;
use std::str::FromStr;

use orei_api::{Ack, ApiError, EdidMode, ScalerMode};

use crate::error::{MatrixError, Result};
use crate::zone::Zone;

pub const SERVICE_SET_ZONE: &str = "hdmi_matrix_set_zone";
pub const SERVICE_SET_SCALER: &str = "hdmi_matrix_set_scaler";
pub const SERVICE_SET_ARC: &str = "hdmi_matrix_set_arc";
pub const SERVICE_SET_TX_STREAM: &str = "hdmi_matrix_set_tx_stream";
pub const SERVICE_SET_INPUT_EDID: &str = "hdmi_matrix_set_input_edid";

pub const ATTR_SOURCE: &str = "source";
pub const ATTR_SCALER_MODE: &str = "scaler_mode";
pub const ATTR_ARC: &str = "arc";
pub const ATTR_STREAM: &str = "stream";
pub const ATTR_INPUT_EDID: &str = "input_edid";

/// A validated zone service invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    SetZone { source: String },
    SetScaler { mode: ScalerMode },
    SetArc { on: bool },
    SetTxStream { on: bool },
    SetInputEdid { mode: EdidMode },
}

impl ServiceCall {
    /// Every service name understood by [`ServiceCall::from_service`]
    pub const NAMES: [&'static str; 5] = [
        SERVICE_SET_ZONE,
        SERVICE_SET_SCALER,
        SERVICE_SET_ARC,
        SERVICE_SET_TX_STREAM,
        SERVICE_SET_INPUT_EDID,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ServiceCall::SetZone { .. } => SERVICE_SET_ZONE,
            ServiceCall::SetScaler { .. } => SERVICE_SET_SCALER,
            ServiceCall::SetArc { .. } => SERVICE_SET_ARC,
            ServiceCall::SetTxStream { .. } => SERVICE_SET_TX_STREAM,
            ServiceCall::SetInputEdid { .. } => SERVICE_SET_INPUT_EDID,
        }
    }

    /// Parse a service name and its data object
    ///
    /// Flags accept JSON booleans, `0`/`1` or `"on"`/`"off"`. Modes accept
    /// their numeric code or any name their `FromStr` understands.
    pub fn from_service(name: &str, data: &Value) -> Result<Self> {
        match name {
            SERVICE_SET_ZONE => {
                let source = required(name, data, ATTR_SOURCE)?;
                let source = source.as_str().ok_or_else(|| {
                    invalid(name, ATTR_SOURCE, "expected a source name")
                })?;
                Ok(ServiceCall::SetZone {
                    source: source.to_string(),
                })
            }
            SERVICE_SET_SCALER => Ok(ServiceCall::SetScaler {
                mode: parse_mode(name, data, ATTR_SCALER_MODE)?,
            }),
            SERVICE_SET_ARC => Ok(ServiceCall::SetArc {
                on: parse_flag(name, data, ATTR_ARC)?,
            }),
            SERVICE_SET_TX_STREAM => Ok(ServiceCall::SetTxStream {
                on: parse_flag(name, data, ATTR_STREAM)?,
            }),
            SERVICE_SET_INPUT_EDID => Ok(ServiceCall::SetInputEdid {
                mode: parse_mode(name, data, ATTR_INPUT_EDID)?,
            }),
            other => Err(MatrixError::InvalidService(format!(
                "unknown service '{}'",
                other
            ))),
        }
    }

    /// Apply this call to a single zone
    pub fn apply(&self, zone: &Zone) -> Result<Ack> {
        match self {
            ServiceCall::SetZone { source } => zone.select_source(source),
            ServiceCall::SetScaler { mode } => zone.set_scaler(*mode),
            ServiceCall::SetArc { on } => zone.set_arc(*on),
            ServiceCall::SetTxStream { on } => zone.set_tx_stream(*on),
            ServiceCall::SetInputEdid { mode } => zone.set_input_edid(*mode),
        }
    }
}

fn required<'a>(service: &str, data: &'a Value, key: &str) -> Result<&'a Value> {
    data.get(key)
        .filter(|value| !value.is_null())
        .ok_or_else(|| invalid(service, key, "missing"))
}

fn invalid(service: &str, key: &str, reason: &str) -> MatrixError {
    MatrixError::InvalidService(format!("{} '{}': {}", service, key, reason))
}

fn parse_flag(service: &str, data: &Value, key: &str) -> Result<bool> {
    let value = required(service, data, key)?;
    let flag = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_u64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "on" | "true" | "1" => Some(true),
            "off" | "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    };
    flag.ok_or_else(|| invalid(service, key, &format!("expected on/off, got {}", value)))
}

fn parse_mode<T>(service: &str, data: &Value, key: &str) -> Result<T>
where
    T: FromStr<Err = ApiError>,
{
    let value = required(service, data, key)?;
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        other => return Err(invalid(service, key, &format!("unexpected value {}", other))),
    };
    text.parse::<T>()
        .map_err(|e| invalid(service, key, &e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_names_round_trip() {
        let calls = [
            ServiceCall::SetZone {
                source: "A".to_string(),
            },
            ServiceCall::SetScaler {
                mode: ScalerMode::Auto,
            },
            ServiceCall::SetArc { on: true },
            ServiceCall::SetTxStream { on: false },
            ServiceCall::SetInputEdid {
                mode: EdidMode::UserDefine2,
            },
        ];
        let names: Vec<&str> = calls.iter().map(ServiceCall::name).collect();
        assert_eq!(names, ServiceCall::NAMES);
    }

    #[test]
    fn test_set_zone_requires_source() {
        let call = ServiceCall::from_service(SERVICE_SET_ZONE, &json!({"source": "Xbox"})).unwrap();
        assert_eq!(
            call,
            ServiceCall::SetZone {
                source: "Xbox".to_string()
            }
        );

        assert!(matches!(
            ServiceCall::from_service(SERVICE_SET_ZONE, &json!({})),
            Err(MatrixError::InvalidService(_))
        ));
        assert!(ServiceCall::from_service(SERVICE_SET_ZONE, &json!({"source": 2})).is_err());
    }

    #[rstest]
    #[case(json!(true), true)]
    #[case(json!(false), false)]
    #[case(json!(1), true)]
    #[case(json!(0), false)]
    #[case(json!("on"), true)]
    #[case(json!("OFF"), false)]
    fn test_flag_forms(#[case] value: Value, #[case] expected: bool) {
        let call = ServiceCall::from_service(SERVICE_SET_ARC, &json!({ "arc": value })).unwrap();
        assert_eq!(call, ServiceCall::SetArc { on: expected });

        let call = ServiceCall::from_service(SERVICE_SET_TX_STREAM, &json!({ "stream": value })).unwrap();
        assert_eq!(call, ServiceCall::SetTxStream { on: expected });
    }

    #[rstest]
    #[case(json!(2))]
    #[case(json!("maybe"))]
    #[case(json!(null))]
    #[case(json!([1]))]
    fn test_bad_flags_rejected(#[case] value: Value) {
        assert!(matches!(
            ServiceCall::from_service(SERVICE_SET_ARC, &json!({ "arc": value })),
            Err(MatrixError::InvalidService(_))
        ));
    }

    #[rstest]
    #[case(json!("AUTO"), ScalerMode::Auto)]
    #[case(json!(3), ScalerMode::Auto)]
    #[case(json!("4K -> 1080P"), ScalerMode::Scale4kTo1080p)]
    #[case(json!("bypass"), ScalerMode::Bypass)]
    fn test_scaler_mode_forms(#[case] value: Value, #[case] expected: ScalerMode) {
        let call =
            ServiceCall::from_service(SERVICE_SET_SCALER, &json!({ "scaler_mode": value })).unwrap();
        assert_eq!(call, ServiceCall::SetScaler { mode: expected });
    }

    #[test]
    fn test_reserved_scaler_code_rejected() {
        assert!(ServiceCall::from_service(SERVICE_SET_SCALER, &json!({"scaler_mode": 2})).is_err());
    }

    #[test]
    fn test_input_edid_by_label_or_code() {
        let by_label = ServiceCall::from_service(
            SERVICE_SET_INPUT_EDID,
            &json!({"input_edid": "Copy From Out 3"}),
        )
        .unwrap();
        assert_eq!(
            by_label,
            ServiceCall::SetInputEdid {
                mode: EdidMode::CopyFromOut3
            }
        );

        let by_code =
            ServiceCall::from_service(SERVICE_SET_INPUT_EDID, &json!({"input_edid": 1})).unwrap();
        assert_eq!(
            by_code,
            ServiceCall::SetInputEdid {
                mode: EdidMode::Edid1080pStereoAudio20
            }
        );
    }

    #[test]
    fn test_unknown_service() {
        let err = ServiceCall::from_service("hdmi_matrix_reboot", &json!({})).unwrap_err();
        assert!(err.to_string().contains("hdmi_matrix_reboot"));
    }
}
