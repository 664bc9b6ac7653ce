//! Device replies: the raw JSON object plus typed status documents

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::command::{Command, CommandKind};
use crate::error::{ApiError, Result};

/// A JSON object returned by the matrix
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Response(Map<String, Value>);

impl Response {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a parsed body; anything other than a JSON object is a parse error
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(ApiError::ParseError(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    /// The echoed command discriminator, if present and a string
    pub fn comhead(&self) -> Option<&str> {
        self.0.get("comhead").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Decode into a typed document
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| ApiError::ParseError(e.to_string()))
    }
}

impl From<Map<String, Value>> for Response {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A typed reply to one of the cached status queries
pub trait StatusDocument: DeserializeOwned {
    const KIND: CommandKind;

    fn command() -> Command;
}

/// Reply to `get video status`: routing plus port names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoStatus {
    /// Active 1-based input id for each output, indexed by output
    pub allsource: Vec<u8>,
    /// Input names, indexed by input
    pub allinputname: Vec<String>,
    /// Output names, indexed by output
    pub alloutputname: Vec<String>,
}

impl StatusDocument for VideoStatus {
    const KIND: CommandKind = CommandKind::GetVideoStatus;

    fn command() -> Command {
        Command::GetVideoStatus
    }
}

/// Reply to `get output status`; every array is indexed by output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputStatus {
    pub allsource: Vec<u8>,
    /// Scaler codes, see [`crate::ScalerMode::from_code`]
    pub allscaler: Vec<u8>,
    #[serde(deserialize_with = "flags")]
    pub allhdcp: Vec<bool>,
    /// TX stream enabled
    #[serde(deserialize_with = "flags")]
    pub allout: Vec<bool>,
    #[serde(deserialize_with = "flags")]
    pub allconnect: Vec<bool>,
    #[serde(deserialize_with = "flags")]
    pub allarc: Vec<bool>,
    pub name: Vec<String>,
}

impl StatusDocument for OutputStatus {
    const KIND: CommandKind = CommandKind::GetOutputStatus;

    fn command() -> Command {
        Command::GetOutputStatus
    }
}

/// Reply to `get input status`; every array is indexed by input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputStatus {
    /// Device-side (0-based) EDID codes
    pub edid: Vec<u8>,
    #[serde(deserialize_with = "flags")]
    pub inactive: Vec<bool>,
    pub inname: Vec<String>,
    /// Passed through untouched; the shape varies between firmware revisions
    pub power: Value,
}

impl StatusDocument for InputStatus {
    const KIND: CommandKind = CommandKind::GetInputStatus;

    fn command() -> Command {
        Command::GetInputStatus
    }
}

/// Reply to a mutating command
///
/// Only the `comhead` echo is checked; `result` is kept as sent since
/// firmware reports it as a number, a boolean or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub comhead: String,
    #[serde(default)]
    pub result: Option<Value>,
}

impl Ack {
    /// Build from a reply whose `comhead` has already been checked
    pub fn from_response(response: &Response) -> Self {
        Self {
            comhead: response.comhead().unwrap_or_default().to_string(),
            result: response.get("result").cloned(),
        }
    }

    /// `1`, `1.0`, `true` and `"1"` all count as success
    pub fn is_success(&self) -> bool {
        match &self.result {
            Some(Value::Bool(ok)) => *ok,
            Some(Value::Number(n)) => n.as_f64() == Some(1.0),
            Some(Value::String(s)) => s.trim() == "1",
            _ => false,
        }
    }
}

/// 0/1 flag arrays; some firmware sends JSON booleans instead
fn flags<'de, D>(deserializer: D) -> std::result::Result<Vec<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    let raw = Vec::<Flag>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|flag| match flag {
            Flag::Bool(b) => b,
            Flag::Int(n) => n != 0,
        })
        .collect())
}
