//! Command kinds and command construction
//!
//! Every request to the matrix is a JSON object whose `comhead` field names
//! the command kind. Read-only status queries carry no parameters; mutating
//! commands carry one kind-specific array field (or, for CEC, an object/port/
//! index triple). All commands carry `"language": 0`.

use serde_json::{json, Map, Value};
use std::fmt;

use crate::modes::{EdidMode, InputCecCommand, OutputCecCommand, ScalerMode};

/// Number of ports addressable by a CEC command
pub const CEC_PORT_COUNT: usize = 8;

/// The closed set of `comhead` discriminators understood by the matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CommandKind {
    GetVideoStatus,
    GetOutputStatus,
    GetInputStatus,
    VideoSwitch,
    TxStream,
    SetArc,
    VideoScaler,
    SetEdid,
    CecCommand,
}

impl CommandKind {
    /// All command kinds, reads first
    pub const ALL: [CommandKind; 9] = [
        CommandKind::GetVideoStatus,
        CommandKind::GetOutputStatus,
        CommandKind::GetInputStatus,
        CommandKind::VideoSwitch,
        CommandKind::TxStream,
        CommandKind::SetArc,
        CommandKind::VideoScaler,
        CommandKind::SetEdid,
        CommandKind::CecCommand,
    ];

    /// The exact `comhead` string used on the wire
    pub fn comhead(&self) -> &'static str {
        match self {
            CommandKind::GetVideoStatus => "get video status",
            CommandKind::GetOutputStatus => "get output status",
            CommandKind::GetInputStatus => "get input status",
            CommandKind::VideoSwitch => "video switch",
            CommandKind::TxStream => "tx stream",
            CommandKind::SetArc => "set arc",
            CommandKind::VideoScaler => "video scaler",
            CommandKind::SetEdid => "set edid",
            CommandKind::CecCommand => "cec command",
        }
    }

    /// Look a kind up by its `comhead` string
    pub fn from_comhead(comhead: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.comhead() == comhead)
    }

    /// Whether this is a parameterless status query whose reply may be cached
    pub fn is_cacheable(&self) -> bool {
        matches!(
            self,
            CommandKind::GetVideoStatus | CommandKind::GetOutputStatus | CommandKind::GetInputStatus
        )
    }

    /// Fields a reply of this kind must carry besides `comhead`
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            CommandKind::GetVideoStatus => &["allsource", "allinputname", "alloutputname"],
            CommandKind::GetOutputStatus => &[
                "allsource",
                "allscaler",
                "allhdcp",
                "allout",
                "allconnect",
                "allarc",
                "name",
            ],
            CommandKind::GetInputStatus => &["edid", "inactive", "inname", "power"],
            _ => &[],
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.comhead())
    }
}

/// Which side of the matrix a CEC command addresses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CecTarget {
    Input,
    Output,
}

impl CecTarget {
    /// Value of the `object` field
    pub fn object(&self) -> u8 {
        match self {
            CecTarget::Input => 0,
            CecTarget::Output => 1,
        }
    }
}

/// A single request to the matrix
///
/// Input and output ids are the device's 1-based port numbers. CEC commands
/// address a port by its position in the 8-slot `port` vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetVideoStatus,
    GetOutputStatus,
    GetInputStatus,
    VideoSwitch { input: u8, output: u8 },
    TxStream { output: u8, on: bool },
    SetArc { output: u8, on: bool },
    VideoScaler { output: u8, mode: ScalerMode },
    SetEdid { input: u8, mode: EdidMode },
    Cec { target: CecTarget, port: u8, index: u8 },
}

impl Command {
    /// CEC command addressed to an output port
    pub fn output_cec(port: u8, command: OutputCecCommand) -> Self {
        Command::Cec {
            target: CecTarget::Output,
            port,
            index: command.code(),
        }
    }

    /// CEC command addressed to an input port
    pub fn input_cec(port: u8, command: InputCecCommand) -> Self {
        Command::Cec {
            target: CecTarget::Input,
            port,
            index: command.code(),
        }
    }

    pub fn kind(&self) -> CommandKind {
        match self {
            Command::GetVideoStatus => CommandKind::GetVideoStatus,
            Command::GetOutputStatus => CommandKind::GetOutputStatus,
            Command::GetInputStatus => CommandKind::GetInputStatus,
            Command::VideoSwitch { .. } => CommandKind::VideoSwitch,
            Command::TxStream { .. } => CommandKind::TxStream,
            Command::SetArc { .. } => CommandKind::SetArc,
            Command::VideoScaler { .. } => CommandKind::VideoScaler,
            Command::SetEdid { .. } => CommandKind::SetEdid,
            Command::Cec { .. } => CommandKind::CecCommand,
        }
    }

    /// Build the JSON body sent to `/cgi-bin/instr`
    pub fn to_body(&self) -> Value {
        let mut body = Map::new();
        body.insert("comhead".to_string(), json!(self.kind().comhead()));

        match *self {
            Command::GetVideoStatus | Command::GetOutputStatus | Command::GetInputStatus => {}
            Command::VideoSwitch { input, output } => {
                body.insert("source".to_string(), json!([input, output]));
            }
            Command::TxStream { output, on } => {
                body.insert("out".to_string(), json!([output, u8::from(on)]));
            }
            Command::SetArc { output, on } => {
                body.insert("arc".to_string(), json!([output, u8::from(on)]));
            }
            Command::VideoScaler { output, mode } => {
                body.insert("scaler".to_string(), json!([output, mode.code()]));
            }
            Command::SetEdid { input, mode } => {
                body.insert("edid".to_string(), json!([input, mode.device_code()]));
            }
            Command::Cec {
                target,
                port,
                index,
            } => {
                body.insert("object".to_string(), json!(target.object()));
                body.insert("port".to_string(), json!(one_hot_ports(port)));
                body.insert("index".to_string(), json!(index));
            }
        }

        body.insert("language".to_string(), json!(0));
        Value::Object(body)
    }
}

/// 8-slot port vector with only `port` set
fn one_hot_ports(port: u8) -> [u8; CEC_PORT_COUNT] {
    let mut ports = [0u8; CEC_PORT_COUNT];
    if let Some(slot) = ports.get_mut(usize::from(port)) {
        *slot = 1;
    }
    ports
}
