//! Test doubles for the transport seam
//!
//! Available to this crate's tests and, through the `test-support` feature,
//! to downstream crates.

use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::command::{Command, CommandKind};
use crate::error::{ApiError, Result};
use crate::response::Response;
use crate::transport::Transport;

/// Shared record of every `(host, command)` a double received
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<(String, Command)>>>);

impl CallLog {
    fn record(&self, host: &str, command: &Command) {
        self.0.lock().push((host.to_string(), command.clone()));
    }

    pub fn count(&self) -> usize {
        self.0.lock().len()
    }

    pub fn count_kind(&self, kind: CommandKind) -> usize {
        self.0.lock().iter().filter(|(_, cmd)| cmd.kind() == kind).count()
    }

    pub fn commands(&self) -> Vec<Command> {
        self.0.lock().iter().map(|(_, cmd)| cmd.clone()).collect()
    }

    pub fn hosts(&self) -> Vec<String> {
        self.0.lock().iter().map(|(host, _)| host.clone()).collect()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Replays a fixed sequence of outcomes, one per call
///
/// Once the script runs out every call fails with a network error, unless a
/// fallback reply was configured with [`ScriptedTransport::otherwise`].
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<std::result::Result<Value, String>>>,
    fallback: Option<Value>,
    log: CallLog,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next call answers with `body`
    pub fn then_ok(self, body: Value) -> Self {
        self.script.lock().push_back(Ok(body));
        self
    }

    /// Next call fails at the transport level
    pub fn then_fail(self, message: &str) -> Self {
        self.script.lock().push_back(Err(message.to_string()));
        self
    }

    /// Next `n` calls fail at the transport level
    pub fn then_fail_times(self, n: usize) -> Self {
        (0..n).fold(self, |script, i| script.then_fail(&format!("scripted failure {}", i + 1)))
    }

    /// Answer with `body` once the script is exhausted
    pub fn otherwise(mut self, body: Value) -> Self {
        self.fallback = Some(body);
        self
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }
}

impl Transport for ScriptedTransport {
    fn send(&self, host: &str, command: &Command) -> Result<Response> {
        self.log.record(host, command);

        let next = self.script.lock().pop_front();
        match next {
            Some(Ok(body)) => Response::from_value(body),
            Some(Err(message)) => Err(ApiError::NetworkError(message)),
            None => match &self.fallback {
                Some(body) => Response::from_value(body.clone()),
                None => Err(ApiError::NetworkError("script exhausted".to_string())),
            },
        }
    }
}

#[derive(Debug)]
struct FakeState {
    video: Value,
    output: Value,
    input: Value,
    offline: bool,
}

/// A stateful in-memory matrix
///
/// Answers status queries from its documents and applies mutating commands
/// to them, so a switch followed by a (cache-bypassing) refresh observes the
/// new routing. Ports are numbered from 1; every output starts on input 1.
#[derive(Debug)]
pub struct FakeMatrix {
    state: Mutex<FakeState>,
    log: CallLog,
}

impl FakeMatrix {
    pub fn new(inputs: &[&str], outputs: &[&str]) -> Self {
        let n_in = inputs.len();
        let n_out = outputs.len();

        let video = json!({
            "comhead": "get video status",
            "allsource": vec![1; n_out],
            "allinputname": inputs,
            "alloutputname": outputs,
        });
        let output = json!({
            "comhead": "get output status",
            "allsource": vec![1; n_out],
            "allscaler": vec![0; n_out],
            "allhdcp": vec![1; n_out],
            "allout": vec![1; n_out],
            "allconnect": vec![1; n_out],
            "allarc": vec![0; n_out],
            "name": outputs,
        });
        let input = json!({
            "comhead": "get input status",
            "edid": vec![0; n_in],
            "inactive": vec![1; n_in],
            "inname": inputs,
            "power": 1,
        });

        Self {
            state: Mutex::new(FakeState {
                video,
                output,
                input,
                offline: false,
            }),
            log: CallLog::default(),
        }
    }

    pub fn log(&self) -> CallLog {
        self.log.clone()
    }

    /// While offline every call fails with a network error
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Replace one field of the document answering `kind`
    pub fn set_field(&self, kind: CommandKind, field: &str, value: Value) {
        let mut state = self.state.lock();
        if let Some(doc) = document_mut(&mut state, kind) {
            doc[field] = value;
        }
    }

    /// Remove one field of the document answering `kind`
    pub fn remove_field(&self, kind: CommandKind, field: &str) {
        let mut state = self.state.lock();
        if let Some(doc) = document_mut(&mut state, kind).and_then(Value::as_object_mut) {
            doc.remove(field);
        }
    }

    /// Current value of one field of a status document
    pub fn field(&self, kind: CommandKind, field: &str) -> Value {
        let mut state = self.state.lock();
        document_mut(&mut state, kind)
            .map(|doc| doc[field].clone())
            .unwrap_or(Value::Null)
    }

    fn apply(state: &mut FakeState, command: &Command) {
        match *command {
            Command::VideoSwitch { input, output } => {
                set_slot(&mut state.video, "allsource", output, json!(input));
                set_slot(&mut state.output, "allsource", output, json!(input));
            }
            Command::TxStream { output, on } => {
                set_slot(&mut state.output, "allout", output, json!(u8::from(on)));
            }
            Command::SetArc { output, on } => {
                set_slot(&mut state.output, "allarc", output, json!(u8::from(on)));
            }
            Command::VideoScaler { output, mode } => {
                set_slot(&mut state.output, "allscaler", output, json!(mode.code()));
            }
            Command::SetEdid { input, mode } => {
                set_slot(&mut state.input, "edid", input, json!(mode.device_code()));
            }
            _ => {}
        }
    }
}

impl Transport for FakeMatrix {
    fn send(&self, host: &str, command: &Command) -> Result<Response> {
        self.log.record(host, command);

        let mut state = self.state.lock();
        if state.offline {
            return Err(ApiError::NetworkError(format!("{} is offline", host)));
        }

        let kind = command.kind();
        if let Some(doc) = document_mut(&mut state, kind) {
            return Response::from_value(doc.clone());
        }

        Self::apply(&mut state, command);
        Response::from_value(json!({"comhead": kind.comhead(), "result": 1}))
    }
}

fn document_mut(state: &mut FakeState, kind: CommandKind) -> Option<&mut Value> {
    match kind {
        CommandKind::GetVideoStatus => Some(&mut state.video),
        CommandKind::GetOutputStatus => Some(&mut state.output),
        CommandKind::GetInputStatus => Some(&mut state.input),
        _ => None,
    }
}

/// Set `doc[field][port - 1]` when the slot exists
fn set_slot(doc: &mut Value, field: &str, port: u8, value: Value) {
    let idx = usize::from(port).wrapping_sub(1);
    if let Some(slot) = doc.get_mut(field).and_then(|arr| arr.get_mut(idx)) {
        *slot = value;
    }
}
