use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named relay event with its positional arguments, as carried by a transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireEvent {
    pub event: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl WireEvent {
    pub fn new(event: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            event: event.into(),
            args,
        }
    }

    /// Event without arguments (lifecycle signals, `letsRun`, ...)
    pub fn bare(event: impl Into<String>) -> Self {
        Self::new(event, Vec::new())
    }
}
