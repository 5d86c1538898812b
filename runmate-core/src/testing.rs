//! In-memory transport that records every call, for tests.

use crate::protocol::{OutboundEvent, RelayEndpoint, Transport, TransportError, WireEvent};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One call made on the transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportOp {
    Connect(String),
    Subscribe(Vec<&'static str>),
    UnsubscribeAll,
    Emit(WireEvent),
    Disconnect,
}

#[derive(Debug, Default)]
struct TransportLog {
    ops: Vec<TransportOp>,
    connected: bool,
    subscriptions: Vec<&'static str>,
}

/// Records calls into a log shared by every clone
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    log: Arc<Mutex<TransportLog>>,
    unavailable: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transport whose `connect` always fails
    pub fn unavailable() -> Self {
        Self {
            log: Arc::default(),
            unavailable: true,
        }
    }

    fn log(&self) -> MutexGuard<'_, TransportLog> {
        self.log.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn ops(&self) -> Vec<TransportOp> {
        self.log().ops.clone()
    }

    /// Every outbound event, in send order
    pub fn emitted(&self) -> Vec<WireEvent> {
        self.log()
            .ops
            .iter()
            .filter_map(|op| match op {
                TransportOp::Emit(wire) => Some(wire.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn emitted_names(&self) -> Vec<String> {
        self.emitted().into_iter().map(|w| w.event).collect()
    }

    pub fn connect_count(&self) -> usize {
        self.count(|op| matches!(op, TransportOp::Connect(_)))
    }

    pub fn disconnect_count(&self) -> usize {
        self.count(|op| matches!(op, TransportOp::Disconnect))
    }

    pub fn subscriptions(&self) -> Vec<&'static str> {
        self.log().subscriptions.clone()
    }

    pub fn is_connected(&self) -> bool {
        self.log().connected
    }

    /// Forget recorded calls (connection state is kept)
    pub fn clear(&self) {
        self.log().ops.clear();
    }

    fn count(&self, predicate: impl Fn(&TransportOp) -> bool) -> usize {
        self.log().ops.iter().filter(|op| predicate(op)).count()
    }
}

impl Transport for RecordingTransport {
    fn connect(&mut self, endpoint: &RelayEndpoint) -> Result<(), TransportError> {
        if self.unavailable {
            return Err(TransportError::Unavailable("recording transport disabled".into()));
        }
        let mut log = self.log();
        log.ops.push(TransportOp::Connect(endpoint.to_string()));
        log.connected = true;
        Ok(())
    }

    fn subscribe(&mut self, events: &[&'static str]) -> Result<(), TransportError> {
        let mut log = self.log();
        log.ops.push(TransportOp::Subscribe(events.to_vec()));
        log.subscriptions.extend_from_slice(events);
        Ok(())
    }

    fn unsubscribe_all(&mut self) {
        let mut log = self.log();
        log.ops.push(TransportOp::UnsubscribeAll);
        log.subscriptions.clear();
    }

    fn emit(&mut self, event: &OutboundEvent) -> Result<(), TransportError> {
        let mut log = self.log();
        if !log.connected {
            return Err(TransportError::NotConnected);
        }
        log.ops.push(TransportOp::Emit(event.to_wire()));
        Ok(())
    }

    fn disconnect(&mut self) {
        let mut log = self.log();
        log.ops.push(TransportOp::Disconnect);
        log.connected = false;
    }
}
