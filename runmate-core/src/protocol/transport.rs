use crate::protocol::{OutboundEvent, RelayEndpoint};

/// Transport-level failures
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Transport unavailable: {0}")]
    Unavailable(String),

    #[error("Transport is not connected")]
    NotConnected,

    #[error("Send failed: {0}")]
    Send(String),
}

/// Duplex named-event connection to one relay (allows mocking in tests).
///
/// Connection outcome and inbound events are delivered out of band (the
/// owner feeds them back into the session machine as `WireEvent`s), so
/// `connect` only has to start the attempt.
pub trait Transport {
    /// Start connecting to `endpoint`
    fn connect(&mut self, endpoint: &RelayEndpoint) -> Result<(), TransportError>;

    /// Start delivering the named inbound events
    fn subscribe(&mut self, events: &[&'static str]) -> Result<(), TransportError>;

    /// Stop delivering all inbound events
    fn unsubscribe_all(&mut self);

    fn emit(&mut self, event: &OutboundEvent) -> Result<(), TransportError>;

    fn disconnect(&mut self);
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn connect(&mut self, endpoint: &RelayEndpoint) -> Result<(), TransportError> {
        (**self).connect(endpoint)
    }

    fn subscribe(&mut self, events: &[&'static str]) -> Result<(), TransportError> {
        (**self).subscribe(events)
    }

    fn unsubscribe_all(&mut self) {
        (**self).unsubscribe_all()
    }

    fn emit(&mut self, event: &OutboundEvent) -> Result<(), TransportError> {
        (**self).emit(event)
    }

    fn disconnect(&mut self) {
        (**self).disconnect()
    }
}
