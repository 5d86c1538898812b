//! Client-side session protocol for paired runs through a matchmaking relay.
//!
//! The crate is sans-IO: [`SessionMachine`] drives a [`Transport`] supplied by
//! the caller and reports relay-driven changes to a single [`SessionListener`].

pub mod application;
pub mod domain;
pub mod error;
pub mod protocol;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use application::runtime::{CommandQueue, CommandReport, QueueError, QueuedCommand, SessionLoop};
pub use application::{
    CommandOutcome, JoinOutcome, Notification, NotificationDispatcher, ResultCode, SessionCommand,
    SessionListener, SessionMachine, SessionSnapshot, Transition,
};
pub use domain::{
    Coordinate, Credential, LinkState, Opponent, Phase, RoomId, RunParameterError, RunParameters,
    RunReport, Session, SessionId,
};
pub use error::{Result, SessionError};
pub use protocol::{
    DecodeError, EndpointError, InboundEvent, OutboundEvent, RelayEndpoint, Transport,
    TransportError, WireEvent, DEFAULT_RELAY_ENDPOINT, INBOUND_EVENTS,
};
