use crate::domain::{Phase, RunParameterError};
use crate::protocol::{EndpointError, TransportError};

/// Errors surfaced by session operations
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SessionError {
    /// Command issued while the session is in the wrong phase; nothing was sent
    #[error("'{command}' is not allowed while {phase}")]
    ProtocolViolation { command: &'static str, phase: Phase },

    /// Room-scoped command issued before the relay assigned a room
    #[error("'{command}' requires an assigned room")]
    MissingRoom { command: &'static str },

    #[error("Invalid run parameter: {0}")]
    InvalidParameter(#[from] RunParameterError),

    /// Malformed relay endpoint (fatal, not retried)
    #[error("Configuration error: {0}")]
    Configuration(#[from] EndpointError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
