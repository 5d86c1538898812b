use serde::{Deserialize, Serialize};
use std::fmt;

/// Local view of how far a matchmaking + run session has progressed.
///
/// The relay drives almost every transition; the client only requests
/// (join, ready, progress, stop) and reacts to what the relay reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    /// No session yet, nothing sent
    #[default]
    Idle,
    /// Transport opened without a join request
    Connecting,
    /// `joinRoom` sent, waiting for the relay to create or fill a room
    AwaitingRoom,
    /// Room is full, opponent details requested
    AwaitingOpponent,
    /// Paired with an opponent, waiting for both sides to be ready
    Ready,
    /// Run in progress
    Running,
    /// Local run finished, waiting for the relay's comparison
    AwaitingComparison,
    /// Subscriptions released and transport disconnected
    Closed,
}

impl Phase {
    /// A new `joinRoom` may be issued from this phase
    pub fn accepts_join(self) -> bool {
        matches!(self, Phase::Idle | Phase::Connecting | Phase::Closed)
    }

    /// Still looking for an opponent
    pub fn is_matching(self) -> bool {
        matches!(self, Phase::AwaitingRoom | Phase::AwaitingOpponent)
    }

    /// Paired with an opponent (opponent record must be present)
    pub fn is_paired(self) -> bool {
        matches!(
            self,
            Phase::Ready | Phase::Running | Phase::AwaitingComparison
        )
    }

    pub fn is_closed(self) -> bool {
        matches!(self, Phase::Closed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "Idle",
            Phase::Connecting => "Connecting",
            Phase::AwaitingRoom => "AwaitingRoom",
            Phase::AwaitingOpponent => "AwaitingOpponent",
            Phase::Ready => "Ready",
            Phase::Running => "Running",
            Phase::AwaitingComparison => "AwaitingComparison",
            Phase::Closed => "Closed",
        };
        f.write_str(name)
    }
}
