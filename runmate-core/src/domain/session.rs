use crate::domain::{Opponent, Phase, RunParameters};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifies one join → teardown cycle (for logs and snapshots)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relay-assigned room identifier (never empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RoomIdError {
    #[error("Room id cannot be empty")]
    Empty,
}

impl RoomId {
    pub fn new(value: impl Into<String>) -> Result<Self, RoomIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(RoomIdError::Empty);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque auth token handed to the relay on join.
///
/// Never interpreted locally; `Debug` output is redacted so the token
/// does not end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token, for the wire only
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

impl From<&str> for Credential {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

impl From<String> for Credential {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// The relay reported a room different from the one already assigned
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Room already assigned as '{assigned}', relay reported '{reported}'")]
pub struct RoomConflict {
    pub assigned: RoomId,
    pub reported: RoomId,
}

/// Result of assigning a room id to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomAssignment {
    /// First assignment in this cycle
    Assigned,
    /// Relay repeated the id we already hold
    Unchanged,
}

/// One matchmaking attempt through run completion
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    phase: Phase,
    room_id: Option<RoomId>,
    credential: Option<Credential>,
    run_parameters: Option<RunParameters>,
    opponent: Option<Opponent>,
}

impl Session {
    /// Fresh idle session
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            phase: Phase::Idle,
            room_id: None,
            credential: None,
            run_parameters: None,
            opponent: None,
        }
    }

    // Getters

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn room_id(&self) -> Option<&RoomId> {
        self.room_id.as_ref()
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn run_parameters(&self) -> Option<&RunParameters> {
        self.run_parameters.as_ref()
    }

    pub fn opponent(&self) -> Option<&Opponent> {
        self.opponent.as_ref()
    }

    // State mutations

    /// Start a new cycle for a join request.
    ///
    /// Replaces any leftovers of a previous (closed) cycle.
    pub fn begin(&mut self, credential: Credential, run_parameters: RunParameters) {
        self.id = SessionId::new();
        self.room_id = None;
        self.opponent = None;
        self.credential = Some(credential);
        self.run_parameters = Some(run_parameters);
        self.phase = Phase::AwaitingRoom;
    }

    /// Move to `phase`, dropping the opponent when leaving the paired phases
    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
        if !phase.is_paired() {
            self.opponent = None;
        }
    }

    /// Record the relay's room id; immutable once set for this cycle
    pub fn assign_room(&mut self, room_id: RoomId) -> Result<RoomAssignment, RoomConflict> {
        match &self.room_id {
            None => {
                self.room_id = Some(room_id);
                Ok(RoomAssignment::Assigned)
            }
            Some(assigned) if *assigned == room_id => Ok(RoomAssignment::Unchanged),
            Some(assigned) => Err(RoomConflict {
                assigned: assigned.clone(),
                reported: room_id,
            }),
        }
    }

    /// Store the opponent and enter `Ready`
    pub fn pair(&mut self, opponent: Opponent) {
        self.phase = Phase::Ready;
        self.opponent = Some(opponent);
    }

    /// Tear the cycle down: room, opponent and credential are forgotten
    pub fn close(&mut self) {
        self.phase = Phase::Closed;
        self.room_id = None;
        self.opponent = None;
        self.credential = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
