use crate::domain::{Credential, RoomId, RunParameters, RunReport};
use crate::protocol::WireEvent;
use serde_json::{json, Value};

/// Commands the client sends to the relay
#[derive(Debug, Clone, PartialEq)]
pub enum OutboundEvent {
    /// Ask the relay to match us into a room
    JoinRoom {
        credential: Credential,
        parameters: RunParameters,
    },

    /// Abort matchmaking for the room
    StopMatching { room_id: RoomId },

    /// Local participant is ready to start
    ReadyToRun { room_id: RoomId },

    /// Another kilometre covered
    KmPassed { room_id: RoomId, km: u32 },

    /// Run terminated early
    StopRunning { room_id: RoomId, report: RunReport },

    /// Run finished normally
    EndRunning { room_id: RoomId, report: RunReport },

    /// Client is done with the run (results shown)
    RunComplete { room_id: RoomId },

    /// Start the matchmaking countdown for a freshly created room
    StartCount { room_id: RoomId },

    /// Request the opponent's profile
    OpponentInfo { room_id: RoomId },

    /// Leave the room (relay answers with `leaveRoom`)
    LeaveRoom { room_id: RoomId },
}

impl OutboundEvent {
    /// Wire event name
    pub fn name(&self) -> &'static str {
        match self {
            OutboundEvent::JoinRoom { .. } => "joinRoom",
            OutboundEvent::StopMatching { .. } => "stopMatching",
            OutboundEvent::ReadyToRun { .. } => "readyToRun",
            OutboundEvent::KmPassed { .. } => "kmPassed",
            OutboundEvent::StopRunning { .. } => "stopRunning",
            OutboundEvent::EndRunning { .. } => "endRunning",
            OutboundEvent::RunComplete { .. } => "runComplete",
            OutboundEvent::StartCount { .. } => "startCount",
            OutboundEvent::OpponentInfo { .. } => "opponentInfo",
            OutboundEvent::LeaveRoom { .. } => "leaveRoom",
        }
    }

    /// Room the command is scoped to (`None` only for `joinRoom`)
    pub fn room_id(&self) -> Option<&RoomId> {
        match self {
            OutboundEvent::JoinRoom { .. } => None,
            OutboundEvent::StopMatching { room_id }
            | OutboundEvent::ReadyToRun { room_id }
            | OutboundEvent::KmPassed { room_id, .. }
            | OutboundEvent::StopRunning { room_id, .. }
            | OutboundEvent::EndRunning { room_id, .. }
            | OutboundEvent::RunComplete { room_id }
            | OutboundEvent::StartCount { room_id }
            | OutboundEvent::OpponentInfo { room_id }
            | OutboundEvent::LeaveRoom { room_id } => Some(room_id),
        }
    }

    /// Ordered positional arguments
    pub fn args(&self) -> Vec<Value> {
        match self {
            OutboundEvent::JoinRoom {
                credential,
                parameters,
            } => vec![
                json!(credential.expose()),
                json!(parameters.duration_seconds()),
                json!(parameters.gender_filter()),
                json!(parameters.lead_time_seconds()),
            ],
            OutboundEvent::KmPassed { room_id, km } => vec![json!(room_id.as_str()), json!(km)],
            OutboundEvent::StopRunning { room_id, report }
            | OutboundEvent::EndRunning { room_id, report } => vec![
                json!(room_id.as_str()),
                json!(report.distance_meters),
                json!(report.elapsed_seconds),
                json!(report.coordinates),
            ],
            OutboundEvent::StopMatching { room_id }
            | OutboundEvent::ReadyToRun { room_id }
            | OutboundEvent::RunComplete { room_id }
            | OutboundEvent::StartCount { room_id }
            | OutboundEvent::OpponentInfo { room_id }
            | OutboundEvent::LeaveRoom { room_id } => vec![json!(room_id.as_str())],
        }
    }

    pub fn to_wire(&self) -> WireEvent {
        WireEvent::new(self.name(), self.args())
    }
}
