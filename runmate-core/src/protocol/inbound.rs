use crate::domain::{Opponent, RoomId};
use crate::protocol::WireEvent;
use serde_json::Value;

/// Every event name the client subscribes to on the relay
pub const INBOUND_EVENTS: [&str; 21] = [
    "connect",
    "disconnect",
    "connectTimeout",
    "connectError",
    "start",
    "joinRoom",
    "roomCreated",
    "timeLeft",
    "timeOver",
    "stopCount",
    "leaveRoom",
    "roomFull",
    "opponentInfo",
    "letsRun",
    "opponentNotReady",
    "kmPassed",
    "opponentStopped",
    "stopRunning",
    "endRunning",
    "compareResult",
    "error",
];

/// Typed inbound relay event
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    // Transport lifecycle
    Connect,
    Disconnect,
    ConnectTimeout,
    ConnectError { reason: Option<String> },

    // Matchmaking
    Start,
    /// Relay echo of our `joinRoom` (carries the credential back)
    JoinRoomEcho,
    RoomCreated { room_id: RoomId },
    TimeLeft { seconds: u32 },
    TimeOver,
    StopCount,
    LeaveRoom,
    RoomFull { room_id: RoomId },
    OpponentInfo { room_id: RoomId, opponent: Opponent },

    // Run
    LetsRun,
    OpponentNotReady,
    KmPassed,
    OpponentStopped,
    StopRunning,
    EndRunning,
    CompareResult,

    Error { message: Option<String> },
}

/// Inbound payload that does not match the event's schema
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Unknown inbound event '{0}'")]
    UnknownEvent(String),

    #[error("Event '{event}' is missing argument {index}")]
    MissingArgument { event: &'static str, index: usize },

    #[error("Event '{event}' argument {index} is not {expected}")]
    InvalidArgument {
        event: &'static str,
        index: usize,
        expected: &'static str,
    },

    #[error("Event '{0}' carries an empty room id")]
    EmptyRoomId(&'static str),
}

/// Positional accessor over an event's arguments
struct Args<'a> {
    event: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(event: &'static str, values: &'a [Value]) -> Self {
        Self { event, values }
    }

    fn get(&self, index: usize) -> Result<&'a Value, DecodeError> {
        self.values.get(index).ok_or(DecodeError::MissingArgument {
            event: self.event,
            index,
        })
    }

    fn invalid(&self, index: usize, expected: &'static str) -> DecodeError {
        DecodeError::InvalidArgument {
            event: self.event,
            index,
            expected,
        }
    }

    fn string(&self, index: usize) -> Result<String, DecodeError> {
        match self.get(index)? {
            Value::String(s) => Ok(s.clone()),
            _ => Err(self.invalid(index, "a string")),
        }
    }

    fn uint(&self, index: usize) -> Result<u32, DecodeError> {
        self.get(index)?
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| self.invalid(index, "a non-negative integer"))
    }

    /// Room ids arrive as strings, some relays send bare numbers
    fn room_id(&self, index: usize) -> Result<RoomId, DecodeError> {
        let raw = match self.get(index)? {
            Value::String(s) => s.clone(),
            Value::Number(n) if n.is_u64() || n.is_i64() => n.to_string(),
            _ => return Err(self.invalid(index, "a room id")),
        };
        RoomId::new(raw).map_err(|_| DecodeError::EmptyRoomId(self.event))
    }

    /// Free-form text for log-only events
    fn text(&self, index: usize) -> Option<String> {
        self.values.get(index).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

impl InboundEvent {
    /// Decode a wire event against its schema
    pub fn decode(wire: &WireEvent) -> Result<Self, DecodeError> {
        let name = INBOUND_EVENTS
            .iter()
            .copied()
            .find(|n| *n == wire.event)
            .ok_or_else(|| DecodeError::UnknownEvent(wire.event.clone()))?;
        let args = Args::new(name, &wire.args);

        let event = match name {
            "connect" => InboundEvent::Connect,
            "disconnect" => InboundEvent::Disconnect,
            "connectTimeout" => InboundEvent::ConnectTimeout,
            "connectError" => InboundEvent::ConnectError {
                reason: args.text(0),
            },
            "start" => InboundEvent::Start,
            "joinRoom" => {
                args.get(0)?;
                InboundEvent::JoinRoomEcho
            }
            "roomCreated" => InboundEvent::RoomCreated {
                room_id: args.room_id(0)?,
            },
            "timeLeft" => InboundEvent::TimeLeft {
                seconds: args.uint(0)?,
            },
            "timeOver" => InboundEvent::TimeOver,
            "stopCount" => InboundEvent::StopCount,
            "leaveRoom" => InboundEvent::LeaveRoom,
            "roomFull" => InboundEvent::RoomFull {
                room_id: args.room_id(0)?,
            },
            "opponentInfo" => InboundEvent::OpponentInfo {
                room_id: args.room_id(0)?,
                opponent: Opponent {
                    name: args.string(1)?,
                    level: args.uint(2)?,
                    win_count: args.uint(3)?,
                    lose_count: args.uint(4)?,
                    avatar_id: args.uint(5)?,
                },
            },
            "letsRun" => InboundEvent::LetsRun,
            "opponentNotReady" => InboundEvent::OpponentNotReady,
            "kmPassed" => InboundEvent::KmPassed,
            "opponentStopped" => InboundEvent::OpponentStopped,
            "stopRunning" => InboundEvent::StopRunning,
            "endRunning" => InboundEvent::EndRunning,
            "compareResult" => InboundEvent::CompareResult,
            "error" => InboundEvent::Error {
                message: args.text(0),
            },
            other => return Err(DecodeError::UnknownEvent(other.to_string())),
        };

        Ok(event)
    }

    /// Wire event name
    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::Connect => "connect",
            InboundEvent::Disconnect => "disconnect",
            InboundEvent::ConnectTimeout => "connectTimeout",
            InboundEvent::ConnectError { .. } => "connectError",
            InboundEvent::Start => "start",
            InboundEvent::JoinRoomEcho => "joinRoom",
            InboundEvent::RoomCreated { .. } => "roomCreated",
            InboundEvent::TimeLeft { .. } => "timeLeft",
            InboundEvent::TimeOver => "timeOver",
            InboundEvent::StopCount => "stopCount",
            InboundEvent::LeaveRoom => "leaveRoom",
            InboundEvent::RoomFull { .. } => "roomFull",
            InboundEvent::OpponentInfo { .. } => "opponentInfo",
            InboundEvent::LetsRun => "letsRun",
            InboundEvent::OpponentNotReady => "opponentNotReady",
            InboundEvent::KmPassed => "kmPassed",
            InboundEvent::OpponentStopped => "opponentStopped",
            InboundEvent::StopRunning => "stopRunning",
            InboundEvent::EndRunning => "endRunning",
            InboundEvent::CompareResult => "compareResult",
            InboundEvent::Error { .. } => "error",
        }
    }

    /// Transport lifecycle signal rather than a relay message
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            InboundEvent::Connect
                | InboundEvent::Disconnect
                | InboundEvent::ConnectTimeout
                | InboundEvent::ConnectError { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_room_created() {
        let wire = WireEvent::new("roomCreated", vec![json!("room42")]);

        assert_eq!(
            InboundEvent::decode(&wire),
            Ok(InboundEvent::RoomCreated {
                room_id: RoomId::new("room42").unwrap()
            })
        );
    }

    #[test]
    fn test_numeric_room_id_accepted() {
        let wire = WireEvent::new("roomFull", vec![json!(42)]);

        let event = InboundEvent::decode(&wire).unwrap();
        assert_eq!(
            event,
            InboundEvent::RoomFull {
                room_id: RoomId::new("42").unwrap()
            }
        );
    }

    #[test]
    fn test_decode_opponent_info() {
        let wire = WireEvent::new(
            "opponentInfo",
            vec![
                json!("room42"),
                json!("Mina"),
                json!(4),
                json!(7),
                json!(3),
                json!(2),
            ],
        );

        match InboundEvent::decode(&wire).unwrap() {
            InboundEvent::OpponentInfo { room_id, opponent } => {
                assert_eq!(room_id.as_str(), "room42");
                assert_eq!(opponent.name, "Mina");
                assert_eq!(opponent.level, 4);
                assert_eq!(opponent.win_count, 7);
                assert_eq!(opponent.lose_count, 3);
                assert_eq!(opponent.avatar_id, 2);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_opponent_info_type_mismatch() {
        let wire = WireEvent::new(
            "opponentInfo",
            vec![
                json!("room42"),
                json!("Mina"),
                json!("four"),
                json!(7),
                json!(3),
                json!(2),
            ],
        );

        assert_eq!(
            InboundEvent::decode(&wire),
            Err(DecodeError::InvalidArgument {
                event: "opponentInfo",
                index: 2,
                expected: "a non-negative integer",
            })
        );
    }

    #[test]
    fn test_missing_argument() {
        let wire = WireEvent::bare("timeLeft");

        assert_eq!(
            InboundEvent::decode(&wire),
            Err(DecodeError::MissingArgument {
                event: "timeLeft",
                index: 0
            })
        );
    }

    #[test]
    fn test_negative_time_left_rejected() {
        let wire = WireEvent::new("timeLeft", vec![json!(-5)]);
        assert!(matches!(
            InboundEvent::decode(&wire),
            Err(DecodeError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_empty_room_id_rejected() {
        let wire = WireEvent::new("roomCreated", vec![json!("")]);

        assert_eq!(
            InboundEvent::decode(&wire),
            Err(DecodeError::EmptyRoomId("roomCreated"))
        );
    }

    #[test]
    fn test_unknown_event() {
        let wire = WireEvent::bare("teleport");

        assert_eq!(
            InboundEvent::decode(&wire),
            Err(DecodeError::UnknownEvent("teleport".to_string()))
        );
    }

    #[test]
    fn test_every_subscribed_name_decodes_or_needs_args() {
        for name in INBOUND_EVENTS {
            match InboundEvent::decode(&WireEvent::bare(name)) {
                Ok(event) => assert_eq!(event.name(), name),
                Err(DecodeError::MissingArgument { event, .. }) => assert_eq!(event, name),
                Err(other) => panic!("{} failed with {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_error_message_kept_as_text() {
        let wire = WireEvent::new("error", vec![json!({"code": 7})]);

        assert_eq!(
            InboundEvent::decode(&wire),
            Ok(InboundEvent::Error {
                message: Some(r#"{"code":7}"#.to_string())
            })
        );
    }

    #[test]
    fn test_lifecycle_events() {
        let lifecycle: Vec<&str> = INBOUND_EVENTS
            .iter()
            .copied()
            .filter(|name| {
                InboundEvent::decode(&WireEvent::bare(*name))
                    .map(|event| event.is_lifecycle())
                    .unwrap_or(false)
            })
            .collect();

        // connectError decodes without a reason
        assert_eq!(
            lifecycle,
            vec!["connect", "disconnect", "connectTimeout", "connectError"]
        );
    }
}
