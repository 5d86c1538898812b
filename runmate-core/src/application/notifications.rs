use crate::domain::{Opponent, RoomId};
use std::fmt;

/// Integer discriminant attached to every notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    TimeRemaining,
    OpponentInfo,
    RunStart,
    RoomAssigned,
    ConnectionError,
    ConnectionTimeout,
}

impl ResultCode {
    pub fn as_i32(self) -> i32 {
        match self {
            ResultCode::TimeRemaining => 111,
            ResultCode::OpponentInfo => 222,
            ResultCode::RunStart => 333,
            ResultCode::RoomAssigned => 444,
            ResultCode::ConnectionError => 900,
            ResultCode::ConnectionTimeout => 901,
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i32())
    }
}

/// Relay-driven change reported to the external listener
#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    RoomAssigned { room_id: RoomId },
    TimeRemaining { seconds: u32 },
    OpponentInfo(Opponent),
    RunStart,
    ConnectionError { reason: Option<String> },
    ConnectionTimeout,
}

impl Notification {
    pub fn code(&self) -> ResultCode {
        match self {
            Notification::RoomAssigned { .. } => ResultCode::RoomAssigned,
            Notification::TimeRemaining { .. } => ResultCode::TimeRemaining,
            Notification::OpponentInfo(_) => ResultCode::OpponentInfo,
            Notification::RunStart => ResultCode::RunStart,
            Notification::ConnectionError { .. } => ResultCode::ConnectionError,
            Notification::ConnectionTimeout => ResultCode::ConnectionTimeout,
        }
    }
}
