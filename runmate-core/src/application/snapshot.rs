use crate::domain::{LinkState, Opponent, Phase, RoomId, Session, SessionId};
use serde::Serialize;

/// Read-only view of the session, published after every processed step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: Phase,
    pub room_id: Option<RoomId>,
    pub opponent: Option<Opponent>,
    pub link: LinkState,
}

impl SessionSnapshot {
    pub fn capture(session: &Session, link: LinkState) -> Self {
        Self {
            session_id: session.id(),
            phase: session.phase(),
            room_id: session.room_id().cloned(),
            opponent: session.opponent().cloned(),
            link,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::capture(&Session::new(), LinkState::Offline)
    }
}
