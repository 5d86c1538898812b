pub mod link;
pub mod opponent;
pub mod phase;
pub mod run;
pub mod session;

pub use link::LinkState;
pub use opponent::Opponent;
pub use phase::Phase;
pub use run::{Coordinate, RunParameterError, RunParameters, RunReport};
pub use session::{
    Credential, RoomAssignment, RoomConflict, RoomId, RoomIdError, Session, SessionId,
};
