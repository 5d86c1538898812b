mod commands;
mod dispatcher;
mod notifications;
pub mod runtime;
mod snapshot;
mod state_machine;

pub use commands::SessionCommand;
pub use dispatcher::{NotificationDispatcher, SessionListener};
pub use notifications::{Notification, ResultCode};
pub use snapshot::SessionSnapshot;
pub use state_machine::{CommandOutcome, JoinOutcome, SessionMachine, Transition};
