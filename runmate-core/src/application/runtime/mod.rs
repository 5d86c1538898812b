mod command_queue;
mod session_loop;

pub use command_queue::{CommandQueue, QueueError, QueuedCommand};
pub use session_loop::{CommandReport, SessionLoop};
