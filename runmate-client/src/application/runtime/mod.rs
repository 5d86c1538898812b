mod session_runtime;

pub use session_runtime::{SessionHandle, SessionRuntime};
