mod config;
mod listener;
pub mod runtime;

pub use config::ClientConfig;
pub use listener::ChannelListener;
pub use runtime::{SessionHandle, SessionRuntime};
