// Application layer (facade)
pub mod application;

// Infrastructure layer (adapters)
pub mod infrastructure;

mod error;

// Re-exports for convenience
pub use application::{ChannelListener, ClientConfig, SessionHandle, SessionRuntime};
pub use error::{ClientError, Result};
pub use infrastructure::JsonLinesTransport;
