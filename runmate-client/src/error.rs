use runmate_core::{EndpointError, QueueError, SessionError};

/// Client facade errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Invalid relay endpoint: {0}")]
    Endpoint(#[from] EndpointError),

    #[error("Command queue rejected request: {0}")]
    Queue(#[from] QueueError),

    /// The runtime task has stopped
    #[error("Session runtime is closed")]
    RuntimeClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;
