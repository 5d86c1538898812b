use runmate_client::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}

impl CliError {
    pub fn invalid(message: impl Into<String>) -> Self {
        CliError::InvalidArgument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CliError>;
