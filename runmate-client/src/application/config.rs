use crate::error::Result;
use runmate_core::{RelayEndpoint, DEFAULT_RELAY_ENDPOINT};
use std::time::Duration;

/// Configuration for a session runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Relay address, `scheme://host:port/namespace`
    pub endpoint: String,

    /// Capacity of the request channel into the runtime
    pub command_buffer: usize,

    /// Max commands waiting in the session loop
    pub queue_size: usize,

    /// Max commands processed per loop iteration
    pub batch_size: usize,

    /// How long `shutdown` waits for the runtime task before aborting it
    pub shutdown_timeout: Duration,

    /// How long the transport waits for the relay to accept the connection
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RELAY_ENDPOINT.to_string(),
            command_buffer: 64,
            queue_size: 100,
            batch_size: 10,
            shutdown_timeout: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(20),
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = capacity;
        self
    }

    #[must_use]
    pub fn with_queue_size(mut self, size: usize) -> Self {
        self.queue_size = size;
        self
    }

    #[must_use]
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Parse the endpoint up front (the session itself only checks it on connect)
    pub fn relay_endpoint(&self) -> Result<RelayEndpoint> {
        Ok(RelayEndpoint::parse(&self.endpoint)?)
    }
}
