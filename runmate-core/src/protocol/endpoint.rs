use std::fmt;
use url::Url;

/// Relay used when nothing else is configured
pub const DEFAULT_RELAY_ENDPOINT: &str = "http://13.125.20.117:3000/matching";

const SUPPORTED_SCHEMES: [&str; 5] = ["http", "https", "ws", "wss", "tcp"];

/// Validated relay address: `scheme://host:port/namespace`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayEndpoint {
    url: Url,
    host: String,
    port: u16,
}

/// Malformed endpoint configuration (fatal, never retried)
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Malformed relay endpoint '{input}': {source}")]
    Malformed {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unsupported relay scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Relay endpoint has no host")]
    MissingHost,

    #[error("Relay endpoint has no port and scheme '{0}' has no default")]
    MissingPort(String),

    #[error("Relay endpoint has no namespace path")]
    MissingNamespace,
}

impl RelayEndpoint {
    pub fn parse(input: &str) -> Result<Self, EndpointError> {
        let url = Url::parse(input.trim()).map_err(|source| EndpointError::Malformed {
            input: input.to_string(),
            source,
        })?;

        if !SUPPORTED_SCHEMES.contains(&url.scheme()) {
            return Err(EndpointError::UnsupportedScheme(url.scheme().to_string()));
        }

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(EndpointError::MissingHost)?
            .to_string();

        let port = url
            .port_or_known_default()
            .ok_or_else(|| EndpointError::MissingPort(url.scheme().to_string()))?;

        if url.path().trim_matches('/').is_empty() {
            return Err(EndpointError::MissingNamespace);
        }

        Ok(Self { url, host, port })
    }

    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Namespace path, e.g. `/matching`
    pub fn namespace(&self) -> &str {
        self.url.path()
    }

    /// `host:port`, suitable for a socket connect
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }
}

impl fmt::Display for RelayEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}
