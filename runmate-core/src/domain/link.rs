use serde::{Deserialize, Serialize};
use std::fmt;

/// Health of the relay link, as far as the client can tell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LinkState {
    /// No transport opened
    #[default]
    Offline,
    /// Connect issued (or link lost), not confirmed by the relay yet
    Connecting,
    /// Relay confirmed the link with `connect`
    Online,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkState::Offline => f.write_str("offline"),
            LinkState::Connecting => f.write_str("connecting"),
            LinkState::Online => f.write_str("online"),
        }
    }
}
