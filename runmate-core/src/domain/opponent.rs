use serde::{Deserialize, Serialize};

/// The paired participant, as described by the relay's `opponentInfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Opponent {
    pub name: String,
    pub level: u32,
    pub win_count: u32,
    pub lose_count: u32,
    /// Avatar resource id (client-side image table)
    pub avatar_id: u32,
}
