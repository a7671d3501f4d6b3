use crate::infrastructure::error::{P2PError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The shareable identity code of a peer.
///
/// Minted locally when the identity is initialized and immutable from then
/// on; it names the peer's rendezvous room under the signalling server, so
/// handing it to the other player is what makes the peer reachable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerCode(String);

impl PeerCode {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Parses a code received from the other player. Whitespace is
    /// trimmed; anything that is not a uuid is rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(P2PError::InvalidPeerCode("empty code".to_string()));
        }
        let uuid = Uuid::parse_str(trimmed)
            .map_err(|_| P2PError::InvalidPeerCode(trimmed.to_string()))?;
        Ok(Self(uuid.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PeerCode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PeerCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
