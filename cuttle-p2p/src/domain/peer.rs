use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export the underlying matchbox type
pub use matchbox_socket::PeerId as MatchboxPeerId;

/// Socket-level peer identity, assigned by the signalling server once the
/// rendezvous connection is up. Distinct from the shareable
/// [`PeerCode`](crate::domain::PeerCode) a player hands to the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerId(pub MatchboxPeerId);

impl PeerId {
    pub fn new(id: MatchboxPeerId) -> Self {
        Self(id)
    }

    pub fn inner(&self) -> MatchboxPeerId {
        self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<MatchboxPeerId> for PeerId {
    fn from(id: MatchboxPeerId) -> Self {
        Self(id)
    }
}
