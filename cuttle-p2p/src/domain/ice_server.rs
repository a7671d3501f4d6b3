use serde::{Deserialize, Serialize};

/// One STUN or TURN entry handed to WebRTC for NAT traversal.
///
/// STUN entries are plain URLs; TURN relays additionally carry the
/// username/credential pair the relay operator issued. A single entry may
/// list several URLs for the same server (different ports or transports).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceServer {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServer {
    pub fn stun(url: impl Into<String>) -> Self {
        Self {
            urls: vec![url.into()],
            username: None,
            credential: None,
        }
    }

    pub fn turn(
        url: impl Into<String>,
        username: impl Into<String>,
        credential: impl Into<String>,
    ) -> Self {
        Self {
            urls: vec![url.into()],
            username: Some(username.into()),
            credential: Some(credential.into()),
        }
    }

    pub fn is_turn(&self) -> bool {
        self.username.is_some() && self.credential.is_some()
    }

    /// Public STUN servers used when nothing else is configured. TURN
    /// relays carry credentials and are always supplied by the caller.
    pub fn default_stun_servers() -> Vec<Self> {
        vec![
            Self::stun("stun:freestun.net:3478"),
            Self::stun("stun:stun.l.google.com:19302"),
            Self::stun("stun:stun1.l.google.com:19302"),
        ]
    }
}
