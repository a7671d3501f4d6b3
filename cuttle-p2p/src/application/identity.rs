use crate::domain::{PeerCode, PeerId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the local peer identity.
///
/// `Uninitialized` covers the window between minting the code and the
/// signalling server acknowledging us. `Error` is persistent: nothing
/// retries automatically, a fresh `initialize` mints a new identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityState {
    Uninitialized,
    Open,
    Destroyed,
    Error,
}

impl fmt::Display for IdentityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IdentityState::Uninitialized => "uninitialized",
            IdentityState::Open => "open",
            IdentityState::Destroyed => "destroyed",
            IdentityState::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// The local peer identity: the shareable code plus what the signalling
/// server knows about us.
#[derive(Debug, Clone)]
pub struct PeerIdentity {
    code: PeerCode,
    assigned_id: Option<PeerId>,
    state: IdentityState,
    last_error: Option<String>,
}

impl PeerIdentity {
    pub(crate) fn new(code: PeerCode) -> Self {
        Self {
            code,
            assigned_id: None,
            state: IdentityState::Uninitialized,
            last_error: None,
        }
    }

    pub(crate) fn failed(code: PeerCode, message: String) -> Self {
        Self {
            code,
            assigned_id: None,
            state: IdentityState::Error,
            last_error: Some(message),
        }
    }

    pub fn code(&self) -> &PeerCode {
        &self.code
    }

    /// The socket id the signalling server assigned. Recorded once the
    /// first time it is seen and immutable afterwards.
    pub fn assigned_id(&self) -> Option<PeerId> {
        self.assigned_id
    }

    pub fn state(&self) -> IdentityState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.state == IdentityState::Open
    }

    pub(crate) fn mark_open(&mut self, id: PeerId) {
        if self.assigned_id.is_none() {
            self.assigned_id = Some(id);
        }
        self.state = IdentityState::Open;
        self.last_error = None;
    }

    pub(crate) fn mark_error(&mut self, message: String) {
        self.state = IdentityState::Error;
        self.last_error = Some(message);
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.state = IdentityState::Destroyed;
    }
}
