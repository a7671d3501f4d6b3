use crate::domain::{PeerCode, PeerId};
use cuttle_core::MatchRole;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Connection state of the single session, mirrored into the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// The at-most-one data session with the other player.
///
/// A guest session starts `Connecting` toward a known remote code; a host
/// session appears already `Connected` when an inbound peer shows up in
/// our own room. Failures land in `state`/`last_error`, never in a return
/// value, and the object survives disconnects and errors for inspection
/// until a new attempt supersedes it.
#[derive(Debug, Clone)]
pub struct Session {
    remote_code: Option<PeerCode>,
    remote_peer: Option<PeerId>,
    role: MatchRole,
    state: ConnectionState,
    last_error: Option<String>,
}

impl Session {
    /// Outbound attempt toward the peer that owns `code`.
    pub(crate) fn connecting_to(code: PeerCode) -> Self {
        Self {
            remote_code: Some(code),
            remote_peer: None,
            role: MatchRole::Guest,
            state: ConnectionState::Connecting,
            last_error: None,
        }
    }

    /// Inbound connection accepted in our own room.
    pub(crate) fn inbound(peer: PeerId) -> Self {
        Self {
            remote_code: None,
            remote_peer: Some(peer),
            role: MatchRole::Host,
            state: ConnectionState::Connected,
            last_error: None,
        }
    }

    pub fn remote_code(&self) -> Option<&PeerCode> {
        self.remote_code.as_ref()
    }

    pub fn remote_peer(&self) -> Option<PeerId> {
        self.remote_peer
    }

    pub fn role(&self) -> MatchRole {
        self.role
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub(crate) fn mark_connected(&mut self, peer: PeerId) {
        self.remote_peer = Some(peer);
        self.state = ConnectionState::Connected;
        self.last_error = None;
    }

    pub(crate) fn mark_disconnected(&mut self) {
        self.remote_peer = None;
        self.state = ConnectionState::Disconnected;
    }

    pub(crate) fn mark_error(&mut self, message: String) {
        self.state = ConnectionState::Error;
        self.last_error = Some(message);
    }
}
