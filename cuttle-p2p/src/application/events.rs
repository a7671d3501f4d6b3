use crate::domain::{PeerCode, PeerId};
use cuttle_core::MatchRole;

/// Raw events drained from a transport connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    PeerConnected(PeerId),
    PeerDisconnected(PeerId),
    MessageReceived { from: PeerId, data: Vec<u8> },
    /// The underlying socket stopped. `error` is `None` for a clean close.
    Closed { error: Option<String> },
}

/// State transitions the session manager surfaces to its embedder after a
/// poll pass. These replace transport callbacks: the embedder reacts to
/// the returned notices instead of registering closures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionNotice {
    /// The local identity finished opening and is reachable under `code`.
    IdentityOpen { code: PeerCode },
    /// A session reached the connected state.
    Connected { role: MatchRole, peer: PeerId },
    /// The active session ended.
    Disconnected,
    /// The active session failed; it stays around in the error state.
    SessionFailed { message: String },
    /// The identity failed to open or lost its signalling socket.
    IdentityFailed { message: String },
}
