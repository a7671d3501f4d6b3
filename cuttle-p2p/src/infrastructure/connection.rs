use crate::application::TransportEvent;
use crate::domain::PeerId;
use crate::infrastructure::error::Result;

/// One transport connection bound to a rendezvous room (allows mocking in
/// tests).
///
/// Opening is non-blocking: the signalling handshake makes progress in the
/// background and shows up through `local_peer_id` flipping to `Some` and
/// through events on `poll_events`.
pub trait Connection {
    /// The socket id assigned by the signalling server, once known.
    fn local_peer_id(&self) -> Option<PeerId>;

    fn connected_peers(&self) -> Vec<PeerId>;

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()>;

    /// Drains pending events in arrival order. Never blocks.
    fn poll_events(&mut self) -> Vec<TransportEvent>;
}

/// Opens connections to rendezvous rooms. The session manager holds one of
/// these so tests can swap the WebRTC stack for an in-memory network.
pub trait Connector {
    type Conn: Connection;

    fn open(&self, room: &str) -> Result<Self::Conn>;
}
