use cuttle_p2p::domain::MatchboxPeerId;
use cuttle_p2p::{Connection, P2PError, PeerId, Result, TransportEvent};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// In-memory stand-in for the signalling server and the data channels.
/// Peers meet by opening endpoints in the same rendezvous room; delivery
/// is synchronous and ordered, like a reliable channel.
pub struct MockNetwork {
    rooms: HashMap<String, Vec<Endpoint>>,
    next_open_failure: Option<String>,
}

#[derive(Clone)]
struct Endpoint {
    id: PeerId,
    inbox: Arc<Mutex<VecDeque<TransportEvent>>>,
}

impl MockNetwork {
    /// Makes the next `open` fail, simulating an unreachable signalling
    /// server.
    pub fn fail_next_open(&mut self, message: &str) {
        self.next_open_failure = Some(message.to_string());
    }

    /// Queues a `Closed` event on one endpoint, simulating its socket
    /// loop dying underneath the session layer.
    pub fn kill_endpoint(&mut self, id: PeerId, error: Option<String>) {
        for endpoints in self.rooms.values() {
            for endpoint in endpoints {
                if endpoint.id == id {
                    endpoint
                        .inbox
                        .lock()
                        .unwrap()
                        .push_back(TransportEvent::Closed {
                            error: error.clone(),
                        });
                }
            }
        }
    }

    pub fn room_size(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, Vec::len)
    }
}

pub fn create_mock_network() -> Arc<Mutex<MockNetwork>> {
    Arc::new(Mutex::new(MockNetwork {
        rooms: HashMap::new(),
        next_open_failure: None,
    }))
}

/// One endpoint in a room. Dropping it leaves the room and notifies the
/// peers still in it, like a WebRTC connection going away.
pub struct MockConnection {
    id: PeerId,
    room: String,
    network: Arc<Mutex<MockNetwork>>,
    inbox: Arc<Mutex<VecDeque<TransportEvent>>>,
}

impl MockConnection {
    pub fn open(network: Arc<Mutex<MockNetwork>>, room: &str) -> Result<Self> {
        let mut net = network.lock().unwrap();
        if let Some(message) = net.next_open_failure.take() {
            return Err(P2PError::ConnectionFailed(message));
        }

        let id = PeerId::new(MatchboxPeerId(Uuid::new_v4()));
        let inbox: Arc<Mutex<VecDeque<TransportEvent>>> =
            Arc::new(Mutex::new(VecDeque::new()));

        let peers = net.rooms.entry(room.to_string()).or_default();
        for other in peers.iter() {
            other
                .inbox
                .lock()
                .unwrap()
                .push_back(TransportEvent::PeerConnected(id));
            inbox
                .lock()
                .unwrap()
                .push_back(TransportEvent::PeerConnected(other.id));
        }
        peers.push(Endpoint {
            id,
            inbox: Arc::clone(&inbox),
        });
        drop(net);

        Ok(Self {
            id,
            room: room.to_string(),
            network,
            inbox,
        })
    }
}

impl Connection for MockConnection {
    fn local_peer_id(&self) -> Option<PeerId> {
        Some(self.id)
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        let net = self.network.lock().unwrap();
        net.rooms
            .get(&self.room)
            .map(|peers| {
                peers
                    .iter()
                    .map(|e| e.id)
                    .filter(|id| *id != self.id)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()> {
        let net = self.network.lock().unwrap();
        let endpoint = net
            .rooms
            .get(&self.room)
            .and_then(|peers| peers.iter().find(|e| e.id == peer));
        match endpoint {
            Some(endpoint) => {
                endpoint
                    .inbox
                    .lock()
                    .unwrap()
                    .push_back(TransportEvent::MessageReceived {
                        from: self.id,
                        data,
                    });
                Ok(())
            }
            None => Err(P2PError::SendFailed(format!("peer {peer} not in room"))),
        }
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        self.inbox.lock().unwrap().drain(..).collect()
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        let mut net = self.network.lock().unwrap();
        if let Some(peers) = net.rooms.get_mut(&self.room) {
            peers.retain(|e| e.id != self.id);
            for other in peers.iter() {
                other
                    .inbox
                    .lock()
                    .unwrap()
                    .push_back(TransportEvent::PeerDisconnected(self.id));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peers_in_the_same_room_see_each_other() {
        let network = create_mock_network();
        let a = MockConnection::open(network.clone(), "room-1").unwrap();
        let mut b = MockConnection::open(network.clone(), "room-1").unwrap();
        let mut c = MockConnection::open(network.clone(), "room-2").unwrap();

        assert_eq!(a.connected_peers(), vec![b.local_peer_id().unwrap()]);
        assert!(c.poll_events().is_empty());

        let events = b.poll_events();
        assert_eq!(
            events,
            vec![TransportEvent::PeerConnected(a.local_peer_id().unwrap())]
        );
    }

    #[test]
    fn test_dropping_an_endpoint_notifies_the_room() {
        let network = create_mock_network();
        let a = MockConnection::open(network.clone(), "room-1").unwrap();
        let mut b = MockConnection::open(network.clone(), "room-1").unwrap();
        let a_id = a.local_peer_id().unwrap();

        drop(a);

        let events = b.poll_events();
        assert!(events.contains(&TransportEvent::PeerDisconnected(a_id)));
        assert_eq!(network.lock().unwrap().room_size("room-1"), 1);
    }

    #[test]
    fn test_send_to_a_missing_peer_fails() {
        let network = create_mock_network();
        let mut a = MockConnection::open(network.clone(), "room-1").unwrap();
        let ghost = PeerId::new(MatchboxPeerId(Uuid::new_v4()));

        assert!(a.send_to(ghost, b"hi".to_vec()).is_err());
    }
}
