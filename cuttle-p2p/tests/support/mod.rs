pub mod mock_connection;

use cuttle_p2p::{Connector, MatchEvent, MatchSession, Result, SessionConfig, SessionManager};
use mock_connection::{create_mock_network, MockConnection, MockNetwork};
use std::sync::{Arc, Mutex};

pub struct MockConnector {
    network: Arc<Mutex<MockNetwork>>,
}

impl Connector for MockConnector {
    type Conn = MockConnection;

    fn open(&self, room: &str) -> Result<MockConnection> {
        MockConnection::open(self.network.clone(), room)
    }
}

pub fn mock_config() -> SessionConfig {
    SessionConfig::new("wss://mock.test".to_string())
}

pub fn mock_manager(network: &Arc<Mutex<MockNetwork>>) -> SessionManager<MockConnector> {
    let connector = MockConnector {
        network: network.clone(),
    };
    SessionManager::new(mock_config(), connector)
}

pub fn mock_session(network: &Arc<Mutex<MockNetwork>>) -> MatchSession<MockConnector> {
    MatchSession::new(mock_manager(network))
}

/// Two match sessions sharing one mock network, with the plumbing to walk
/// them through the rendezvous handshake.
pub struct TwoPeerFixture {
    pub network: Arc<Mutex<MockNetwork>>,
    pub host: MatchSession<MockConnector>,
    pub guest: MatchSession<MockConnector>,
}

impl TwoPeerFixture {
    /// Both peers initialized and the guest dialing the host's code. No
    /// polling beyond what identity setup needs, so the handshake events
    /// are still in flight.
    pub fn dialed() -> Self {
        let network = create_mock_network();
        let mut host = mock_session(&network);
        let mut guest = mock_session(&network);

        host.initialize();
        guest.initialize();
        host.poll();
        guest.poll();

        let code = host.local_code().expect("host identity open").clone();
        guest.connect_to_peer(code);

        Self {
            network,
            host,
            guest,
        }
    }

    /// A fully connected pair, handshake drained.
    pub fn connected() -> Self {
        let mut fixture = Self::dialed();
        fixture.settle();
        assert!(fixture.host.is_connected(), "host did not connect");
        assert!(fixture.guest.is_connected(), "guest did not connect");
        fixture
    }

    /// Polls both peers until neither produces events, host first so its
    /// messages land in the same round. Returns everything observed.
    pub fn settle(&mut self) -> (Vec<MatchEvent>, Vec<MatchEvent>) {
        let mut host_events = Vec::new();
        let mut guest_events = Vec::new();
        for _ in 0..10 {
            let h = self.host.poll();
            let g = self.guest.poll();
            let quiet = h.is_empty() && g.is_empty();
            host_events.extend(h);
            guest_events.extend(g);
            if quiet {
                break;
            }
        }
        (host_events, guest_events)
    }
}
