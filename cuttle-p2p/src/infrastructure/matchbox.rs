use crate::application::TransportEvent;
use crate::domain::{IceServer, PeerId};
use crate::infrastructure::connection::{Connection, Connector};
use crate::infrastructure::error::{P2PError, Result};
use matchbox_socket::{RtcIceServerConfig, WebRtcSocket, WebRtcSocketBuilder};
use std::sync::{Arc, Mutex};
use tracing::Instrument;

/// Infrastructure adapter: one WebRTC connection rendezvousing in a
/// matchbox room.
///
/// Opening never blocks. The socket's message loop runs on a background
/// task; its termination is recorded so the next poll surfaces a
/// [`TransportEvent::Closed`] instead of the failure disappearing with the
/// task.
pub struct MatchboxConnection {
    socket: WebRtcSocket,
    cached_id: Option<PeerId>,
    loop_result: Arc<Mutex<Option<Option<String>>>>,
    closed: bool,
}

impl MatchboxConnection {
    /// Connects to a rendezvous room on the signalling server.
    pub fn open(room_url: &str, ice_servers: &[IceServer]) -> Self {
        tracing::info!("Joining rendezvous room: {}", room_url);
        tracing::debug!("Configured with {} ICE servers", ice_servers.len());

        let ice_server_config = build_ice_server_config(ice_servers);

        let (socket, loop_fut) = WebRtcSocketBuilder::new(room_url)
            .ice_server(ice_server_config)
            .add_channel(matchbox_socket::ChannelConfig::reliable())
            .build();

        let loop_result: Arc<Mutex<Option<Option<String>>>> = Arc::new(Mutex::new(None));
        let matchbox_span = tracing::info_span!("matchbox_webrtc_loop");

        #[cfg(target_arch = "wasm32")]
        {
            let flag = Arc::clone(&loop_result);
            wasm_bindgen_futures::spawn_local(
                async move {
                    let result = loop_fut.await;
                    *flag.lock().unwrap() = Some(result.err().map(|e| e.to_string()));
                }
                .instrument(matchbox_span),
            );
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            #[cfg(feature = "native")]
            {
                let flag = Arc::clone(&loop_result);
                tokio::spawn(
                    async move {
                        let result = loop_fut.await;
                        *flag.lock().unwrap() = Some(result.err().map(|e| e.to_string()));
                    }
                    .instrument(matchbox_span),
                );
            }

            #[cfg(not(feature = "native"))]
            compile_error!("Non-WASM builds require the 'native' feature to be enabled");
        }

        MatchboxConnection {
            socket,
            cached_id: None,
            loop_result,
            closed: false,
        }
    }

    fn local_peer_id(&self) -> Option<PeerId> {
        self.cached_id
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        if self.closed {
            return Vec::new();
        }
        self.socket.connected_peers().map(PeerId::new).collect()
    }

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()> {
        if self.closed {
            return Err(P2PError::SendFailed("socket closed".to_string()));
        }

        let len = data.len();
        let channel = self.socket.channel_mut(0);
        channel.send(data.into_boxed_slice(), peer.inner());

        tracing::debug!("Sent {} bytes to peer {}", len, peer);
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        if self.closed {
            return Vec::new();
        }

        // The loop ending means the socket is unusable; report it and stop
        // touching the socket from here on.
        let ended = self.loop_result.lock().unwrap().take();
        if let Some(error) = ended {
            self.closed = true;
            match &error {
                Some(message) => tracing::warn!("Socket loop ended with error: {}", message),
                None => tracing::info!("Socket loop ended"),
            }
            return vec![TransportEvent::Closed { error }];
        }

        let mut events = Vec::new();

        for (peer_id, state) in self.socket.update_peers() {
            let peer = PeerId::new(peer_id);
            match state {
                matchbox_socket::PeerState::Connected => {
                    tracing::info!("Peer connected: {}", peer);
                    events.push(TransportEvent::PeerConnected(peer));
                }
                matchbox_socket::PeerState::Disconnected => {
                    tracing::info!("Peer disconnected: {}", peer);
                    events.push(TransportEvent::PeerDisconnected(peer));
                }
            }
        }

        if self.cached_id.is_none() {
            self.cached_id = self.socket.id().map(PeerId::new);
        }

        let channel = self.socket.channel_mut(0);
        for (peer_id, packet) in channel.receive() {
            let peer = PeerId::new(peer_id);
            tracing::debug!("Received {} bytes from peer {}", packet.len(), peer);

            events.push(TransportEvent::MessageReceived {
                from: peer,
                data: packet.to_vec(),
            });
        }

        events
    }
}

impl Connection for MatchboxConnection {
    fn local_peer_id(&self) -> Option<PeerId> {
        MatchboxConnection::local_peer_id(self)
    }

    fn connected_peers(&self) -> Vec<PeerId> {
        MatchboxConnection::connected_peers(self)
    }

    fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> Result<()> {
        MatchboxConnection::send_to(self, peer, data)
    }

    fn poll_events(&mut self) -> Vec<TransportEvent> {
        MatchboxConnection::poll_events(self)
    }
}

/// Opens matchbox-backed connections with a fixed ICE roster.
pub struct MatchboxConnector {
    ice_servers: Vec<IceServer>,
}

impl MatchboxConnector {
    pub fn new(ice_servers: Vec<IceServer>) -> Self {
        Self { ice_servers }
    }
}

impl Connector for MatchboxConnector {
    type Conn = MatchboxConnection;

    fn open(&self, room: &str) -> Result<MatchboxConnection> {
        Ok(MatchboxConnection::open(room, &self.ice_servers))
    }
}

/// Build ICE server configuration for Matchbox
fn build_ice_server_config(ice_servers: &[IceServer]) -> RtcIceServerConfig {
    if ice_servers.is_empty() {
        return RtcIceServerConfig::default();
    }

    // Matchbox currently takes a single ICE server entry.
    let first_server = &ice_servers[0];

    RtcIceServerConfig {
        urls: first_server.urls.clone(),
        username: first_server.username.clone(),
        credential: first_server.credential.clone(),
    }
}
