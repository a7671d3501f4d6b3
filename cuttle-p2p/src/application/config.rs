use crate::domain::IceServer;

/// Configuration for the session layer
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Matchbox signalling server URL
    pub signalling_server: String,

    /// ICE servers handed to WebRTC (STUN by default, TURN via caller)
    pub ice_servers: Vec<IceServer>,

    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            signalling_server: "wss://match.cuttle.cards".to_string(),
            ice_servers: IceServer::default_stun_servers(),
            poll_interval_ms: 50,
        }
    }
}

impl SessionConfig {
    pub fn new(signalling_server: String) -> Self {
        Self {
            signalling_server,
            ..Default::default()
        }
    }

    pub fn with_ice_server(mut self, server: IceServer) -> Self {
        self.ice_servers.push(server);
        self
    }

    /// Adds a TURN relay. Put it first so it wins the single slot the
    /// transport currently forwards to WebRTC.
    pub fn with_turn_server(mut self, url: String, username: String, credential: String) -> Self {
        self.ice_servers
            .insert(0, IceServer::turn(url, username, credential));
        self
    }

    pub fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Rendezvous room URL for a peer code. Dialing a remote code and
    /// listening on one's own code both go through here.
    pub fn room_url(&self, code: &str) -> String {
        format!("{}/{}", self.signalling_server.trim_end_matches('/'), code)
    }
}
