//! Owns the peer identity, the single session and the transport
//! connections behind them.
//!
//! The manager is deliberately synchronous at its surface: operations
//! mutate state and return immediately, progress is made by calling
//! [`SessionManager::poll`], and everything observable comes back as
//! [`SessionNotice`] values from that call. Failures never surface as
//! `Err`; they land in the identity or session state.

use crate::application::config::SessionConfig;
use crate::application::events::{SessionNotice, TransportEvent};
use crate::application::identity::{IdentityState, PeerIdentity};
use crate::application::router::{HandlerRegistration, MessageRouter};
use crate::application::session::{ConnectionState, Session};
use crate::domain::PeerCode;
use crate::infrastructure::{Connection, Connector};
use cuttle_core::MatchRole;
use serde_json::Value;
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

/// Which transport connection an event came from.
///
/// `Listen` is our own rendezvous room; an inbound peer there makes us the
/// host. `Dial` is the remote peer's room, joined when we initiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link {
    Listen,
    Dial,
}

/// Hosts talk over their own room's socket, guests over the dialed one.
fn link_for(role: MatchRole) -> Link {
    match role {
        MatchRole::Host => Link::Listen,
        MatchRole::Guest => Link::Dial,
    }
}

pub struct SessionManager<N: Connector> {
    config: SessionConfig,
    connector: N,
    identity: Option<PeerIdentity>,
    session: Option<Session>,
    listen: Option<N::Conn>,
    dial: Option<N::Conn>,
    router: MessageRouter,
    /// Notices produced outside of `poll`, handed out on the next pass.
    queued: Vec<SessionNotice>,
    /// Set when a host disconnect dropped the room socket; the next poll
    /// opens it again so the code stays dialable.
    reopen_listen: bool,
}

impl<N: Connector> SessionManager<N> {
    pub fn new(config: SessionConfig, connector: N) -> Self {
        Self {
            config,
            connector,
            identity: None,
            session: None,
            listen: None,
            dial: None,
            router: MessageRouter::new(),
            queued: Vec::new(),
            reopen_listen: false,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn identity(&self) -> Option<&PeerIdentity> {
        self.identity.as_ref()
    }

    /// The shareable code of the current identity, if one was minted.
    pub fn local_code(&self) -> Option<&PeerCode> {
        self.identity.as_ref().map(PeerIdentity::code)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_connected)
    }

    /// Mints a fresh peer code and opens its rendezvous room so other
    /// peers can reach us. No-op while an identity is already opening or
    /// open; a destroyed or failed identity is superseded by a new one.
    pub fn initialize(&mut self) {
        if let Some(identity) = &self.identity {
            match identity.state() {
                IdentityState::Uninitialized | IdentityState::Open => {
                    debug!(code = %identity.code(), "identity already active");
                    return;
                }
                IdentityState::Destroyed | IdentityState::Error => {}
            }
        }

        let code = PeerCode::new();
        let room = self.config.room_url(code.as_str());
        info!(code = %code, "opening identity room");
        match self.connector.open(&room) {
            Ok(conn) => {
                self.listen = Some(conn);
                self.identity = Some(PeerIdentity::new(code));
            }
            Err(err) => {
                let message = err.to_string();
                error!(error = %message, "identity room failed to open");
                self.identity = Some(PeerIdentity::failed(code, message.clone()));
                self.queued.push(SessionNotice::IdentityFailed { message });
            }
        }
    }

    /// Dials the room of the peer that owns `code`, becoming the guest.
    /// Supersedes whatever session existed before. A no-op until the own
    /// identity is open; callers watch for the `IdentityOpen` notice first.
    pub fn connect_to_peer(&mut self, code: PeerCode) {
        if !self.identity.as_ref().is_some_and(PeerIdentity::is_open) {
            warn!(code = %code, "cannot dial before the identity is open");
            return;
        }
        self.dial = None;

        let room = self.config.room_url(code.as_str());
        info!(code = %code, "dialing remote room");
        match self.connector.open(&room) {
            Ok(conn) => {
                self.dial = Some(conn);
                self.session = Some(Session::connecting_to(code));
            }
            Err(err) => {
                let message = err.to_string();
                error!(error = %message, "dial failed");
                let mut session = Session::connecting_to(code);
                session.mark_error(message.clone());
                self.session = Some(session);
                self.queued.push(SessionNotice::SessionFailed { message });
            }
        }
    }

    /// Serializes `value` as JSON and sends it to the session peer.
    /// Returns whether the frame was handed to the transport; the payload
    /// shape is not inspected.
    pub fn send_data(&mut self, value: &Value) -> bool {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.send_bytes(bytes),
            Err(err) => {
                error!(error = %err, "could not serialize outbound message");
                false
            }
        }
    }

    /// Sends pre-encoded bytes to the session peer.
    pub fn send_bytes(&mut self, data: Vec<u8>) -> bool {
        let Some(session) = self.session.as_mut() else {
            debug!("send without a session");
            return false;
        };
        if !session.is_connected() {
            debug!(state = %session.state(), "send outside the connected state");
            return false;
        }
        let Some(peer) = session.remote_peer() else {
            let message = "connected session lost its peer".to_string();
            session.mark_error(message.clone());
            self.queued.push(SessionNotice::SessionFailed { message });
            return false;
        };

        let conn = match link_for(session.role()) {
            Link::Listen => self.listen.as_mut(),
            Link::Dial => self.dial.as_mut(),
        };
        let Some(conn) = conn else {
            let message = "transport connection missing".to_string();
            session.mark_error(message.clone());
            self.queued.push(SessionNotice::SessionFailed { message });
            return false;
        };

        match conn.send_to(peer, data) {
            Ok(()) => true,
            Err(err) => {
                let message = err.to_string();
                warn!(error = %message, "send failed");
                session.mark_error(message.clone());
                self.queued.push(SessionNotice::SessionFailed { message });
                false
            }
        }
    }

    /// Registers `handler` for inbound messages of `message_type`. The
    /// last registration for a type wins; the returned capability removes
    /// it again.
    pub fn register_handler<F>(
        &mut self,
        message_type: impl Into<String>,
        handler: F,
    ) -> HandlerRegistration
    where
        F: FnMut(Value) + Send + 'static,
    {
        self.router.register(message_type, handler)
    }

    pub fn unregister_handler(&mut self, registration: HandlerRegistration) {
        self.router.unregister(registration);
    }

    /// Closes the active session while keeping the identity reachable.
    /// Also the explicit way out of a session stuck in `Connecting` or
    /// left in `Error`.
    ///
    /// A guest drops the dialed socket. A host's session rode our own
    /// room's socket, so that one is dropped too and reopened under the
    /// unchanged code on the next poll, giving the departing peer a
    /// moment to leave the room.
    pub fn disconnect(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.state() == ConnectionState::Disconnected {
            return;
        }

        info!(role = %session.role(), "closing session");
        let role = session.role();
        session.mark_disconnected();
        self.queued.push(SessionNotice::Disconnected);

        match role {
            MatchRole::Guest => {
                self.dial = None;
            }
            MatchRole::Host => {
                self.listen = None;
                self.reopen_listen = true;
            }
        }
    }

    /// Tears down the identity and whatever session it carried. The next
    /// `initialize` mints a fresh code.
    pub fn destroy(&mut self) {
        self.listen = None;
        self.dial = None;
        self.reopen_listen = false;
        if self.session.take().is_some() {
            self.queued.push(SessionNotice::Disconnected);
        }
        if let Some(identity) = self.identity.as_mut() {
            if identity.state() != IdentityState::Destroyed {
                info!(code = %identity.code(), "destroying identity");
                identity.mark_destroyed();
            }
        }
    }

    /// Drives both transport connections and runs every drained event
    /// through the state transition table, collecting the resulting
    /// notices. Never blocks.
    pub fn poll(&mut self) -> Vec<SessionNotice> {
        let mut notices = std::mem::take(&mut self.queued);

        if self.reopen_listen {
            self.reopen_listen = false;
            self.reopen_identity_room(&mut notices);
        }

        let mut queue: VecDeque<(Link, TransportEvent)> = VecDeque::new();
        if let Some(listen) = self.listen.as_mut() {
            for event in listen.poll_events() {
                queue.push_back((Link::Listen, event));
            }
        }
        if let Some(dial) = self.dial.as_mut() {
            for event in dial.poll_events() {
                queue.push_back((Link::Dial, event));
            }
        }

        // Draining drove the signalling handshake forward; the identity
        // may have just come up.
        if let (Some(identity), Some(listen)) = (self.identity.as_mut(), self.listen.as_ref()) {
            if identity.state() == IdentityState::Uninitialized {
                if let Some(id) = listen.local_peer_id() {
                    identity.mark_open(id);
                    notices.push(SessionNotice::IdentityOpen {
                        code: identity.code().clone(),
                    });
                }
            }
        }

        while let Some((link, event)) = queue.pop_front() {
            self.transition(link, event, &mut notices);
        }
        notices
    }

    fn reopen_identity_room(&mut self, notices: &mut Vec<SessionNotice>) {
        let Some(identity) = self.identity.as_mut() else {
            return;
        };
        if !matches!(
            identity.state(),
            IdentityState::Uninitialized | IdentityState::Open
        ) {
            return;
        }
        let room = self.config.room_url(identity.code().as_str());
        match self.connector.open(&room) {
            Ok(conn) => self.listen = Some(conn),
            Err(err) => {
                let message = err.to_string();
                error!(error = %message, "could not reopen identity room");
                identity.mark_error(message.clone());
                notices.push(SessionNotice::IdentityFailed { message });
            }
        }
    }

    /// The state transition table: one drained transport event in, zero or
    /// more notices out.
    fn transition(&mut self, link: Link, event: TransportEvent, notices: &mut Vec<SessionNotice>) {
        match (link, event) {
            (Link::Listen, TransportEvent::PeerConnected(peer)) => {
                // An inbound peer in our own room makes us the host and
                // supersedes any session in progress.
                if self.dial.take().is_some() {
                    debug!("dropping outbound attempt for an inbound peer");
                }
                info!(peer = %peer, "inbound peer connected");
                self.session = Some(Session::inbound(peer));
                notices.push(SessionNotice::Connected {
                    role: MatchRole::Host,
                    peer,
                });
            }
            (Link::Dial, TransportEvent::PeerConnected(peer)) => match self.session.as_mut() {
                Some(session)
                    if session.role() == MatchRole::Guest
                        && session.state() == ConnectionState::Connecting =>
                {
                    info!(peer = %peer, "outbound connection established");
                    session.mark_connected(peer);
                    notices.push(SessionNotice::Connected {
                        role: MatchRole::Guest,
                        peer,
                    });
                }
                _ => debug!(peer = %peer, "ignoring peer on a superseded dial"),
            },
            (link, TransportEvent::PeerDisconnected(peer)) => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                if link_for(session.role()) != link || session.remote_peer() != Some(peer) {
                    debug!(peer = %peer, "ignoring disconnect of a non-session peer");
                    return;
                }
                info!(peer = %peer, "peer disconnected");
                session.mark_disconnected();
                notices.push(SessionNotice::Disconnected);
                if link == Link::Dial {
                    // The dialed socket's only job was this session.
                    self.dial = None;
                }
            }
            (link, TransportEvent::MessageReceived { from, data }) => {
                let from_session_peer = self.session.as_ref().is_some_and(|session| {
                    link_for(session.role()) == link && session.remote_peer() == Some(from)
                });
                if from_session_peer {
                    self.router.dispatch(&data);
                } else {
                    debug!(from = %from, "dropping message from a non-session peer");
                }
            }
            (Link::Listen, TransportEvent::Closed { error }) => {
                self.listen = None;
                let message = error.unwrap_or_else(|| "signalling socket closed".to_string());
                warn!(message = %message, "identity socket closed");
                if let Some(identity) = self.identity.as_mut() {
                    if identity.state() != IdentityState::Destroyed {
                        identity.mark_error(message.clone());
                        notices.push(SessionNotice::IdentityFailed {
                            message: message.clone(),
                        });
                    }
                }
                if let Some(session) = self.session.as_mut() {
                    if session.role() == MatchRole::Host && session.is_connected() {
                        session.mark_error(message.clone());
                        notices.push(SessionNotice::SessionFailed { message });
                    }
                }
            }
            (Link::Dial, TransportEvent::Closed { error }) => {
                self.dial = None;
                let message = error.unwrap_or_else(|| "transport closed".to_string());
                if let Some(session) = self.session.as_mut() {
                    if session.role() == MatchRole::Guest
                        && matches!(
                            session.state(),
                            ConnectionState::Connecting | ConnectionState::Connected
                        )
                    {
                        warn!(message = %message, "session transport closed");
                        session.mark_error(message.clone());
                        notices.push(SessionNotice::SessionFailed { message });
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MatchboxPeerId, PeerId};
    use crate::infrastructure::error::P2PError;
    use std::sync::{Arc, Mutex};
    use uuid::Uuid;

    fn peer() -> PeerId {
        PeerId::new(MatchboxPeerId(Uuid::new_v4()))
    }

    /// Shared handle through which a test scripts one connection.
    #[derive(Clone, Default)]
    struct Feed {
        id: Arc<Mutex<Option<PeerId>>>,
        events: Arc<Mutex<VecDeque<TransportEvent>>>,
        sent: Arc<Mutex<Vec<(PeerId, Vec<u8>)>>>,
        fail_sends: Arc<Mutex<bool>>,
    }

    impl Feed {
        fn assign_id(&self, id: PeerId) {
            *self.id.lock().unwrap() = Some(id);
        }

        fn push(&self, event: TransportEvent) {
            self.events.lock().unwrap().push_back(event);
        }

        fn sent_frames(&self) -> Vec<(PeerId, Vec<u8>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    struct ScriptedConnection {
        feed: Feed,
    }

    impl Connection for ScriptedConnection {
        fn local_peer_id(&self) -> Option<PeerId> {
            *self.feed.id.lock().unwrap()
        }

        fn connected_peers(&self) -> Vec<PeerId> {
            Vec::new()
        }

        fn send_to(&mut self, peer: PeerId, data: Vec<u8>) -> crate::infrastructure::error::Result<()> {
            if *self.feed.fail_sends.lock().unwrap() {
                return Err(P2PError::SendFailed("scripted send failure".to_string()));
            }
            self.feed.sent.lock().unwrap().push((peer, data));
            Ok(())
        }

        fn poll_events(&mut self) -> Vec<TransportEvent> {
            self.feed.events.lock().unwrap().drain(..).collect()
        }
    }

    /// Hands out scripted connections in open order; unscripted opens get
    /// a fresh silent feed.
    #[derive(Clone, Default)]
    struct ScriptedConnector {
        opens: Arc<Mutex<VecDeque<Result<Feed, String>>>>,
        opened_rooms: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedConnector {
        fn expect_open(&self, feed: Feed) {
            self.opens.lock().unwrap().push_back(Ok(feed));
        }

        fn fail_next_open(&self, message: &str) {
            self.opens.lock().unwrap().push_back(Err(message.to_string()));
        }

        fn opened_rooms(&self) -> Vec<String> {
            self.opened_rooms.lock().unwrap().clone()
        }
    }

    impl Connector for ScriptedConnector {
        type Conn = ScriptedConnection;

        fn open(&self, room: &str) -> crate::infrastructure::error::Result<ScriptedConnection> {
            self.opened_rooms.lock().unwrap().push(room.to_string());
            match self.opens.lock().unwrap().pop_front() {
                Some(Ok(feed)) => Ok(ScriptedConnection { feed }),
                Some(Err(message)) => Err(P2PError::ConnectionFailed(message)),
                None => Ok(ScriptedConnection {
                    feed: Feed::default(),
                }),
            }
        }
    }

    fn manager_with(connector: &ScriptedConnector) -> SessionManager<ScriptedConnector> {
        SessionManager::new(
            SessionConfig::new("wss://signal.test".to_string()),
            connector.clone(),
        )
    }

    #[test]
    fn test_initialize_opens_the_identity_room() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);

        manager.initialize();
        let code = manager.local_code().cloned().unwrap();
        assert_eq!(
            connector.opened_rooms(),
            vec![format!("wss://signal.test/{code}")]
        );
        assert_eq!(
            manager.identity().unwrap().state(),
            IdentityState::Uninitialized
        );

        // The signalling server acknowledges us.
        feed.assign_id(peer());
        let notices = manager.poll();
        assert_eq!(notices, vec![SessionNotice::IdentityOpen { code }]);
        assert!(manager.identity().unwrap().is_open());
    }

    #[test]
    fn test_initialize_failure_lands_in_identity_state() {
        let connector = ScriptedConnector::default();
        connector.fail_next_open("signalling unreachable");
        let mut manager = manager_with(&connector);

        manager.initialize();

        let identity = manager.identity().unwrap();
        assert_eq!(identity.state(), IdentityState::Error);
        assert!(identity.last_error().unwrap().contains("signalling unreachable"));
        assert!(matches!(
            manager.poll().as_slice(),
            [SessionNotice::IdentityFailed { .. }]
        ));
    }

    #[test]
    fn test_initialize_is_idempotent_while_active() {
        let connector = ScriptedConnector::default();
        let mut manager = manager_with(&connector);

        manager.initialize();
        let code = manager.local_code().cloned().unwrap();
        manager.initialize();

        assert_eq!(manager.local_code(), Some(&code));
        assert_eq!(connector.opened_rooms().len(), 1);
    }

    #[test]
    fn test_inbound_peer_makes_us_the_host() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();

        let remote = peer();
        feed.push(TransportEvent::PeerConnected(remote));
        let notices = manager.poll();

        assert!(notices.contains(&SessionNotice::Connected {
            role: MatchRole::Host,
            peer: remote,
        }));
        let session = manager.session().unwrap();
        assert_eq!(session.role(), MatchRole::Host);
        assert!(session.is_connected());
        assert_eq!(session.remote_peer(), Some(remote));
    }

    #[test]
    fn test_connect_to_peer_is_a_guest_session() {
        let connector = ScriptedConnector::default();
        let listen_feed = Feed::default();
        let dial_feed = Feed::default();
        connector.expect_open(listen_feed.clone());
        connector.expect_open(dial_feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();
        listen_feed.assign_id(peer());
        manager.poll();

        let code = PeerCode::new();
        manager.connect_to_peer(code.clone());
        let session = manager.session().unwrap();
        assert_eq!(session.state(), ConnectionState::Connecting);
        assert_eq!(session.remote_code(), Some(&code));

        let remote = peer();
        dial_feed.push(TransportEvent::PeerConnected(remote));
        let notices = manager.poll();

        assert!(notices.contains(&SessionNotice::Connected {
            role: MatchRole::Guest,
            peer: remote,
        }));
        assert!(manager.is_connected());
        assert_eq!(
            connector.opened_rooms()[1],
            format!("wss://signal.test/{code}")
        );
    }

    #[test]
    fn test_connect_before_the_identity_is_open_is_a_no_op() {
        let connector = ScriptedConnector::default();
        let mut manager = manager_with(&connector);

        manager.connect_to_peer(PeerCode::new());
        assert!(manager.session().is_none());
        assert!(manager.poll().is_empty());
        assert!(connector.opened_rooms().is_empty());

        // Room opened but the signalling server has not acked us yet.
        manager.initialize();
        manager.connect_to_peer(PeerCode::new());
        assert!(manager.session().is_none());
        assert_eq!(connector.opened_rooms().len(), 1);
    }

    #[test]
    fn test_dial_failure_lands_in_session_state() {
        let connector = ScriptedConnector::default();
        let listen_feed = Feed::default();
        connector.expect_open(listen_feed.clone());
        connector.fail_next_open("no route to signalling");
        let mut manager = manager_with(&connector);
        manager.initialize();
        listen_feed.assign_id(peer());
        manager.poll();

        manager.connect_to_peer(PeerCode::new());

        let session = manager.session().unwrap();
        assert_eq!(session.state(), ConnectionState::Error);
        assert!(session.last_error().unwrap().contains("no route"));
        assert!(matches!(
            manager.poll().as_slice(),
            [SessionNotice::SessionFailed { .. }]
        ));
    }

    #[test]
    fn test_inbound_peer_supersedes_an_outbound_attempt() {
        let connector = ScriptedConnector::default();
        let listen_feed = Feed::default();
        let dial_feed = Feed::default();
        connector.expect_open(listen_feed.clone());
        connector.expect_open(dial_feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();
        listen_feed.assign_id(peer());
        manager.poll();
        manager.connect_to_peer(PeerCode::new());

        let inbound = peer();
        listen_feed.push(TransportEvent::PeerConnected(inbound));
        manager.poll();

        let session = manager.session().unwrap();
        assert_eq!(session.role(), MatchRole::Host);
        assert_eq!(session.remote_peer(), Some(inbound));

        // The dropped dial no longer feeds events in.
        dial_feed.push(TransportEvent::PeerConnected(peer()));
        assert!(manager.poll().is_empty());
        assert_eq!(manager.session().unwrap().remote_peer(), Some(inbound));
    }

    #[test]
    fn test_send_requires_a_connected_session() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();

        let payload = serde_json::json!({"type": "chat", "message": "hi"});
        assert!(!manager.send_data(&payload));

        let remote = peer();
        feed.push(TransportEvent::PeerConnected(remote));
        manager.poll();

        assert!(manager.send_data(&payload));
        let frames = feed.sent_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, remote);
        let sent: Value = serde_json::from_slice(&frames[0].1).unwrap();
        assert_eq!(sent, payload);
    }

    #[test]
    fn test_send_failure_moves_the_session_to_error() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();
        feed.push(TransportEvent::PeerConnected(peer()));
        manager.poll();
        *feed.fail_sends.lock().unwrap() = true;

        assert!(!manager.send_data(&serde_json::json!({"type": "chat"})));

        assert_eq!(
            manager.session().unwrap().state(),
            ConnectionState::Error
        );
        assert!(matches!(
            manager.poll().as_slice(),
            [SessionNotice::SessionFailed { .. }]
        ));
    }

    #[test]
    fn test_messages_from_the_session_peer_reach_handlers() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager.register_handler("chat", move |value| sink.lock().unwrap().push(value));

        let remote = peer();
        feed.push(TransportEvent::PeerConnected(remote));
        feed.push(TransportEvent::MessageReceived {
            from: remote,
            data: br#"{"type":"chat","message":"hi"}"#.to_vec(),
        });
        manager.poll();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["message"], "hi");
    }

    #[test]
    fn test_messages_from_strangers_are_dropped() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        manager.register_handler("chat", move |value| sink.lock().unwrap().push(value));

        feed.push(TransportEvent::PeerConnected(peer()));
        feed.push(TransportEvent::MessageReceived {
            from: peer(),
            data: br#"{"type":"chat","message":"hi"}"#.to_vec(),
        });
        manager.poll();

        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_remote_disconnect_is_surfaced() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();

        let remote = peer();
        feed.push(TransportEvent::PeerConnected(remote));
        manager.poll();
        feed.push(TransportEvent::PeerDisconnected(remote));
        let notices = manager.poll();

        assert_eq!(notices, vec![SessionNotice::Disconnected]);
        assert_eq!(
            manager.session().unwrap().state(),
            ConnectionState::Disconnected
        );
        assert!(!manager.is_connected());
    }

    #[test]
    fn test_host_disconnect_reopens_the_identity_room() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();
        feed.push(TransportEvent::PeerConnected(peer()));
        manager.poll();

        manager.disconnect();
        assert_eq!(
            manager.session().unwrap().state(),
            ConnectionState::Disconnected
        );
        assert_eq!(connector.opened_rooms().len(), 1, "reopen waits for poll");

        assert!(manager.poll().contains(&SessionNotice::Disconnected));
        let rooms = connector.opened_rooms();
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0], rooms[1]);
    }

    #[test]
    fn test_disconnect_clears_an_errored_session() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();
        feed.assign_id(peer());
        feed.push(TransportEvent::PeerConnected(peer()));
        manager.poll();
        *feed.fail_sends.lock().unwrap() = true;
        assert!(!manager.send_data(&serde_json::json!({"type": "chat"})));
        assert_eq!(manager.session().unwrap().state(), ConnectionState::Error);

        manager.disconnect();

        assert_eq!(
            manager.session().unwrap().state(),
            ConnectionState::Disconnected
        );
        assert!(manager.poll().contains(&SessionNotice::Disconnected));

        // Already closed; nothing more to report.
        manager.disconnect();
        assert!(manager.poll().is_empty());
    }

    #[test]
    fn test_listen_socket_death_fails_identity_and_host_session() {
        let connector = ScriptedConnector::default();
        let feed = Feed::default();
        connector.expect_open(feed.clone());
        let mut manager = manager_with(&connector);
        manager.initialize();
        feed.assign_id(peer());
        feed.push(TransportEvent::PeerConnected(peer()));
        manager.poll();

        feed.push(TransportEvent::Closed {
            error: Some("signalling dropped".to_string()),
        });
        let notices = manager.poll();

        assert!(notices
            .iter()
            .any(|n| matches!(n, SessionNotice::IdentityFailed { .. })));
        assert!(notices
            .iter()
            .any(|n| matches!(n, SessionNotice::SessionFailed { .. })));
        assert_eq!(manager.identity().unwrap().state(), IdentityState::Error);
        assert_eq!(manager.session().unwrap().state(), ConnectionState::Error);
    }

    #[test]
    fn test_destroy_then_initialize_mints_a_new_code() {
        let connector = ScriptedConnector::default();
        let mut manager = manager_with(&connector);
        manager.initialize();
        let first = manager.local_code().cloned().unwrap();

        manager.destroy();
        assert_eq!(
            manager.identity().unwrap().state(),
            IdentityState::Destroyed
        );

        manager.initialize();
        let second = manager.local_code().cloned().unwrap();
        assert_ne!(first, second);
        assert_eq!(
            manager.identity().unwrap().state(),
            IdentityState::Uninitialized
        );
    }
}
