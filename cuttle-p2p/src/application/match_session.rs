//! Match-level glue over the session manager.
//!
//! A [`MatchSession`] owns the manager together with the board, the chat
//! log and the match bookkeeping, and translates between wire messages
//! and domain operations. Inbound messages decoded by the router handlers
//! are queued on a channel and applied during [`MatchSession::poll`], so
//! the domain state is only ever touched from the polling thread.

use crate::application::events::SessionNotice;
use crate::application::manager::SessionManager;
use crate::domain::{PeerCode, PeerId};
use crate::infrastructure::message::{self, types, ChatPayload, GameAnnounce};
use crate::infrastructure::Connector;
use cuttle_core::{
    Board, BoardError, Card, CardMoved, ChatEntry, ChatLog, DropOutcome, DropTarget, MatchId,
    MatchRole, MatchState, ZoneId,
};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use serde::Serialize;
use tracing::{debug, warn};

/// Decoded wire messages waiting to be applied to the domain state.
#[derive(Debug)]
enum InboundMessage {
    Chat(ChatPayload),
    Game(GameAnnounce),
    Move(CardMoved),
}

/// What happened during a poll pass, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchEvent {
    IdentityOpen { code: PeerCode },
    Connected { role: MatchRole, peer: PeerId },
    Disconnected,
    SessionFailed { message: String },
    IdentityFailed { message: String },
    ChatReceived { entry: ChatEntry },
    GameAnnounced { id: MatchId },
    /// The peer moved a card; `moved` is already in the local frame.
    OpponentMoved { moved: CardMoved },
}

pub struct MatchSession<N: Connector> {
    manager: SessionManager<N>,
    board: Board,
    chat: ChatLog,
    match_state: MatchState,
    inbound: UnboundedReceiver<InboundMessage>,
}

impl<N: Connector> MatchSession<N> {
    pub fn new(mut manager: SessionManager<N>) -> Self {
        let (tx, inbound) = mpsc::unbounded();
        register_wire_handlers(&mut manager, tx);
        Self {
            manager,
            board: Board::standard(),
            chat: ChatLog::new(),
            match_state: MatchState::new(),
            inbound,
        }
    }

    pub fn manager(&self) -> &SessionManager<N> {
        &self.manager
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access for seeding cards outside the gesture flow.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    pub fn match_state(&self) -> &MatchState {
        &self.match_state
    }

    pub fn local_code(&self) -> Option<&PeerCode> {
        self.manager.local_code()
    }

    pub fn is_connected(&self) -> bool {
        self.manager.is_connected()
    }

    pub fn initialize(&mut self) {
        self.manager.initialize();
    }

    pub fn connect_to_peer(&mut self, code: PeerCode) {
        self.manager.connect_to_peer(code);
    }

    pub fn disconnect(&mut self) {
        self.manager.disconnect();
    }

    pub fn destroy(&mut self) {
        self.manager.destroy();
    }

    /// Sends an arbitrary JSON value to the peer, bypassing the typed
    /// helpers. The value should carry a `type` field or the other side
    /// will drop it.
    pub fn send_data(&mut self, value: &serde_json::Value) -> bool {
        self.manager.send_data(value)
    }

    /// Drives the session layer, applies queued inbound messages and
    /// reports everything that happened.
    pub fn poll(&mut self) -> Vec<MatchEvent> {
        let mut events = Vec::new();

        for notice in self.manager.poll() {
            match notice {
                SessionNotice::IdentityOpen { code } => {
                    events.push(MatchEvent::IdentityOpen { code });
                }
                SessionNotice::Connected { role, peer } => {
                    self.match_state.assign_role(role);
                    self.announce_game();
                    events.push(MatchEvent::Connected { role, peer });
                }
                SessionNotice::Disconnected => {
                    self.match_state.clear_role();
                    events.push(MatchEvent::Disconnected);
                }
                SessionNotice::SessionFailed { message } => {
                    self.match_state.clear_role();
                    events.push(MatchEvent::SessionFailed { message });
                }
                SessionNotice::IdentityFailed { message } => {
                    events.push(MatchEvent::IdentityFailed { message });
                }
            }
        }

        while let Ok(Some(inbound)) = self.inbound.try_next() {
            events.push(self.apply_inbound(inbound));
        }
        events
    }

    /// Sends a chat line. Whitespace-only lines go nowhere. The local log
    /// records the entry only once the transport accepted the frame, so
    /// the log never shows lines the peer could not have seen.
    pub fn send_chat(&mut self, body: impl Into<String>) -> Option<&ChatEntry> {
        let body = body.into();
        let body = body.trim();
        if body.is_empty() {
            return None;
        }
        let sent = self.send_message(
            types::CHAT,
            &ChatPayload {
                message: body.to_string(),
            },
        );
        if sent {
            Some(self.chat.record_local(body))
        } else {
            None
        }
    }

    /// Runs one local gesture: lift `card` out of `from`, drop it on
    /// `target`. A completed move is applied locally first and then
    /// reported to the peer.
    pub fn play_card(
        &mut self,
        from: ZoneId,
        card: Card,
        target: DropTarget,
    ) -> Result<DropOutcome, BoardError> {
        let gesture = self.board.begin_drag(from, card)?;
        let outcome = self.board.complete_drop(gesture, target)?;
        if let DropOutcome::Moved(moved) = outcome {
            if !self.send_message(types::MOVE, &moved) {
                warn!(card = %moved.card, "move not delivered, boards will diverge");
            }
        }
        Ok(outcome)
    }

    /// Draws the top deck card into the local hand and reports it.
    pub fn draw(&mut self) -> Result<CardMoved, BoardError> {
        let moved = self.board.draw()?;
        if !self.send_message(types::MOVE, &moved) {
            warn!(card = %moved.card, "draw not delivered, boards will diverge");
        }
        Ok(moved)
    }

    pub fn start_match(&mut self) {
        self.match_state.start();
    }

    pub fn advance_turn(&mut self) {
        self.match_state.advance_turn();
    }

    /// Both sides announce their match id as soon as the session is up.
    fn announce_game(&mut self) {
        let announce = GameAnnounce {
            game_id: self.match_state.id().clone(),
        };
        self.send_message(types::GAME, &announce);
    }

    fn send_message<T: Serialize>(&mut self, tag: &str, payload: &T) -> bool {
        match message::encode(tag, payload) {
            Ok(bytes) => self.manager.send_bytes(bytes),
            Err(err) => {
                warn!(error = %err, message_type = tag, "could not encode outbound message");
                false
            }
        }
    }

    fn apply_inbound(&mut self, inbound: InboundMessage) -> MatchEvent {
        match inbound {
            InboundMessage::Chat(payload) => {
                let entry = self.chat.record_remote(payload.message).clone();
                MatchEvent::ChatReceived { entry }
            }
            InboundMessage::Game(announce) => {
                self.match_state.record_remote_id(announce.game_id.clone());
                MatchEvent::GameAnnounced {
                    id: announce.game_id,
                }
            }
            InboundMessage::Move(reported) => {
                let moved = self.board.apply_remote_move(&reported);
                MatchEvent::OpponentMoved { moved }
            }
        }
    }
}

fn register_wire_handlers<N: Connector>(
    manager: &mut SessionManager<N>,
    tx: UnboundedSender<InboundMessage>,
) {
    let chat_tx = tx.clone();
    manager.register_handler(types::CHAT, move |value| {
        forward(
            &chat_tx,
            serde_json::from_value::<ChatPayload>(value).map(InboundMessage::Chat),
        );
    });

    let game_tx = tx.clone();
    manager.register_handler(types::GAME, move |value| {
        forward(
            &game_tx,
            serde_json::from_value::<GameAnnounce>(value).map(InboundMessage::Game),
        );
    });

    manager.register_handler(types::MOVE, move |value| {
        forward(
            &tx,
            serde_json::from_value::<CardMoved>(value).map(InboundMessage::Move),
        );
    });
}

fn forward(tx: &UnboundedSender<InboundMessage>, decoded: serde_json::Result<InboundMessage>) {
    match decoded {
        Ok(inbound) => {
            // The receiver lives as long as the session; a send can only
            // fail during teardown, where dropping is fine.
            let _ = tx.unbounded_send(inbound);
        }
        Err(err) => debug!(error = %err, "dropping malformed payload"),
    }
}
