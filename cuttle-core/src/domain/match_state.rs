use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Role within the session. The side that received the inbound connection
/// is the host; the side that dialed is the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchRole {
    Host,
    Guest,
}

impl MatchRole {
    /// Seat assignment: the host is player one.
    pub fn slot(&self) -> PlayerSlot {
        match self {
            MatchRole::Host => PlayerSlot::PlayerOne,
            MatchRole::Guest => PlayerSlot::PlayerTwo,
        }
    }
}

impl fmt::Display for MatchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchRole::Host => write!(f, "host"),
            MatchRole::Guest => write!(f, "guest"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerSlot {
    #[serde(rename = "player1")]
    PlayerOne,
    #[serde(rename = "player2")]
    PlayerTwo,
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerSlot::PlayerOne => write!(f, "player1"),
            PlayerSlot::PlayerTwo => write!(f, "player2"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchIdError {
    #[error("match id must start with \"game#\": {0:?}")]
    MissingPrefix(String),
    #[error("match id has an empty token")]
    EmptyToken,
}

/// Shareable match identifier, `game#` followed by a short token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(String);

impl MatchId {
    const PREFIX: &'static str = "game#";
    const TOKEN_LEN: usize = 7;

    pub fn new() -> Self {
        let token = Uuid::new_v4().simple().to_string();
        Self(format!("{}{}", Self::PREFIX, &token[..Self::TOKEN_LEN]))
    }

    pub fn parse(s: &str) -> Result<Self, MatchIdError> {
        let token = s
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| MatchIdError::MissingPrefix(s.to_string()))?;
        if token.trim().is_empty() {
            return Err(MatchIdError::EmptyToken);
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The thin match contract on top of a live session: who sits where and
/// whose turn it would be. Rule legality, scoring and card effects live in
/// a rules layer above this crate.
#[derive(Debug, Clone)]
pub struct MatchState {
    id: MatchId,
    role: Option<MatchRole>,
    remote_id: Option<MatchId>,
    in_game: bool,
    turn: u32,
}

impl MatchState {
    pub fn new() -> Self {
        Self {
            id: MatchId::new(),
            role: None,
            remote_id: None,
            in_game: false,
            turn: 0,
        }
    }

    pub fn id(&self) -> &MatchId {
        &self.id
    }

    pub fn role(&self) -> Option<MatchRole> {
        self.role
    }

    pub fn slot(&self) -> Option<PlayerSlot> {
        self.role.map(|r| r.slot())
    }

    pub fn remote_id(&self) -> Option<&MatchId> {
        self.remote_id.as_ref()
    }

    pub fn is_in_game(&self) -> bool {
        self.in_game
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn assign_role(&mut self, role: MatchRole) {
        self.role = Some(role);
    }

    /// Forgets the seat when the session ends; the match id survives.
    pub fn clear_role(&mut self) {
        self.role = None;
        self.in_game = false;
    }

    pub fn record_remote_id(&mut self, id: MatchId) {
        self.remote_id = Some(id);
    }

    pub fn start(&mut self) {
        self.in_game = true;
        self.turn = 0;
    }

    pub fn advance_turn(&mut self) {
        self.turn += 1;
    }

    /// Player one moves on even turns, player two on odd ones. Without a
    /// seat there is no turn to take.
    pub fn is_my_turn(&self) -> bool {
        match self.slot() {
            Some(PlayerSlot::PlayerOne) => self.turn % 2 == 0,
            Some(PlayerSlot::PlayerTwo) => self.turn % 2 == 1,
            None => false,
        }
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}
