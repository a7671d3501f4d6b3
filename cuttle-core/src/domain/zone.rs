use crate::domain::card::Card;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a board container. The string tags are stable and shared
/// with the remote peer, so they double as the wire representation.
///
/// `player-*` zones belong to the local player, `opp-*` zones mirror the
/// remote player's; `deck` and `scrap` are the shared draw and discard piles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneId {
    PlayerHand,
    PlayerPoint,
    PlayerPerm,
    OppHand,
    OppPoint,
    OppPerm,
    Deck,
    Scrap,
}

impl ZoneId {
    pub const ALL: [ZoneId; 8] = [
        ZoneId::OppHand,
        ZoneId::OppPoint,
        ZoneId::OppPerm,
        ZoneId::PlayerPoint,
        ZoneId::PlayerPerm,
        ZoneId::PlayerHand,
        ZoneId::Deck,
        ZoneId::Scrap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneId::PlayerHand => "player-hand",
            ZoneId::PlayerPoint => "player-point",
            ZoneId::PlayerPerm => "player-perm",
            ZoneId::OppHand => "opp-hand",
            ZoneId::OppPoint => "opp-point",
            ZoneId::OppPerm => "opp-perm",
            ZoneId::Deck => "deck",
            ZoneId::Scrap => "scrap",
        }
    }

    /// The same container seen from the other player's side of the table.
    /// A move reported in the sender's frame is applied locally to the
    /// mirrored zones. `deck` and `scrap` are shared and map to themselves.
    pub fn mirrored(&self) -> ZoneId {
        match self {
            ZoneId::PlayerHand => ZoneId::OppHand,
            ZoneId::PlayerPoint => ZoneId::OppPoint,
            ZoneId::PlayerPerm => ZoneId::OppPerm,
            ZoneId::OppHand => ZoneId::PlayerHand,
            ZoneId::OppPoint => ZoneId::PlayerPoint,
            ZoneId::OppPerm => ZoneId::PlayerPerm,
            ZoneId::Deck => ZoneId::Deck,
            ZoneId::Scrap => ZoneId::Scrap,
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown zone: {0:?}")]
pub struct ZoneIdParseError(String);

impl FromStr for ZoneId {
    type Err = ZoneIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneId::ALL
            .into_iter()
            .find(|z| z.as_str() == s)
            .ok_or_else(|| ZoneIdParseError(s.to_string()))
    }
}

/// What a renderer may learn about one card in a zone. Face-down cards
/// expose presence only, never rank or suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardView {
    FaceDown,
    FaceUp(Card),
}

/// One board container holding an ordered card sequence.
///
/// Cards are kept in arrival order; the sequence only changes by appending
/// or by explicit removal of one card. The flags decide what the local side
/// may do with the zone and what its contents reveal:
///
/// * `owned` - this peer may originate moves out of the zone
/// * `visible` - contents are face-up rather than face-down
/// * `stack` - draw/discard pile semantics: not a manual drop target, and
///   even face-up only the top card is revealed
#[derive(Debug, Clone)]
pub struct Zone {
    id: ZoneId,
    owned: bool,
    visible: bool,
    stack: bool,
    cards: Vec<Card>,
}

impl Zone {
    /// A regular drop-target zone.
    pub fn new(id: ZoneId, owned: bool, visible: bool) -> Self {
        Self {
            id,
            owned,
            visible,
            stack: false,
            cards: Vec::new(),
        }
    }

    /// A draw or discard pile.
    pub fn stack(id: ZoneId, owned: bool, visible: bool) -> Self {
        Self {
            id,
            owned,
            visible,
            stack: true,
            cards: Vec::new(),
        }
    }

    pub fn id(&self) -> ZoneId {
        self.id
    }

    pub fn is_owned(&self) -> bool {
        self.owned
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_stack(&self) -> bool {
        self.stack
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The renderable view of the sequence, in order.
    ///
    /// Face-down zones yield only `FaceDown` entries regardless of content.
    /// A face-up stack reveals the most-recently-added card and nothing
    /// beneath it; a face-up regular zone reveals every card.
    pub fn views(&self) -> Vec<CardView> {
        if !self.visible {
            return vec![CardView::FaceDown; self.cards.len()];
        }
        if self.stack {
            let last = self.cards.len().saturating_sub(1);
            return self
                .cards
                .iter()
                .enumerate()
                .map(|(i, card)| {
                    if i == last {
                        CardView::FaceUp(*card)
                    } else {
                        CardView::FaceDown
                    }
                })
                .collect();
        }
        self.cards.iter().map(|c| CardView::FaceUp(*c)).collect()
    }

    /// View of the most-recently-added card, if any.
    pub fn top_view(&self) -> Option<CardView> {
        self.views().pop()
    }

    pub(crate) fn push_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub(crate) fn pop_card(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Removes the first card matching `(rank, suit)` in arrival order.
    pub(crate) fn remove_first(&mut self, card: Card) -> Option<Card> {
        let index = self.cards.iter().position(|c| *c == card)?;
        Some(self.cards.remove(index))
    }

    pub(crate) fn contains(&self, card: Card) -> bool {
        self.cards.contains(&card)
    }

    #[cfg(test)]
    pub(crate) fn cards(&self) -> &[Card] {
        &self.cards
    }
}
