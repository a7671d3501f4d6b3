use crate::domain::card::Card;
use crate::domain::zone::{Zone, ZoneId};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("zone {zone} is not owned by this player")]
    NotOwned { zone: ZoneId },
    #[error("cards cannot be dragged out of the {zone} pile")]
    NotDraggable { zone: ZoneId },
    #[error("{card} is not in {zone}")]
    CardNotInZone { card: Card, zone: ZoneId },
    #[error("the deck is empty")]
    DeckEmpty,
}

/// A card move that crossed a zone boundary. Also the payload of the
/// `move` wire message, in the frame of the player who made the move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMoved {
    pub card: Card,
    pub from: ZoneId,
    pub to: ZoneId,
}

/// An in-flight drag gesture. Holds the card together with its source-zone
/// tag for the lifetime of the gesture; consuming it in
/// [`Board::complete_drop`] is the only way the gesture resolves, so a
/// drag cannot be dropped twice.
#[derive(Debug, PartialEq, Eq)]
pub struct DragMove {
    card: Card,
    source: ZoneId,
}

impl DragMove {
    pub fn card(&self) -> Card {
        self.card
    }

    pub fn source(&self) -> ZoneId {
        self.source
    }
}

/// Where a drag gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Zone(ZoneId),
    /// Released outside every zone.
    Outside,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The move was applied; forward this to the remote peer.
    Moved(CardMoved),
    /// Nothing changed; the card stays where it was.
    ReturnedToOrigin,
}

/// The local player's view of the table: six drop-target zones plus the
/// shared draw and discard piles.
///
/// The board decides which mutations are locally permitted (drag gestures
/// out of owned zones) and which are informational (moves reported by the
/// remote peer, applied without re-checking ownership). It never talks to
/// the network; callers forward the [`CardMoved`] values it returns.
#[derive(Debug, Clone)]
pub struct Board {
    zones: [Zone; 8],
}

impl Board {
    /// The standard two-player layout. The opponent's hand is face-down,
    /// everything else on the table is face-up; the deck is a face-down
    /// pile and the scrap heap a face-up one.
    pub fn standard() -> Self {
        Self {
            zones: [
                Zone::new(ZoneId::OppHand, false, false),
                Zone::new(ZoneId::OppPoint, false, true),
                Zone::new(ZoneId::OppPerm, false, true),
                Zone::new(ZoneId::PlayerPoint, true, true),
                Zone::new(ZoneId::PlayerPerm, true, true),
                Zone::new(ZoneId::PlayerHand, true, true),
                Zone::stack(ZoneId::Deck, true, false),
                Zone::stack(ZoneId::Scrap, false, true),
            ],
        }
    }

    fn slot(id: ZoneId) -> usize {
        match id {
            ZoneId::OppHand => 0,
            ZoneId::OppPoint => 1,
            ZoneId::OppPerm => 2,
            ZoneId::PlayerPoint => 3,
            ZoneId::PlayerPerm => 4,
            ZoneId::PlayerHand => 5,
            ZoneId::Deck => 6,
            ZoneId::Scrap => 7,
        }
    }

    pub fn zone(&self, id: ZoneId) -> &Zone {
        &self.zones[Self::slot(id)]
    }

    fn zone_mut(&mut self, id: ZoneId) -> &mut Zone {
        &mut self.zones[Self::slot(id)]
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    // ===== Local moves (drag gesture) =====

    /// Starts a drag out of `zone`. Ownership is checked here, at the
    /// moment the move is originated; piles cannot source a gesture. The
    /// board itself is not mutated until the drop resolves.
    pub fn begin_drag(&self, zone: ZoneId, card: Card) -> Result<DragMove, BoardError> {
        let source = self.zone(zone);
        if source.is_stack() {
            return Err(BoardError::NotDraggable { zone });
        }
        if !source.is_owned() {
            return Err(BoardError::NotOwned { zone });
        }
        if !source.contains(card) {
            return Err(BoardError::CardNotInZone { card, zone });
        }
        Ok(DragMove { card, source: zone })
    }

    /// Resolves a drag gesture.
    ///
    /// Dropping outside every zone, back onto the source zone, or onto a
    /// pile leaves the board untouched and the card where it started. The
    /// same-zone case is decided by comparing the gesture's source tag
    /// against the target id before anything is removed, so the sequence
    /// is never disturbed and nothing is duplicated.
    ///
    /// A genuine cross-zone drop removes the first `(rank, suit)` match
    /// from the source and appends to the destination.
    pub fn complete_drop(
        &mut self,
        drag: DragMove,
        target: DropTarget,
    ) -> Result<DropOutcome, BoardError> {
        let DragMove { card, source } = drag;

        let dest = match target {
            DropTarget::Outside => {
                debug!(card = %card, source = %source, "drag released outside any zone");
                return Ok(DropOutcome::ReturnedToOrigin);
            }
            DropTarget::Zone(z) => z,
        };

        if dest == source {
            debug!(card = %card, zone = %source, "drag dropped on its own zone");
            return Ok(DropOutcome::ReturnedToOrigin);
        }
        if self.zone(dest).is_stack() {
            debug!(card = %card, dest = %dest, "piles do not accept manual drops");
            return Ok(DropOutcome::ReturnedToOrigin);
        }

        let removed = self
            .zone_mut(source)
            .remove_first(card)
            .ok_or(BoardError::CardNotInZone { card, zone: source })?;
        self.zone_mut(dest).push_card(removed);

        let moved = CardMoved {
            card,
            from: source,
            to: dest,
        };
        debug!(card = %card, from = %source, to = %dest, "card moved");
        Ok(DropOutcome::Moved(moved))
    }

    // ===== Remote and programmatic mutations =====

    /// Applies a move reported by the remote peer.
    ///
    /// The report arrives in the sender's frame; both zone tags are
    /// mirrored before applying. The peer's authority over its own move
    /// was checked on its side, so no local ownership check happens here.
    /// A source card that is absent locally is tolerated (the append still
    /// happens); returns the move in the local frame.
    pub fn apply_remote_move(&mut self, reported: &CardMoved) -> CardMoved {
        let from = reported.from.mirrored();
        let to = reported.to.mirrored();

        if self.zone_mut(from).remove_first(reported.card).is_none() {
            debug!(
                card = %reported.card,
                zone = %from,
                "remote move names a card absent from the local view, appending only"
            );
        }
        self.zone_mut(to).push_card(reported.card);

        CardMoved {
            card: reported.card,
            from,
            to,
        }
    }

    /// Appends a card with no authorization check. Seeding and upstream
    /// rules effects go through here.
    pub fn place_card(&mut self, zone: ZoneId, card: Card) {
        self.zone_mut(zone).push_card(card);
    }

    /// Takes the top card of the deck into the local hand.
    pub fn draw(&mut self) -> Result<CardMoved, BoardError> {
        let card = self
            .zone_mut(ZoneId::Deck)
            .pop_card()
            .ok_or(BoardError::DeckEmpty)?;
        self.zone_mut(ZoneId::PlayerHand).push_card(card);
        Ok(CardMoved {
            card,
            from: ZoneId::Deck,
            to: ZoneId::PlayerHand,
        })
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}
