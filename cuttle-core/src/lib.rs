pub mod domain;

pub use domain::{
    Board, BoardError, Card, CardMoved, CardParseError, CardView, ChatEntry, ChatLog, ChatSender,
    DragMove, DropOutcome, DropTarget, MatchId, MatchIdError, MatchRole, MatchState, PlayerSlot,
    Rank, Suit, Timestamp, Zone, ZoneId, ZoneIdParseError,
};
