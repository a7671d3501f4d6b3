pub mod board;
pub mod card;
pub mod chat;
pub mod match_state;
pub mod zone;

pub use board::{Board, BoardError, CardMoved, DragMove, DropOutcome, DropTarget};
pub use card::{Card, CardParseError, Rank, Suit};
pub use chat::{ChatEntry, ChatLog, ChatSender, Timestamp};
pub use match_state::{MatchId, MatchIdError, MatchRole, MatchState, PlayerSlot};
pub use zone::{CardView, Zone, ZoneId, ZoneIdParseError};
