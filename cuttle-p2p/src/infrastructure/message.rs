use crate::infrastructure::error::Result;
use cuttle_core::MatchId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Message type tags defined by this layer. Anything else on the wire is
/// an extension point for layers above.
pub mod types {
    pub const CHAT: &str = "chat";
    pub const GAME: &str = "game";
    pub const MOVE: &str = "move";
}

/// Payload of a `chat` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub message: String,
}

/// Payload of a `game` message: each side announces its match id when the
/// session comes up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameAnnounce {
    #[serde(rename = "gameId")]
    pub game_id: MatchId,
}

#[derive(Serialize)]
struct Tagged<'a, T: Serialize> {
    #[serde(rename = "type")]
    message_type: &'a str,
    #[serde(flatten)]
    payload: &'a T,
}

/// Serializes a payload as a JSON object carrying the required `type`
/// discriminator alongside the payload's own fields.
pub fn encode<T: Serialize>(message_type: &str, payload: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&Tagged {
        message_type,
        payload,
    })?)
}

/// Reads the `type` discriminator of a decoded message, if present.
pub fn message_type(value: &Value) -> Option<&str> {
    value.get("type").and_then(|v| v.as_str())
}
