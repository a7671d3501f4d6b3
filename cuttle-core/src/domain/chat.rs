use instant::Instant;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Timestamp in milliseconds since application start (monotonic).
///
/// Serializable and comparable, suitable for ordering chat entries. Uses
/// `instant::Instant` internally so the same code runs on wasm targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn now() -> Self {
        // One anchor for every timestamp in the process.
        static ANCHOR: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let anchor = ANCHOR.get_or_init(Instant::now);

        let elapsed = Instant::now().duration_since(*anchor);
        Timestamp(elapsed.as_millis() as u64)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub fn from_millis(millis: u64) -> Self {
        Timestamp(millis)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

/// Which side of the table wrote a chat entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChatSender {
    #[serde(rename = "me")]
    Local,
    #[serde(rename = "opponent")]
    Remote,
}

impl fmt::Display for ChatSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatSender::Local => write!(f, "me"),
            ChatSender::Remote => write!(f, "opponent"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub id: Uuid,
    pub body: String,
    pub sender: ChatSender,
    pub sent_at: Timestamp,
}

/// Append-only conversation history for one match.
#[derive(Debug, Clone, Default)]
pub struct ChatLog {
    entries: Vec<ChatEntry>,
}

impl ChatLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_local(&mut self, body: impl Into<String>) -> &ChatEntry {
        self.record(body.into(), ChatSender::Local)
    }

    pub fn record_remote(&mut self, body: impl Into<String>) -> &ChatEntry {
        self.record(body.into(), ChatSender::Remote)
    }

    fn record(&mut self, body: String, sender: ChatSender) -> &ChatEntry {
        let index = self.entries.len();
        self.entries.push(ChatEntry {
            id: Uuid::new_v4(),
            body,
            sender,
            sent_at: Timestamp::now(),
        });
        &self.entries[index]
    }

    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
