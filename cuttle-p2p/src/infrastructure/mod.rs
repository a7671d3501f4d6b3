pub mod connection;
pub mod error;
pub mod matchbox;
pub mod message;

pub use connection::{Connection, Connector};
pub use matchbox::{MatchboxConnection, MatchboxConnector};
