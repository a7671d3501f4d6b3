//! Peer-to-peer session layer for two-player Cuttle matches.
//!
//! One peer opens an identity room on the matchbox signalling server and
//! shares its code; the other dials that code. Whoever received the
//! inbound connection hosts the match. Application messages are JSON
//! objects discriminated by a `type` field and routed to registered
//! handlers; everything above that (board, chat, match bookkeeping) hangs
//! off [`MatchSession`].

// Domain layer (core)
pub mod domain;

// Application layer (use cases)
pub mod application;

// Infrastructure layer (adapters)
pub mod infrastructure;

// Re-exports for convenience
pub use application::{
    ConnectionState, IdentityState, MatchEvent, MatchSession, MessageRouter, PeerIdentity,
    Session, SessionConfig, SessionManager, SessionNotice, TransportEvent,
};
pub use domain::{IceServer, PeerCode, PeerId};
pub use infrastructure::error::{P2PError, Result};
pub use infrastructure::{Connection, Connector, MatchboxConnection, MatchboxConnector};
