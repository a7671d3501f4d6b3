pub mod config;
pub mod events;
pub mod identity;
pub mod manager;
pub mod match_session;
pub mod router;
pub mod session;

pub use config::SessionConfig;
pub use events::{SessionNotice, TransportEvent};
pub use identity::{IdentityState, PeerIdentity};
pub use manager::SessionManager;
pub use match_session::{MatchEvent, MatchSession};
pub use router::{Handler, HandlerRegistration, MessageRouter};
pub use session::{ConnectionState, Session};
