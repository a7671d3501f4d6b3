pub mod code;
pub mod ice_server;
pub mod peer;

pub use code::PeerCode;
pub use ice_server::IceServer;
pub use peer::{MatchboxPeerId, PeerId};
