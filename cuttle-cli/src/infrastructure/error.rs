#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid peer code: {0}")]
    InvalidPeerCode(String),

    #[error("Illegal move: {0}")]
    IllegalMove(#[from] cuttle_core::BoardError),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Unknown command: /{0} (try /help)")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
