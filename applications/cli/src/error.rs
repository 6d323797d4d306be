/// CLI error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Script error on line {line}: {message}")]
    Script { line: usize, message: String },

    #[error("Invalid command: {0}")]
    Command(String),

    #[error("Player error: {0}")]
    Player(#[from] preludio_playback::PlayerError),

    #[error("Storage error: {0}")]
    Storage(#[from] preludio_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn command(msg: impl Into<String>) -> Self {
        Self::Command(msg.into())
    }
}
