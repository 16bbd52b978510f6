//! Error types for the roll-call service
//!
//! Domain outcomes (`NotFound`, `AlreadyExists`) are kept apart from store
//! failures so the command layer can match on the kind instead of inspecting
//! messages. Application plumbing (config, bootstrap) uses `anyhow`.

use crate::types::ChatId;

/// Result type alias for lobby operations
pub type Result<T> = std::result::Result<T, LobbyError>;

/// Result type alias for store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by lobby operations
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    #[error("No lobby exists for chat {chat_id}")]
    NotFound { chat_id: ChatId },

    #[error("A lobby already exists for chat {chat_id}")]
    AlreadyExists { chat_id: ChatId },

    #[error("Lobby store failure: {0}")]
    Store(#[from] StoreError),
}

impl LobbyError {
    /// Short stable label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            LobbyError::NotFound { .. } => "not_found",
            LobbyError::AlreadyExists { .. } => "already_exists",
            LobbyError::Store(_) => "store",
        }
    }

    /// Whether this is an expected domain outcome rather than an infrastructure failure
    pub fn is_domain(&self) -> bool {
        !matches!(self, LobbyError::Store(_))
    }
}

/// Failures reported by a lobby store backend
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Unique constraint violated: chat {chat_id} already has a lobby")]
    DuplicateChat { chat_id: ChatId },

    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage backend unavailable: {message}")]
    Unavailable { message: String },
}
