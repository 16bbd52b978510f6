//! Roll Call - attendance lobbies for group chats
//!
//! This crate keeps one open lobby per chat with three mutually exclusive
//! lists (in, maybe, out), renders the roster, and builds mention lists for
//! notifying attendees.

pub mod command;
pub mod config;
pub mod error;
pub mod lobby;
pub mod metrics;
pub mod service;
pub mod transport;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{LobbyError, Result, StoreError};
pub use types::*;

// Re-export key components
pub use command::CommandDispatcher;
pub use lobby::{format_roster, InMemoryLobbyStore, Lobby, LobbyManager, LobbyStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
