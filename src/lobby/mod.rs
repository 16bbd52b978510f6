//! Lobby management for group chats
//!
//! This module holds the lobby document, its persistence interface, the
//! manager that enforces the membership rules, and the roster renderer.

pub mod instance;
pub mod manager;
pub mod roster;
pub mod store;

// Re-export commonly used types
pub use instance::Lobby;
pub use manager::LobbyManager;
pub use roster::{
    format_roster, mention_list, mention_targets, notification_text, Mention, MentionMarkup,
    NO_ONE_TO_NOTIFY,
};
pub use store::{InMemoryLobbyStore, JsonFileLobbyStore, LobbyStore};
