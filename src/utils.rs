//! Utility functions for the roll-call service

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Generate a new unique lobby ID
pub fn generate_lobby_id() -> Uuid {
    Uuid::new_v4()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Free-text remainder of a command, `None` when blank
pub fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
