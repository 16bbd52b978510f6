//! Common types used throughout the roll-call service

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a group chat on the transport
pub type ChatId = i64;

/// Numeric transport-level identity of a user
pub type TelegramId = i64;

/// Unique identifier for lobbies
pub type LobbyId = Uuid;

/// One of the three rosters a participant can be on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListType {
    In,
    Maybe,
    Out,
}

impl ListType {
    /// All list types in display order
    pub const ALL: [ListType; 3] = [ListType::In, ListType::Maybe, ListType::Out];

    /// Lowercase name as used in commands
    pub fn as_str(&self) -> &'static str {
        match self {
            ListType::In => "in",
            ListType::Maybe => "maybe",
            ListType::Out => "out",
        }
    }
}

impl std::fmt::Display for ListType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ListType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(ListType::In),
            "maybe" => Ok(ListType::Maybe),
            "out" => Ok(ListType::Out),
            other => Err(format!("unknown list type: {}", other)),
        }
    }
}

/// Who is joining a list, as supplied by the transport or an organizer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub telegram_id: Option<TelegramId>,
    pub username: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    /// Identity of a transport user
    pub fn user(telegram_id: TelegramId, username: Option<String>, name: Option<String>) -> Self {
        Self {
            telegram_id: Some(telegram_id),
            username,
            name,
        }
    }

    /// Identity registered by an organizer using only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            telegram_id: None,
            username: None,
            name: Some(name.into()),
        }
    }

    /// Name shown in the roster: the username, falling back to the display name
    pub fn display_name(&self) -> &str {
        resolve_display_name(self.username.as_deref(), self.name.as_deref())
    }
}

/// One user's entry on a lobby list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub telegram_id: Option<TelegramId>,
    pub username: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Participant {
    pub fn new(identity: Identity, description: Option<String>) -> Self {
        Self {
            telegram_id: identity.telegram_id,
            username: identity.username,
            name: identity.name,
            description,
        }
    }

    /// Name shown in the roster and used to de-duplicate list membership
    pub fn display_name(&self) -> &str {
        resolve_display_name(self.username.as_deref(), self.name.as_deref())
    }
}

fn resolve_display_name<'a>(username: Option<&'a str>, name: Option<&'a str>) -> &'a str {
    username
        .filter(|u| !u.is_empty())
        .or(name)
        .unwrap_or_default()
}
