//! Lobby storage configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Which `LobbyStore` implementation backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Lobbies live only as long as the process
    Memory,
    /// Lobbies are kept in a JSON file on disk
    Json,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "json" => Ok(StorageBackend::Json),
            other => Err(format!("unknown storage backend: {}", other)),
        }
    }
}

/// Storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Backend to use
    pub backend: StorageBackend,
    /// File used by the json backend
    pub path: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            path: PathBuf::from("data/lobbies.json"),
        }
    }
}
