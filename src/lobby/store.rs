//! Lobby storage interface and implementations
//!
//! The store is the only consistency boundary: every operation reads or
//! writes one whole `Lobby` document, and `chat_id` is unique per store.

use crate::error::{StoreError, StoreResult};
use crate::lobby::instance::Lobby;
use crate::types::ChatId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

/// Persistence collaborator for lobby documents
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LobbyStore: Send + Sync {
    /// Find the lobby belonging to a chat
    async fn find_by_chat(&self, chat_id: ChatId) -> StoreResult<Option<Lobby>>;

    /// Insert a new lobby; fails with `DuplicateChat` if the chat already has one
    async fn create(&self, lobby: Lobby) -> StoreResult<()>;

    /// Delete the lobby belonging to a chat, returning what was removed
    async fn delete_by_chat(&self, chat_id: ChatId) -> StoreResult<Option<Lobby>>;

    /// Overwrite a lobby document in full
    async fn save(&self, lobby: Lobby) -> StoreResult<()>;

    /// Number of open lobbies
    async fn count(&self) -> StoreResult<usize>;
}

/// In-memory lobby storage
#[derive(Debug, Default)]
pub struct InMemoryLobbyStore {
    lobbies: RwLock<HashMap<ChatId, Lobby>>,
}

impl InMemoryLobbyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LobbyStore for InMemoryLobbyStore {
    async fn find_by_chat(&self, chat_id: ChatId) -> StoreResult<Option<Lobby>> {
        Ok(self.lobbies.read().await.get(&chat_id).cloned())
    }

    async fn create(&self, lobby: Lobby) -> StoreResult<()> {
        let mut lobbies = self.lobbies.write().await;
        if lobbies.contains_key(&lobby.chat_id()) {
            return Err(StoreError::DuplicateChat {
                chat_id: lobby.chat_id(),
            });
        }
        lobbies.insert(lobby.chat_id(), lobby);
        Ok(())
    }

    async fn delete_by_chat(&self, chat_id: ChatId) -> StoreResult<Option<Lobby>> {
        Ok(self.lobbies.write().await.remove(&chat_id))
    }

    async fn save(&self, lobby: Lobby) -> StoreResult<()> {
        self.lobbies.write().await.insert(lobby.chat_id(), lobby);
        Ok(())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.lobbies.read().await.len())
    }
}

/// Lobby storage backed by a single JSON file
///
/// The file holds every open lobby. It is read once on open and rewritten
/// through a temp file and rename after each mutation, so a crash never leaves
/// a half-written document behind.
#[derive(Debug)]
pub struct JsonFileLobbyStore {
    path: PathBuf,
    lobbies: Mutex<HashMap<ChatId, Lobby>>,
}

impl JsonFileLobbyStore {
    /// Open the store at `path`, starting empty if the file does not exist yet
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let lobbies = match fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => {
                let documents: Vec<Lobby> = serde_json::from_str(&content)?;
                let mut lobbies = HashMap::with_capacity(documents.len());
                for lobby in documents {
                    if lobbies.contains_key(&lobby.chat_id()) {
                        return Err(StoreError::DuplicateChat {
                            chat_id: lobby.chat_id(),
                        });
                    }
                    lobbies.insert(lobby.chat_id(), lobby);
                }
                lobbies
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(e.into()),
        };

        info!(
            "Opened lobby store at {} with {} open lobbies",
            path.display(),
            lobbies.len()
        );

        Ok(Self {
            path,
            lobbies: Mutex::new(lobbies),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, lobbies: &HashMap<ChatId, Lobby>) -> StoreResult<()> {
        let mut documents: Vec<&Lobby> = lobbies.values().collect();
        documents.sort_by_key(|lobby| lobby.chat_id());
        let content = serde_json::to_string_pretty(&documents)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content).await?;
        fs::rename(&tmp_path, &self.path).await?;

        debug!(
            "Persisted {} lobbies to {}",
            documents.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl LobbyStore for JsonFileLobbyStore {
    async fn find_by_chat(&self, chat_id: ChatId) -> StoreResult<Option<Lobby>> {
        Ok(self.lobbies.lock().await.get(&chat_id).cloned())
    }

    async fn create(&self, lobby: Lobby) -> StoreResult<()> {
        let mut lobbies = self.lobbies.lock().await;
        if lobbies.contains_key(&lobby.chat_id()) {
            return Err(StoreError::DuplicateChat {
                chat_id: lobby.chat_id(),
            });
        }

        let chat_id = lobby.chat_id();
        lobbies.insert(chat_id, lobby);
        if let Err(e) = self.persist(&lobbies).await {
            lobbies.remove(&chat_id);
            return Err(e);
        }
        Ok(())
    }

    async fn delete_by_chat(&self, chat_id: ChatId) -> StoreResult<Option<Lobby>> {
        let mut lobbies = self.lobbies.lock().await;
        let Some(removed) = lobbies.remove(&chat_id) else {
            return Ok(None);
        };

        if let Err(e) = self.persist(&lobbies).await {
            lobbies.insert(chat_id, removed);
            return Err(e);
        }
        Ok(Some(removed))
    }

    async fn save(&self, lobby: Lobby) -> StoreResult<()> {
        let mut lobbies = self.lobbies.lock().await;
        let chat_id = lobby.chat_id();
        let previous = lobbies.insert(chat_id, lobby);

        if let Err(e) = self.persist(&lobbies).await {
            match previous {
                Some(previous) => lobbies.insert(chat_id, previous),
                None => lobbies.remove(&chat_id),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.lobbies.lock().await.len())
    }
}
