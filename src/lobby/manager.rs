//! Lobby manager implementation
//!
//! This module provides the LobbyManager that enforces one open lobby per
//! chat and one list per participant. It holds no lobby state of its own:
//! every operation is a load-modify-persist cycle against the store.

use crate::error::{LobbyError, Result, StoreError};
use crate::lobby::instance::Lobby;
use crate::lobby::store::LobbyStore;
use crate::metrics::MetricsCollector;
use crate::types::{ChatId, Identity, ListType};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The main lobby manager
#[derive(Clone)]
pub struct LobbyManager {
    /// Persistence collaborator
    store: Arc<dyn LobbyStore>,
    /// Metrics collector for recording lobby activity
    metrics_collector: Option<Arc<MetricsCollector>>,
}

impl LobbyManager {
    /// Create a new lobby manager
    pub fn new(store: Arc<dyn LobbyStore>) -> Self {
        Self {
            store,
            metrics_collector: None,
        }
    }

    /// Create a new lobby manager with metrics collector
    pub fn with_metrics(
        store: Arc<dyn LobbyStore>,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            store,
            metrics_collector: Some(metrics_collector),
        }
    }

    /// The lobby for a chat, or `None` if there is no open lobby
    pub async fn get_lobby(&self, chat_id: ChatId) -> Result<Option<Lobby>> {
        Ok(self.store.find_by_chat(chat_id).await?)
    }

    /// Open a new lobby for a chat
    pub async fn create_lobby(&self, chat_id: ChatId, title: Option<String>) -> Result<Lobby> {
        if self.store.find_by_chat(chat_id).await?.is_some() {
            info!("Lobby already open for chat {}", chat_id);
            return Err(LobbyError::AlreadyExists { chat_id });
        }

        let lobby = Lobby::new(chat_id, title);
        match self.store.create(lobby.clone()).await {
            Ok(()) => {}
            Err(StoreError::DuplicateChat { .. }) => {
                warn!(
                    "Lobby for chat {} was created concurrently, rejecting duplicate",
                    chat_id
                );
                return Err(LobbyError::AlreadyExists { chat_id });
            }
            Err(e) => return Err(e.into()),
        }

        if let Some(metrics) = &self.metrics_collector {
            metrics.record_lobby_created();
        }

        info!(
            "Created lobby {} for chat {} (title: {:?})",
            lobby.id(),
            chat_id,
            lobby.title()
        );
        Ok(lobby)
    }

    /// Close the lobby for a chat, returning the deleted snapshot
    pub async fn end_lobby(&self, chat_id: ChatId) -> Result<Lobby> {
        let lobby = self
            .store
            .delete_by_chat(chat_id)
            .await?
            .ok_or(LobbyError::NotFound { chat_id })?;

        if let Some(metrics) = &self.metrics_collector {
            metrics.record_lobby_ended();
        }

        info!(
            "Ended lobby {} for chat {} with {} participants",
            lobby.id(),
            chat_id,
            lobby.participant_count()
        );
        Ok(lobby)
    }

    /// Replace the title of the open lobby
    pub async fn set_title(&self, chat_id: ChatId, title: String) -> Result<Lobby> {
        let mut lobby = self.load(chat_id).await?;
        lobby.set_title(title);
        self.store.save(lobby.clone()).await?;

        info!("Set title of lobby {} to {:?}", lobby.id(), lobby.title());
        Ok(lobby)
    }

    /// Put a participant on `list_type`, moving them off any other list
    ///
    /// Participants are matched by display name. Joining the list one is
    /// already on moves them to its end and replaces the description.
    pub async fn join(
        &self,
        chat_id: ChatId,
        list_type: ListType,
        identity: Identity,
        description: Option<String>,
    ) -> Result<Lobby> {
        let mut lobby = self.load(chat_id).await?;

        let display_name = identity.display_name().to_string();
        if let Some((previous, position)) = lobby.find(&display_name) {
            debug!(
                "Moving '{}' from {} (position {}) to {} in lobby {}",
                display_name,
                previous,
                position + 1,
                list_type,
                lobby.id()
            );
        }

        lobby.place(list_type, identity, description);
        self.store.save(lobby.clone()).await?;

        if let Some(metrics) = &self.metrics_collector {
            metrics.record_join(list_type);
        }

        info!(
            "'{}' joined {} in lobby {} for chat {} ({} in, {} maybe, {} out)",
            display_name,
            list_type,
            lobby.id(),
            chat_id,
            lobby.list(ListType::In).len(),
            lobby.list(ListType::Maybe).len(),
            lobby.list(ListType::Out).len()
        );
        Ok(lobby)
    }

    /// Number of open lobbies across all chats
    pub async fn active_lobbies(&self) -> Result<usize> {
        Ok(self.store.count().await?)
    }

    async fn load(&self, chat_id: ChatId) -> Result<Lobby> {
        self.store
            .find_by_chat(chat_id)
            .await?
            .ok_or(LobbyError::NotFound { chat_id })
    }
}
