//! Test fixtures and mock implementations for integration testing

#![allow(dead_code)]

use async_trait::async_trait;
use roll_call::error::StoreResult;
use roll_call::lobby::{InMemoryLobbyStore, Lobby, LobbyStore};
use roll_call::transport::{ChatTransport, IncomingMessage, Reply};
use roll_call::types::{ChatId, Identity};
use roll_call::StoreError;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Transport that replays scripted messages and records every reply
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    incoming: Mutex<VecDeque<IncomingMessage>>,
    sent: Mutex<Vec<(ChatId, Reply)>>,
    fail_sends_to: Option<ChatId>,
}

impl ScriptedTransport {
    pub fn new(messages: Vec<IncomingMessage>) -> Self {
        Self {
            incoming: Mutex::new(messages.into()),
            sent: Mutex::new(Vec::new()),
            fail_sends_to: None,
        }
    }

    /// Make every send to `chat_id` fail
    pub fn failing_sends_to(mut self, chat_id: ChatId) -> Self {
        self.fail_sends_to = Some(chat_id);
        self
    }

    /// All replies delivered so far, in order
    pub fn sent(&self) -> Vec<(ChatId, Reply)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }

    /// Reply texts delivered to one chat
    pub fn texts_for(&self, chat_id: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, reply)| reply.text)
            .collect()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn next_message(&self) -> anyhow::Result<Option<IncomingMessage>> {
        Ok(self
            .incoming
            .lock()
            .map_err(|_| anyhow::anyhow!("incoming queue poisoned"))?
            .pop_front())
    }

    async fn send(&self, chat_id: ChatId, reply: &Reply) -> anyhow::Result<()> {
        if self.fail_sends_to == Some(chat_id) {
            anyhow::bail!("chat {} is unreachable", chat_id);
        }
        self.sent
            .lock()
            .map_err(|_| anyhow::anyhow!("sent log poisoned"))?
            .push((chat_id, reply.clone()));
        Ok(())
    }
}

/// In-memory store whose writes can be switched off
#[derive(Default)]
pub struct FlakyLobbyStore {
    inner: InMemoryLobbyStore,
    failing: AtomicBool,
}

impl FlakyLobbyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable {
                message: "store offline".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LobbyStore for FlakyLobbyStore {
    async fn find_by_chat(&self, chat_id: ChatId) -> StoreResult<Option<Lobby>> {
        self.inner.find_by_chat(chat_id).await
    }

    async fn create(&self, lobby: Lobby) -> StoreResult<()> {
        self.check()?;
        self.inner.create(lobby).await
    }

    async fn delete_by_chat(&self, chat_id: ChatId) -> StoreResult<Option<Lobby>> {
        self.check()?;
        self.inner.delete_by_chat(chat_id).await
    }

    async fn save(&self, lobby: Lobby) -> StoreResult<()> {
        self.check()?;
        self.inner.save(lobby).await
    }

    async fn count(&self) -> StoreResult<usize> {
        self.inner.count().await
    }
}

/// Message from a user with a transport id and username
pub fn user_message(
    chat_id: ChatId,
    telegram_id: i64,
    username: &str,
    text: &str,
) -> IncomingMessage {
    IncomingMessage {
        chat_id,
        sender: user(telegram_id, username),
        text: text.to_string(),
    }
}

pub fn user(telegram_id: i64, username: &str) -> Identity {
    Identity::user(telegram_id, Some(username.to_string()), None)
}

pub fn shared_flaky_store() -> Arc<FlakyLobbyStore> {
    Arc::new(FlakyLobbyStore::new())
}
