//! Chat transport interface
//!
//! The transport owns the connection to the chat network. It delivers
//! incoming messages and sends replies; the lobby core never talks to it
//! directly.

pub mod console;

pub use console::ConsoleTransport;

use crate::types::{ChatId, Identity};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A message received from a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub chat_id: ChatId,
    pub sender: Identity,
    pub text: String,
}

/// How the transport should interpret a reply's text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ParseMode {
    #[default]
    Plain,
    MarkdownV2,
}

/// A message to send back to a chat
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    pub parse_mode: ParseMode,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::Plain,
        }
    }

    pub fn markdown_v2(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            parse_mode: ParseMode::MarkdownV2,
        }
    }
}

/// Source of incoming messages and sink for replies
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Wait for the next message; `None` once the transport has closed
    async fn next_message(&self) -> anyhow::Result<Option<IncomingMessage>>;

    /// Send a reply to a chat
    async fn send(&self, chat_id: ChatId, reply: &Reply) -> anyhow::Result<()>;
}
