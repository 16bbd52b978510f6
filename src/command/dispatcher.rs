//! Command dispatch
//!
//! Turns an incoming chat message into a lobby manager call and the reply to
//! send back. Domain errors become friendly replies; store failures are logged
//! and reported with a generic message. Nothing here returns an error to the
//! transport loop.

use crate::command::markup::TelegramMarkdownV2;
use crate::command::parser::{parse_command, Command, CommandError};
use crate::error::LobbyError;
use crate::lobby::roster::{format_roster, notification_text};
use crate::lobby::{Lobby, LobbyManager};
use crate::metrics::MetricsCollector;
use crate::transport::{IncomingMessage, Reply};
use crate::types::{ChatId, Identity};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

pub const LOBBY_CREATED: &str = "Lobby created";
pub const LOBBY_FINISHED: &str = "Lobby finished";
pub const NO_LOBBY: &str = "There's no lobby created";
pub const LOBBY_EXISTS: &str = "A lobby is already created. Finish it before creating a new one";
pub const EMPTY_ROSTER: &str = "Nobody has joined yet";

pub const HELP_TEXT: &str = "\
/create [title] - open a lobby for this chat
/end - close the lobby
/current - show who is in
/set_title <title> - change the lobby title
/in [note] - you're coming
/maybe [note] - you might come
/out [note] - you're not coming
/set_in_for <name>, /set_maybe_for <name>, /set_out_for <name> - set someone else's status
/notify <message> - ping everyone who is in";

/// Routes parsed commands to the lobby manager
#[derive(Clone)]
pub struct CommandDispatcher {
    lobby_manager: LobbyManager,
    metrics_collector: Option<Arc<MetricsCollector>>,
}

impl CommandDispatcher {
    pub fn new(lobby_manager: LobbyManager) -> Self {
        Self {
            lobby_manager,
            metrics_collector: None,
        }
    }

    pub fn with_metrics(
        lobby_manager: LobbyManager,
        metrics_collector: Arc<MetricsCollector>,
    ) -> Self {
        Self {
            lobby_manager,
            metrics_collector: Some(metrics_collector),
        }
    }

    /// Handle one message, returning the reply to send, if any
    ///
    /// Plain chatter and commands meant for other bots produce no reply.
    pub async fn handle(&self, message: &IncomingMessage) -> Option<Reply> {
        let command = match parse_command(&message.text) {
            Ok(command) => command,
            Err(CommandError::MissingParameter { usage }) => {
                return Some(Reply::plain(format!("Usage: {}", usage)));
            }
            Err(e) => {
                debug!("Ignoring message in chat {}: {}", message.chat_id, e);
                return None;
            }
        };

        let start_time = Instant::now();
        let result = self
            .execute(&command, message.chat_id, &message.sender)
            .await;
        let duration = start_time.elapsed();

        if let Some(metrics) = &self.metrics_collector {
            metrics.record_command(command.name(), duration);
            if let Err(e) = &result {
                metrics.record_command_error(command.name(), e.kind());
            }
        }

        match result {
            Ok(reply) => {
                info!(
                    "Handled /{} in chat {} for '{}' in {:.2}ms",
                    command.name(),
                    message.chat_id,
                    message.sender.display_name(),
                    duration.as_secs_f64() * 1000.0
                );
                Some(reply)
            }
            Err(e) => {
                if e.is_domain() {
                    info!(
                        "Declined /{} in chat {}: {}",
                        command.name(),
                        message.chat_id,
                        e
                    );
                }
                Some(self.error_reply(&command, message, e))
            }
        }
    }

    async fn execute(
        &self,
        command: &Command,
        chat_id: ChatId,
        sender: &Identity,
    ) -> Result<Reply, LobbyError> {
        let manager = &self.lobby_manager;

        match command {
            Command::Create { title } => {
                manager.create_lobby(chat_id, title.clone()).await?;
                Ok(Reply::plain(LOBBY_CREATED))
            }
            Command::End => {
                manager.end_lobby(chat_id).await?;
                Ok(Reply::plain(LOBBY_FINISHED))
            }
            Command::Current => Ok(match manager.get_lobby(chat_id).await? {
                Some(lobby) => roster_reply(&lobby),
                None => Reply::plain(NO_LOBBY),
            }),
            Command::SetTitle { title } => {
                let lobby = manager.set_title(chat_id, title.clone()).await?;
                Ok(Reply::plain(format!(
                    "New title set: {}",
                    lobby.title().unwrap_or_default()
                )))
            }
            Command::Join {
                list_type,
                description,
            } => {
                let lobby = manager
                    .join(chat_id, *list_type, sender.clone(), description.clone())
                    .await?;
                Ok(roster_reply(&lobby))
            }
            Command::SetFor { list_type, name } => {
                let lobby = manager
                    .join(chat_id, *list_type, Identity::named(name.as_str()), None)
                    .await?;
                Ok(roster_reply(&lobby))
            }
            Command::Notify { message } => Ok(match manager.get_lobby(chat_id).await? {
                Some(lobby) => {
                    Reply::markdown_v2(notification_text(&lobby, message, &TelegramMarkdownV2))
                }
                None => Reply::plain(NO_LOBBY),
            }),
            Command::Help => Ok(Reply::plain(HELP_TEXT)),
        }
    }

    fn error_reply(
        &self,
        command: &Command,
        message: &IncomingMessage,
        error: LobbyError,
    ) -> Reply {
        match error {
            LobbyError::NotFound { .. } => Reply::plain(NO_LOBBY),
            LobbyError::AlreadyExists { .. } => Reply::plain(LOBBY_EXISTS),
            LobbyError::Store(e) => {
                error!(
                    "Failed to handle /{} in chat {} for '{}': {}",
                    command.name(),
                    message.chat_id,
                    message.sender.display_name(),
                    e
                );
                Reply::plain(format!(
                    "Unexpected error when trying to {}",
                    command.action()
                ))
            }
        }
    }
}

fn roster_reply(lobby: &Lobby) -> Reply {
    let roster = format_roster(lobby);
    if roster.is_empty() {
        Reply::plain(EMPTY_ROSTER)
    } else {
        Reply::plain(roster)
    }
}
