//! Main application state and service coordination
//!
//! This module contains the AppState that wires the lobby store, manager,
//! command dispatcher and metrics together, and pumps a chat transport.

use crate::command::CommandDispatcher;
use crate::config::{AppConfig, StorageBackend};
use crate::lobby::{InMemoryLobbyStore, JsonFileLobbyStore, LobbyManager, LobbyStore};
use crate::metrics::{HealthServer, HealthServerConfig, MetricsCollector};
use crate::transport::ChatTransport;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Service-level errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Storage initialization error: {message}")]
    Storage { message: String },

    #[error("Service initialization error: {message}")]
    Initialization { message: String },
}

/// Main application state containing all service components
pub struct AppState {
    /// Application configuration
    config: AppConfig,

    /// Core lobby component
    lobby_manager: LobbyManager,

    /// Command layer in front of the lobby manager
    dispatcher: CommandDispatcher,

    /// Metrics shared by the manager, dispatcher and health server
    metrics_collector: Arc<MetricsCollector>,

    /// Health and metrics HTTP server, when enabled
    health_server: Option<Arc<HealthServer>>,

    /// Background task handles
    background_tasks: Vec<JoinHandle<()>>,

    /// Service status
    is_running: Arc<RwLock<bool>>,
}

impl AppState {
    /// Initialize the application with all dependencies
    pub async fn new(config: AppConfig) -> Result<Self, ServiceError> {
        info!("Initializing {} service", config.service.name);

        let metrics_collector =
            Arc::new(
                MetricsCollector::new().map_err(|e| ServiceError::Initialization {
                    message: format!("Failed to create metrics collector: {}", e),
                })?,
            );

        let store = Self::initialize_store(&config).await?;
        let lobby_manager = LobbyManager::with_metrics(store, metrics_collector.clone());

        match lobby_manager.active_lobbies().await {
            Ok(count) => {
                metrics_collector.set_active_lobbies(count);
                info!("Lobby store ready with {} open lobbies", count);
            }
            Err(e) => {
                return Err(ServiceError::Storage {
                    message: format!("Lobby store is not readable: {}", e),
                })
            }
        }

        let dispatcher =
            CommandDispatcher::with_metrics(lobby_manager.clone(), metrics_collector.clone());

        let health_server = if config.service.enable_health_server {
            let server_config = HealthServerConfig {
                port: config.service.health_port,
                service_name: config.service.name.clone(),
                ..HealthServerConfig::default()
            };
            Some(Arc::new(
                HealthServer::new(server_config, metrics_collector.clone())
                    .with_lobby_manager(lobby_manager.clone()),
            ))
        } else {
            None
        };

        Ok(Self {
            config,
            lobby_manager,
            dispatcher,
            metrics_collector,
            health_server,
            background_tasks: Vec::new(),
            is_running: Arc::new(RwLock::new(false)),
        })
    }

    /// Build the configured lobby store
    async fn initialize_store(config: &AppConfig) -> Result<Arc<dyn LobbyStore>, ServiceError> {
        match config.storage.backend {
            StorageBackend::Memory => {
                warn!("Using in-memory lobby store; lobbies are lost on restart");
                Ok(Arc::new(InMemoryLobbyStore::new()))
            }
            StorageBackend::Json => {
                let store = JsonFileLobbyStore::open(&config.storage.path)
                    .await
                    .map_err(|e| ServiceError::Storage {
                        message: format!(
                            "Failed to open {}: {}",
                            config.storage.path.display(),
                            e
                        ),
                    })?;
                Ok(Arc::new(store))
            }
        }
    }

    /// Start background components
    pub async fn start(&mut self) -> Result<(), ServiceError> {
        if *self.is_running.read().await {
            return Err(ServiceError::Initialization {
                message: "Service is already running".to_string(),
            });
        }

        if let Some(server) = &self.health_server {
            let server = server.clone();
            let handle = tokio::spawn(async move {
                if let Err(e) = server.start().await {
                    error!("Health server failed: {}", e);
                }
            });
            self.background_tasks.push(handle);
        }

        *self.is_running.write().await = true;
        info!("Service started");
        Ok(())
    }

    /// Feed every message from the transport through the dispatcher
    ///
    /// Messages are handled one at a time in arrival order. Returns when the
    /// transport closes or the service is stopped.
    pub async fn run<T>(&self, transport: &T) -> anyhow::Result<()>
    where
        T: ChatTransport + ?Sized,
    {
        while self.is_running().await {
            let message = match transport.next_message().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!("Transport closed");
                    break;
                }
                Err(e) => {
                    error!("Failed to receive message: {}", e);
                    return Err(e);
                }
            };

            let Some(reply) = self.dispatcher.handle(&message).await else {
                continue;
            };

            if let Err(e) = transport.send(message.chat_id, &reply).await {
                // One chat failing to receive must not stop the others
                warn!("Failed to send reply to chat {}: {}", message.chat_id, e);
            } else {
                debug!("Replied to chat {}", message.chat_id);
            }
        }

        Ok(())
    }

    /// Stop background components
    pub async fn stop(&mut self) {
        info!("Stopping service components...");
        *self.is_running.write().await = false;

        if let Some(server) = &self.health_server {
            server.stop();
        }

        for handle in self.background_tasks.drain(..) {
            if let Err(e) = handle.await {
                warn!("Background task ended abnormally: {}", e);
            }
        }

        info!("Service stopped");
    }

    /// Whether the service is accepting messages
    pub async fn is_running(&self) -> bool {
        *self.is_running.read().await
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn lobby_manager(&self) -> &LobbyManager {
        &self.lobby_manager
    }

    pub fn dispatcher(&self) -> &CommandDispatcher {
        &self.dispatcher
    }

    pub fn metrics_collector(&self) -> Arc<MetricsCollector> {
        self.metrics_collector.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ConsoleTransport;
    use tempfile::TempDir;

    fn test_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.service.enable_health_server = false;
        config
    }

    #[tokio::test]
    async fn test_console_session() {
        let mut app_state = AppState::new(test_config()).await.unwrap();
        app_state.start().await.unwrap();

        let input = "\
7 alice#1 /create Friday Game
7 bob#2 /maybe might be late
7 alice#1 /in
8 carol#3 /in
7 alice#1 /current
";
        let transport = ConsoleTransport::new(input.as_bytes(), Vec::new());
        app_state.run(&transport).await.unwrap();
        app_state.stop().await;

        let output = String::from_utf8(transport.into_output()).unwrap();
        let expected = "\
[7] Lobby created
[7] Friday Game

Maybe:
1. bob (might be late)
[7] Friday Game
1. alice

Maybe:
1. bob (might be late)
[8] There's no lobby created
[7] Friday Game
1. alice

Maybe:
1. bob (might be late)
";
        assert_eq!(output, expected);
    }

    #[tokio::test]
    async fn test_json_backend_restores_lobbies() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config();
        config.storage.backend = StorageBackend::Json;
        config.storage.path = temp_dir.path().join("lobbies.json");

        {
            let app_state = AppState::new(config.clone()).await.unwrap();
            app_state.lobby_manager().create_lobby(9, None).await.unwrap();
        }

        let app_state = AppState::new(config).await.unwrap();
        assert!(app_state.lobby_manager().get_lobby(9).await.unwrap().is_some());
        assert_eq!(app_state.metrics_collector().lobby().active_lobbies.get(), 1);
    }

    #[tokio::test]
    async fn test_not_running_until_started() {
        let mut app_state = AppState::new(test_config()).await.unwrap();
        assert!(!app_state.is_running().await);

        app_state.start().await.unwrap();
        assert!(app_state.is_running().await);
        assert!(app_state.start().await.is_err());

        app_state.stop().await;
        assert!(!app_state.is_running().await);
    }

    #[tokio::test]
    async fn test_corrupt_store_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config();
        config.storage.backend = StorageBackend::Json;
        config.storage.path = temp_dir.path().join("lobbies.json");
        std::fs::write(&config.storage.path, "{ not json").unwrap();

        let result = AppState::new(config).await;
        assert!(matches!(result, Err(ServiceError::Storage { .. })));
    }
}
