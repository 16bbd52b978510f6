//! Health check endpoints and Prometheus metrics server
//!
//! This module provides HTTP endpoints for health checks and Prometheus
//! metrics using Axum.

use crate::lobby::LobbyManager;
use crate::metrics::collector::MetricsCollector;
use crate::service::health::{HealthCheck, HealthStatus};
use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use prometheus::{Encoder, TextEncoder};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Health server configuration
#[derive(Debug, Clone)]
pub struct HealthServerConfig {
    /// Port to bind the health server to
    pub port: u16,
    /// Host to bind to (typically "0.0.0.0" for all interfaces)
    pub host: String,
    /// Service name reported by `/health`
    pub service_name: String,
}

impl Default for HealthServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            service_name: "roll-call".to_string(),
        }
    }
}

/// Shared state for the health server
#[derive(Clone)]
pub struct HealthServerState {
    pub metrics_collector: Arc<MetricsCollector>,
    pub lobby_manager: Option<LobbyManager>,
    pub service_name: String,
}

/// Health server that provides HTTP endpoints for monitoring
pub struct HealthServer {
    config: HealthServerConfig,
    state: HealthServerState,
    shutdown_tx: broadcast::Sender<()>,
}

impl HealthServer {
    /// Create a new health server
    pub fn new(config: HealthServerConfig, metrics_collector: Arc<MetricsCollector>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        let service_name = config.service_name.clone();

        Self {
            config,
            state: HealthServerState {
                metrics_collector,
                lobby_manager: None,
                service_name,
            },
            shutdown_tx,
        }
    }

    /// Attach the lobby manager whose store backs the health check
    pub fn with_lobby_manager(mut self, lobby_manager: LobbyManager) -> Self {
        self.state.lobby_manager = Some(lobby_manager);
        self
    }

    /// Start the health server and serve until `stop` is called
    pub async fn start(&self) -> Result<()> {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .context("Invalid health server address")?;

        let app = self.create_router();
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind health server to {}", addr))?;

        info!("Health server listening on http://{}", addr);

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
                info!("Health server shutdown signal received");
            })
            .await?;

        info!("Health server stopped");
        Ok(())
    }

    /// Create the Axum router with all health endpoints
    fn create_router(&self) -> Router {
        Router::new()
            .route("/health", get(health_handler))
            .route("/alive", get(alive_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(self.state.clone())
    }

    /// Stop the health server
    pub fn stop(&self) {
        info!("Stopping health server...");

        if let Err(e) = self.shutdown_tx.send(()) {
            warn!("Failed to send shutdown signal to health server: {}", e);
        }
    }
}

/// Health check endpoint handler
async fn health_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Health check requested");

    let Some(manager) = &state.lobby_manager else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "unhealthy",
                "service": state.service_name,
                "version": env!("CARGO_PKG_VERSION"),
                "error": "Service not initialized"
            })),
        );
    };

    let health = HealthCheck::check(manager, &state.service_name).await;
    state
        .metrics_collector
        .update_health_status(health.status.as_gauge());
    if let Some(count) = health.active_lobbies {
        state.metrics_collector.set_active_lobbies(count);
    }

    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(json!(health)))
}

/// Liveness check endpoint handler
async fn alive_handler() -> impl IntoResponse {
    (StatusCode::OK, "Alive")
}

/// Prometheus metrics endpoint handler
async fn metrics_handler(State(state): State<HealthServerState>) -> impl IntoResponse {
    debug!("Metrics endpoint requested");

    let metric_families = state.metrics_collector.registry().gather();
    let encoder = TextEncoder::new();

    match encoder.encode_to_string(&metric_families) {
        Ok(metrics_output) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            metrics_output,
        ),
        Err(e) => {
            error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/plain".to_string())],
                "Failed to encode metrics".to_string(),
            )
        }
    }
}
