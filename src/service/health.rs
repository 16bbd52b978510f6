//! Health checks for the roll-call service

use crate::lobby::LobbyManager;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, error};

/// Health check status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Gauge value exported to Prometheus
    pub fn as_gauge(&self) -> u8 {
        match self {
            HealthStatus::Healthy => 2,
            HealthStatus::Degraded => 1,
            HealthStatus::Unhealthy => 0,
        }
    }
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Healthy => write!(f, "✅ healthy"),
            HealthStatus::Degraded => write!(f, "⚠️  degraded"),
            HealthStatus::Unhealthy => write!(f, "❌ unhealthy"),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheck {
    /// Overall service status
    pub status: HealthStatus,
    /// Service name
    pub service: String,
    /// Crate version
    pub version: String,
    /// Current timestamp
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// Open lobbies, when the store could be reached
    pub active_lobbies: Option<usize>,
    /// Time taken to query the store
    pub store_latency_ms: u64,
    /// Error from the store, if any
    pub message: Option<String>,
}

/// Store round trips slower than this report as degraded
const DEGRADED_LATENCY_MS: u64 = 1000;

impl HealthCheck {
    /// Probe the lobby store through the manager
    pub async fn check(manager: &LobbyManager, service: &str) -> Self {
        let start_time = Instant::now();
        let result = manager.active_lobbies().await;
        let store_latency_ms = start_time.elapsed().as_millis() as u64;

        let (status, active_lobbies, message) = match result {
            Ok(count) if store_latency_ms > DEGRADED_LATENCY_MS => {
                debug!("Lobby store slow to respond: {}ms", store_latency_ms);
                (HealthStatus::Degraded, Some(count), None)
            }
            Ok(count) => (HealthStatus::Healthy, Some(count), None),
            Err(e) => {
                error!("Health check could not reach lobby store: {}", e);
                (HealthStatus::Unhealthy, None, Some(e.to_string()))
            }
        };

        Self {
            status,
            service: service.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: chrono::Utc::now(),
            active_lobbies,
            store_latency_ms,
            message,
        }
    }
}
