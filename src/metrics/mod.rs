//! Metrics and monitoring for the roll-call service
//!
//! Prometheus counters for commands and lobby activity, plus the HTTP server
//! exposing them alongside a health check.

pub mod collector;
pub mod health;

pub use collector::{CommandMetrics, LobbyMetrics, MetricsCollector};
pub use health::{HealthServer, HealthServerConfig};
