//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the roll-call service using
//! Prometheus metrics.

use crate::types::ListType;
use anyhow::Result;
use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the roll-call service
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Command handling metrics
    command_metrics: CommandMetrics,

    /// Lobby-related metrics
    lobby_metrics: LobbyMetrics,
}

/// Command handling metrics
#[derive(Clone)]
pub struct CommandMetrics {
    /// Commands handled, by command name
    pub commands_total: IntCounterVec,

    /// Commands that failed, by command name and error kind
    pub command_errors_total: IntCounterVec,

    /// Time spent handling a command
    pub command_duration: HistogramVec,

    /// Health check status (0=unhealthy, 1=degraded, 2=healthy)
    pub health_status: IntGauge,
}

/// Lobby-related metrics
#[derive(Clone)]
pub struct LobbyMetrics {
    /// Total lobbies created
    pub lobbies_created_total: IntCounter,

    /// Total lobbies ended
    pub lobbies_ended_total: IntCounter,

    /// Joins by target list
    pub joins_total: IntCounterVec,

    /// Open lobbies as last observed
    pub active_lobbies: IntGauge,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let command_metrics = CommandMetrics::new(&registry)?;
        let lobby_metrics = LobbyMetrics::new(&registry)?;

        Ok(Self {
            registry,
            command_metrics,
            lobby_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    /// Get command metrics
    pub fn command(&self) -> &CommandMetrics {
        &self.command_metrics
    }

    /// Get lobby metrics
    pub fn lobby(&self) -> &LobbyMetrics {
        &self.lobby_metrics
    }

    /// Record a handled command and how long it took
    pub fn record_command(&self, command: &str, duration: Duration) {
        self.command_metrics
            .commands_total
            .with_label_values(&[command])
            .inc();

        self.command_metrics
            .command_duration
            .with_label_values(&[command])
            .observe(duration.as_secs_f64());
    }

    /// Record a command that ended in an error
    pub fn record_command_error(&self, command: &str, kind: &str) {
        self.command_metrics
            .command_errors_total
            .with_label_values(&[command, kind])
            .inc();
    }

    /// Record a lobby being created
    pub fn record_lobby_created(&self) {
        self.lobby_metrics.lobbies_created_total.inc();
        self.lobby_metrics.active_lobbies.inc();
    }

    /// Record a lobby being ended
    pub fn record_lobby_ended(&self) {
        self.lobby_metrics.lobbies_ended_total.inc();
        self.lobby_metrics.active_lobbies.dec();
    }

    /// Record a participant landing on a list
    pub fn record_join(&self, list_type: ListType) {
        self.lobby_metrics
            .joins_total
            .with_label_values(&[list_type.as_str()])
            .inc();
    }

    /// Overwrite the open lobby gauge with a value read from the store
    pub fn set_active_lobbies(&self, count: usize) {
        self.lobby_metrics.active_lobbies.set(count as i64);
    }

    /// Update health status
    pub fn update_health_status(&self, status: u8) {
        self.command_metrics.health_status.set(status as i64);
    }
}

impl CommandMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let commands_total = IntCounterVec::new(
            Opts::new("roll_call_commands_total", "Total chat commands handled"),
            &["command"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let command_errors_total = IntCounterVec::new(
            Opts::new(
                "roll_call_command_errors_total",
                "Chat commands that ended in an error",
            ),
            &["command", "kind"],
        )?;
        registry.register(Box::new(command_errors_total.clone()))?;

        let command_duration = HistogramVec::new(
            HistogramOpts::new(
                "roll_call_command_duration_seconds",
                "Time spent handling a chat command",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["command"],
        )?;
        registry.register(Box::new(command_duration.clone()))?;

        let health_status = IntGauge::new(
            "roll_call_health_status",
            "Health status (0=unhealthy, 1=degraded, 2=healthy)",
        )?;
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            commands_total,
            command_errors_total,
            command_duration,
            health_status,
        })
    }
}

impl LobbyMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let lobbies_created_total =
            IntCounter::new("roll_call_lobbies_created_total", "Total lobbies created")?;
        registry.register(Box::new(lobbies_created_total.clone()))?;

        let lobbies_ended_total =
            IntCounter::new("roll_call_lobbies_ended_total", "Total lobbies ended")?;
        registry.register(Box::new(lobbies_ended_total.clone()))?;

        let joins_total = IntCounterVec::new(
            Opts::new("roll_call_joins_total", "Participants placed on a list"),
            &["list"],
        )?;
        registry.register(Box::new(joins_total.clone()))?;

        let active_lobbies = IntGauge::new("roll_call_active_lobbies", "Open lobbies")?;
        registry.register(Box::new(active_lobbies.clone()))?;

        Ok(Self {
            lobbies_created_total,
            lobbies_ended_total,
            joins_total,
            active_lobbies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector_creation() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        let _command = collector.command();
        let _lobby = collector.lobby();
        assert!(!collector.registry().gather().is_empty());
    }

    #[test]
    fn test_command_recording() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.record_command("in", Duration::from_millis(3));
        collector.record_command("in", Duration::from_millis(5));
        collector.record_command_error("end", "not_found");

        let commands = &collector.command().commands_total;
        assert_eq!(commands.with_label_values(&["in"]).get(), 2);
        assert_eq!(
            collector
                .command()
                .command_errors_total
                .with_label_values(&["end", "not_found"])
                .get(),
            1
        );
    }

    #[test]
    fn test_lobby_gauge_follows_lifecycle() {
        let collector = MetricsCollector::new().expect("Failed to create metrics collector");

        collector.set_active_lobbies(3);
        collector.record_lobby_created();
        collector.record_lobby_ended();
        collector.record_lobby_ended();

        assert_eq!(collector.lobby().active_lobbies.get(), 2);
        assert_eq!(collector.lobby().lobbies_created_total.get(), 1);
        assert_eq!(collector.lobby().lobbies_ended_total.get(), 2);
    }
}
