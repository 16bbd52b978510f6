//! Service layer for the roll-call service
//!
//! This module contains the main application state and health checks.

pub mod app;
pub mod health;

pub use app::{AppState, ServiceError};
pub use health::{HealthCheck, HealthStatus};
