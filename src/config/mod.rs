//! Configuration management for the roll-call service
//!
//! This module handles configuration loading from environment variables and
//! TOML files, validation, and default values.

pub mod app;
pub mod storage;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use storage::{StorageBackend, StorageSettings};
