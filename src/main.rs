//! Main entry point for the Roll Call service
//!
//! Loads configuration, initializes logging and the lobby store, then feeds
//! chat messages from the console transport through the command dispatcher
//! until input closes or a shutdown signal arrives.

use anyhow::Result;
use clap::Parser;
use roll_call::config::{validate_config, AppConfig, StorageBackend};
use roll_call::service::{AppState, HealthCheck};
use roll_call::transport::ConsoleTransport;
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info, warn};

/// Roll Call - attendance lobbies for group chats
#[derive(Parser)]
#[command(
    name = "roll-call",
    version,
    about = "Attendance lobbies for group chats",
    long_about = "Roll Call keeps one open lobby per chat with in, maybe and out lists. \
                 Messages are read from stdin as `<chat_id> <user> <text>` lines, where \
                 <user> is `username#telegram_id` or a bare name."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Health port override
    #[arg(long, value_name = "PORT", help = "Override health server port")]
    health_port: Option<u16>,

    /// Disable the health server
    #[arg(long, help = "Do not serve health and metrics endpoints")]
    no_health_server: bool,

    /// Storage backend override
    #[arg(long, value_name = "BACKEND", help = "Lobby storage backend (memory, json)")]
    storage: Option<StorageBackend>,

    /// Storage path override
    #[arg(long, value_name = "FILE", help = "File used by the json storage backend")]
    storage_path: Option<PathBuf>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(
        long,
        help = "Validate configuration and exit without starting service"
    )]
    dry_run: bool,
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C) signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

/// Display startup banner with service information
fn display_startup_banner(config: &AppConfig) {
    info!("📋 Roll Call");
    info!("   Service: {}", config.service.name);
    info!("   Log level: {}", config.service.log_level);
    if config.service.enable_health_server {
        info!("   Health port: {}", config.service.health_port);
    } else {
        info!("   Health server: disabled");
    }
    match config.storage.backend {
        StorageBackend::Memory => info!("   Storage: memory"),
        StorageBackend::Json => info!("   Storage: json ({})", config.storage.path.display()),
    }
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// Load and merge configuration from environment, config file and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path)?
    } else {
        AppConfig::from_env()?
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(health_port) = args.health_port {
        config.service.health_port = health_port;
    }

    if args.no_health_server {
        config.service.enable_health_server = false;
    }

    if let Some(storage) = args.storage {
        config.storage.backend = storage;
    }

    if let Some(storage_path) = &args.storage_path {
        config.storage.path = storage_path.clone();
    }

    validate_config(&config)?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("Configuration validation successful");
        display_startup_banner(&config);
        info!("Dry run completed - exiting without starting service");
        return Ok(());
    }

    display_startup_banner(&config);

    info!("Initializing service components...");
    let shutdown_timeout = config.shutdown_timeout();
    let mut app_state = match AppState::new(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize application: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app_state.start().await {
        error!("Failed to start service: {}", e);
        std::process::exit(1);
    }

    let health = HealthCheck::check(
        app_state.lobby_manager(),
        &app_state.config().service.name,
    )
    .await;
    info!("Health check: {}", health.status);

    info!("✅ Roll Call is running, reading messages from stdin");
    let transport = ConsoleTransport::stdio();

    tokio::select! {
        result = app_state.run(&transport) => {
            if let Err(e) = result {
                error!("Transport failed: {:#}", e);
            }
        }
        _ = wait_for_shutdown_signal() => {
            info!("🛑 Shutdown signal received, beginning graceful shutdown...");
        }
    }

    match tokio::time::timeout(shutdown_timeout, app_state.stop()).await {
        Ok(()) => info!("✅ Graceful shutdown completed successfully"),
        Err(_) => warn!("⚠️  Shutdown timeout exceeded, forcing exit"),
    }

    Ok(())
}
