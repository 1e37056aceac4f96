//! Teams DB Agent entry point.
//!
//! Starts either the Bot Framework HTTP endpoint or the interactive console,
//! depending on `BOT_TRANSPORT`.
//!
//! Features:
//! - Graceful shutdown with turn draining
//! - Signal handling (SIGTERM, SIGINT)
//! - Periodic eviction of idle conversations

use anyhow::Result;
use std::sync::Arc;
use teams_db_agent::agent::CommandAgent;
use teams_db_agent::database::SqlServerBackend;
use teams_db_agent::history::{spawn_cleanup_task, ConversationStore};
use teams_db_agent::shutdown::{install_signal_handlers, new_shutdown_controller};
use teams_db_agent::tools::default_registry;
use teams_db_agent::transfer::TransferExecutor;
use teams_db_agent::transport::TransportType;
use teams_db_agent::{Config, TeamsBot};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the console transport
    init_logging();

    let config = Config::from_env()?;
    info!(
        "Teams DB Agent v{} starting (transport: {}, server: {})",
        env!("CARGO_PKG_VERSION"),
        config.transport.transport_type,
        config.database.server
    );

    let shutdown_controller = new_shutdown_controller(config.drain_timeout);
    install_signal_handlers(shutdown_controller.clone());

    let backend = SqlServerBackend::new(Arc::new(config.database.clone()));
    let executor = Arc::new(TransferExecutor::new(backend));
    let agent = Arc::new(CommandAgent::new(default_registry(executor)));
    let store = Arc::new(ConversationStore::new(config.history.clone()));
    let bot = Arc::new(TeamsBot::new(agent.clone(), store.clone()));

    let cleanup = spawn_cleanup_task(store.clone());

    match config.transport.transport_type {
        TransportType::Console => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            teams_db_agent::console::run_console(
                agent.as_ref(),
                &store,
                stdin,
                tokio::io::stdout(),
                shutdown_controller.signal(),
            )
            .await?;
        }
        #[cfg(feature = "http")]
        TransportType::Http => {
            teams_db_agent::transport::http_server::start_http_server_with_shutdown(
                bot.clone(),
                &config.transport.host,
                config.transport.port,
                shutdown_controller.signal(),
            )
            .await?;
        }
    }

    cleanup.abort();
    shutdown_controller.graceful_shutdown(&bot).await;
    info!("Shutdown complete");

    Ok(())
}

/// Initialize tracing subscriber with stderr output.
fn init_logging() {
    let filter = std::env::var("RUST_LOG")
        .map(EnvFilter::new)
        .unwrap_or_else(|_| EnvFilter::new("warn,teams_db_agent=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
