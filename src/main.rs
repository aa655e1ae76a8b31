// Load and validate the route config
// Set up logging
// Open the swap database
// Report pending swaps for the configured chain
// Reload routes on SIGHUP until shutdown

use swap_ledger::{
    config::{ConfigHandle, Settings},
    db::connection,
    state::AppState,
    SwapLedger, SwapStore,
};

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting swap-ledger");

    let settings = Settings::from_env();

    // A bad config must never run
    let config = match ConfigHandle::load(&settings.config_file) {
        Ok(config) => Arc::new(config),
        Err(e) => {
            error!("Load config failed: {}", e);
            return Err(e.into());
        }
    };

    let ledger = if config.database().enable {
        let database_url = settings.database_url(config.database());
        let pool =
            connection::establish_connection(&database_url, settings.database_max_connections)
                .await?;
        info!("Database connection established: {}", database_url);
        Some(SwapLedger::new(SwapStore::new(pool)))
    } else {
        info!("Database disabled in config");
        None
    };

    let state = Arc::new(AppState { config, ledger });

    if let Some(ledger) = &state.ledger {
        let chain = &state.config.database().block_chain;
        let pending = ledger.list_pending(chain).await?;
        info!(chain = %chain, count = pending.len(), "Pending swaps waiting for confirmation");
    }

    let shutdown = CancellationToken::new();
    let reload_state = state.clone();
    let reload_shutdown = shutdown.clone();
    let reload_handle = tokio::spawn(async move {
        watch_reload(reload_state, reload_shutdown).await;
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received");
    shutdown.cancel();
    let _ = reload_handle.await;

    if let Some(ledger) = &state.ledger {
        ledger.store().pool().close().await;
    }

    Ok(())
}

#[cfg(unix)]
async fn watch_reload(state: Arc<AppState>, shutdown: CancellationToken) {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(hangup) => hangup,
        Err(e) => {
            error!("Failed to listen for SIGHUP: {}", e);
            return;
        }
    };

    loop {
        tokio::select! {
            _ = hangup.recv() => {
                // failures are logged by reload and leave the old routes live
                let _ = state.config.reload();
            }
            _ = shutdown.cancelled() => {
                info!("Shutting down config reload watcher");
                break;
            }
        }
    }
}

#[cfg(not(unix))]
async fn watch_reload(_state: Arc<AppState>, shutdown: CancellationToken) {
    shutdown.cancelled().await;
}
