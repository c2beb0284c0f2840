// Goals dashboard server entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config (copying defaults/ into config/ on first run)
// 3. Build the stats proxy and dashboard layout
// 4. Bind the HTTP listener
// 5. Serve until Ctrl+C

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::{error, info};

use blues_app::DashboardLayout;
use blues_server::http_server::{self, AppState};
use blues_stats::StatsProxy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Goals dashboard starting up");

    let config = blues_core::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} groups, {} players, season {}",
        config.roster.groups.len(),
        config.roster.player_count(),
        config.upstream.current_season
    );

    let stats =
        StatsProxy::from_config(&config.upstream).context("failed to build stats client")?;
    info!("Stats proxy using {}", config.upstream.base_url);

    let state = AppState::new(
        Arc::new(stats),
        Arc::new(DashboardLayout::from_config(&config)),
    );

    let addr = config.server.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {addr}"))?;

    http_server::run(listener, state, shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Goals dashboard shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl+C received, shutting down"),
        Err(e) => {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    }
}

/// Initialize tracing to stderr, filtered by `RUST_LOG` when set.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                EnvFilter::new("blues_server=info,blues_app=info,blues_stats=info,warn")
            }),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
