mod bootstrap;
mod chat;
mod health;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use wardstock_core::config::{AppConfig, LoadOptions};

fn init_logging(config: &AppConfig) {
    use tracing::Level;
    use wardstock_core::config::LogFormat::*;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);
    run(config).await
}

pub async fn run(config: AppConfig) -> Result<()> {
    let app = bootstrap::bootstrap_with_config(config).await?;

    spawn_session_sweeper(
        Arc::clone(&app.runtime),
        app.config.session.sweep_interval_secs,
    );

    let router = health::router(app.db_pool.clone()).merge(chat::router(chat::ChatState {
        runtime: Arc::clone(&app.runtime),
        orders: Arc::clone(&app.orders),
    }));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "wardstock-server listening"
    );

    let shutdown_grace = Duration::from_secs(app.config.server.graceful_shutdown_secs);
    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown(shutdown_grace)).await?;

    tracing::info!(
        event_name = "system.server.stopped",
        correlation_id = "shutdown",
        "wardstock-server stopped"
    );
    Ok(())
}

fn spawn_session_sweeper(runtime: Arc<wardstock_agent::AgentRuntime>, interval_secs: u64) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let reaped = runtime.sessions().sweep(chrono::Utc::now()).await;
            if reaped > 0 {
                tracing::debug!(
                    event_name = "system.sessions.swept",
                    reaped,
                    "expired conversation sessions reaped"
                );
            }
        }
    });
}

async fn wait_for_shutdown(grace: Duration) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        grace_secs = grace.as_secs(),
        "shutdown signal received"
    );
}
