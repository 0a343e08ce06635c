use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use wardstock_agent::{AgentRuntime, Executor, HttpLlmClient, ResponseComposer};
use wardstock_core::config::{AppConfig, ConfigError, LlmProvider, LoadOptions};
use wardstock_core::errors::ApplicationError;
use wardstock_db::{
    connect_from_config, migrations, DbPool, OrderRepository, SqlInventoryRepository,
    SqlOrderRepository, SqlTransferRepository,
};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runtime: Arc<AgentRuntime>,
    pub orders: Arc<dyn OrderRepository>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("agent runtime initialization failed: {0}")]
    Runtime(#[source] ApplicationError),
    #[error("llm client initialization failed: {0}")]
    Llm(#[source] anyhow::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_from_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let inventory = Arc::new(SqlInventoryRepository::new(db_pool.clone()));
    let orders: Arc<dyn OrderRepository> = Arc::new(SqlOrderRepository::new(db_pool.clone()));
    let transfers = Arc::new(SqlTransferRepository::new(db_pool.clone()));
    let executor = Executor::new(inventory, Arc::clone(&orders), transfers);

    let composer = match config.llm.provider {
        LlmProvider::Disabled => ResponseComposer::deterministic(),
        LlmProvider::OpenAi | LlmProvider::Gemini => {
            let client = HttpLlmClient::from_config(&config.llm).map_err(BootstrapError::Llm)?;
            ResponseComposer::with_llm(
                Arc::new(client),
                config.llm.timeout_secs,
                config.llm.max_retries,
            )
        }
    };

    let runtime = AgentRuntime::initialize(executor, composer, config.session.ttl_secs)
        .await
        .map_err(BootstrapError::Runtime)?;
    info!(
        event_name = "system.bootstrap.runtime_ready",
        correlation_id = "bootstrap",
        llm_provider = ?config.llm.provider,
        "agent runtime initialized"
    );

    Ok(Application { config, db_pool, runtime: Arc::new(runtime), orders })
}

#[cfg(test)]
mod tests {
    use wardstock_core::config::{ConfigOverrides, LoadOptions};

    use crate::bootstrap::bootstrap;

    fn memory_options() -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:?cache=shared".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_applies_migrations_and_builds_the_runtime() {
        let app = bootstrap(memory_options()).await.expect("bootstrap");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN \
             ('locations', 'inventory_items', 'stock_levels', 'transfers', \
              'purchase_orders', 'pending_orders')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("schema query");
        assert_eq!(table_count, 6, "bootstrap should expose the baseline tables");

        let reply = app.runtime.process_conversation("hello there", "u1", "s1").await;
        assert_eq!(reply.intent.primary_intent, "general_assistance");

        app.db_pool.close().await;
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_on_a_non_sqlite_url() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("postgres://nope".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        assert!(result.is_err());
    }
}
