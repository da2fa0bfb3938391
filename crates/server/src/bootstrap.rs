use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use vendy_agent::llm::{CompletionError, HttpCompletionClient};
use vendy_agent::runtime::DialogueRouter;
use vendy_core::config::{AppConfig, ConfigError, LoadOptions};
use vendy_db::repositories::{SqlCatalogRepository, SqlConversationRepository};
use vendy_db::{connect_with_settings, migrations, DbPool};
use vendy_telegram::poller::{LongPollRunner, ReconnectPolicy};
use vendy_telegram::transport::{HttpBotTransport, TransportError};

use crate::handler::BotUpdateHandler;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub runner: LongPollRunner,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("completion client setup failed: {0}")]
    Completion(#[from] CompletionError),
    #[error("telegram transport setup failed: {0}")]
    Transport(#[from] TransportError),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(event_name = "system.bootstrap.start", "starting application bootstrap");

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.min_connections,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(event_name = "system.bootstrap.migrations_applied", "database migrations applied");

    let catalog = Arc::new(SqlCatalogRepository::new(db_pool.clone()));
    let conversations = Arc::new(SqlConversationRepository::new(db_pool.clone()));
    let completions = Arc::new(HttpCompletionClient::from_config(&config.llm)?);

    let router = Arc::new(DialogueRouter::new(catalog.clone(), conversations, completions));
    let handler = Arc::new(BotUpdateHandler::new(router, catalog));

    let transport = Arc::new(HttpBotTransport::new(config.telegram.bot_token.clone())?);
    let runner = LongPollRunner::new(
        transport,
        handler,
        ReconnectPolicy::default(),
        config.telegram.poll_timeout_secs,
    );

    Ok(Application { config, db_pool, runner })
}

#[cfg(test)]
mod tests {
    use vendy_core::config::{ConfigOverrides, LoadOptions};
    use vendy_db::DemoCatalog;

    use crate::bootstrap::bootstrap;

    fn valid_overrides(database_url: &str) -> LoadOptions {
        LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some(database_url.to_string()),
                telegram_bot_token: Some("12345:test-token".to_string()),
                llm_api_key: Some("sk-test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }
    }

    #[tokio::test]
    async fn bootstrap_fails_fast_without_a_usable_bot_token() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                database_url: Some("sqlite::memory:".to_string()),
                telegram_bot_token: Some("not-a-bot-token".to_string()),
                llm_api_key: Some("sk-test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .await;

        let message = result.err().expect("bootstrap should fail").to_string();
        assert!(message.contains("telegram.bot_token"));
    }

    #[tokio::test]
    async fn bootstrap_prepares_schema_and_seedable_catalog() {
        let app = bootstrap(valid_overrides("sqlite::memory:?cache=shared"))
            .await
            .expect("bootstrap should succeed with valid overrides");

        let (table_count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM sqlite_master \
             WHERE type = 'table' AND name IN ('users', 'messages', 'produtos')",
        )
        .fetch_one(&app.db_pool)
        .await
        .expect("expected baseline tables to be available after bootstrap");
        assert_eq!(table_count, 3, "bootstrap should expose the three baseline tables");

        let inserted = DemoCatalog::load(&app.db_pool).await.expect("seed demo catalog");
        assert!(inserted > 0, "demo catalog should load into a freshly migrated schema");
    }
}
