use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgPoolOptions;
use tracing::info;

use crate::api::router::AppState;
use crate::application::ports::{DocumentStore, IdentityProvider};
use crate::config::Config;
use crate::infrastructure::{
    identity::{IdentitySettings, JwtIdentityProvider},
    persistence::{MemoryDocumentStore, PostgresDocumentStore},
};

pub type BuildError = Box<dyn std::error::Error + Send + Sync>;

/// Application builder for dependency injection and setup
pub struct ApplicationBuilder {
    config: Config,
    store: Option<Arc<dyn DocumentStore>>,
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl ApplicationBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: None,
            identity: None,
        }
    }

    /// Use an already constructed store, e.g. a shared in-memory one in tests
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// PostgreSQL when `DATABASE_URL` is set, otherwise the in-memory store
    pub async fn with_document_store(mut self) -> Result<Self, BuildError> {
        let Some(url) = self.config.database_url.clone() else {
            tracing::warn!("DATABASE_URL not set; documents are kept in memory and lost on exit");
            self.store = Some(Arc::new(MemoryDocumentStore::new()));
            return Ok(self);
        };

        info!("Connecting to document database");

        // Retry connection with exponential backoff
        let mut retries = 3;
        let mut delay = Duration::from_secs(1);
        let pool = loop {
            match PgPoolOptions::new()
                .max_connections(self.config.db_max_connections)
                .min_connections(self.config.db_min_connections)
                .acquire_timeout(Duration::from_secs(self.config.db_acquire_timeout_secs))
                .idle_timeout(Some(Duration::from_secs(self.config.db_idle_timeout_secs)))
                .max_lifetime(Some(Duration::from_secs(self.config.db_max_lifetime_secs)))
                .connect(&url)
                .await
            {
                Ok(pool) => break pool,
                Err(e) if retries > 0 => {
                    retries -= 1;
                    tracing::warn!(
                        retry_in = ?delay,
                        retries_left = retries,
                        error = %e,
                        "Database connection failed"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to database after retries");
                    return Err(Box::new(e));
                }
            }
        };

        info!(
            max = self.config.db_max_connections,
            min = self.config.db_min_connections,
            acquire_timeout_secs = self.config.db_acquire_timeout_secs,
            "Database pool configured"
        );

        let store = PostgresDocumentStore::new(pool);
        store.ensure_schema().await?;
        info!("Document schema ready");

        self.store = Some(Arc::new(store));
        Ok(self)
    }

    /// Bundled JWT identity provider over the configured store
    pub fn with_identity(mut self) -> Result<Self, BuildError> {
        let store = self.store.clone().ok_or("Document store not initialized")?;
        let settings = IdentitySettings {
            jwt_secret: self.config.jwt_secret.clone(),
            token_ttl: chrono::Duration::seconds(self.config.jwt_ttl_secs),
            password_reset_url: self.config.password_reset_url.clone(),
            password_reset_ttl: chrono::Duration::seconds(self.config.password_reset_ttl_secs),
        };
        self.identity = Some(Arc::new(JwtIdentityProvider::new(store, settings)));
        Ok(self)
    }

    /// Build application state with all use cases
    pub fn build(self) -> Result<AppState, BuildError> {
        let store = self.store.ok_or("Document store not initialized")?;
        let identity = self.identity.ok_or("Identity provider not initialized")?;

        info!("Application layer initialized");
        Ok(AppState::new(self.config, store, identity))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
