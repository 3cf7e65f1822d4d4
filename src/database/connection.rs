//! Pooled SQL datasource whose settings come from the PaaS configuration.

use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::{ConfigResolver, DataSourceConfig};
use crate::error::{ClientFactoryError, ClientFactoryResult};
use crate::logging::log_datasource_operation;

/// Translate resolved settings into pool options, rejecting unusable values
pub fn pool_options(name: &str, config: &DataSourceConfig) -> ClientFactoryResult<PgPoolOptions> {
    if config.url.trim().is_empty() {
        return Err(ClientFactoryError::configuration(
            "PaasDataSource",
            format!("datasource '{name}' has no url"),
        ));
    }
    if config.max_connections == 0 || config.min_connections > config.max_connections {
        return Err(ClientFactoryError::configuration(
            "PaasDataSource",
            format!(
                "datasource '{name}' has invalid pool bounds {}..{}",
                config.min_connections, config.max_connections
            ),
        ));
    }

    Ok(PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(config.idle_timeout_secs.map(Duration::from_secs))
        .max_lifetime(config.max_lifetime_secs.map(Duration::from_secs))
        .test_before_acquire(config.test_before_acquire))
}

/// Whole milliseconds, saturating at `u64::MAX`
fn duration_ms(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Named connection pool
#[derive(Debug, Clone)]
pub struct PaasDataSource {
    name: String,
    pool: PgPool,
    config: DataSourceConfig,
}

impl PaasDataSource {
    /// Resolve settings for `name` and open the pool
    pub async fn connect(resolver: &dyn ConfigResolver, name: &str) -> ClientFactoryResult<Self> {
        let config = resolver.datasource_config(name).await?;
        let options = pool_options(name, &config)?;
        let started = Instant::now();

        match options.connect(&config.url).await {
            Ok(pool) => {
                log_datasource_operation(
                    "connect",
                    name,
                    "connected",
                    Some(duration_ms(started.elapsed())),
                    None,
                );
                Ok(Self {
                    name: name.to_string(),
                    pool,
                    config,
                })
            }
            Err(e) => {
                let details = e.to_string();
                log_datasource_operation("connect", name, "failed", None, Some(&details));
                Err(ClientFactoryError::data_source(name, e))
            }
        }
    }

    /// Build the pool without opening connections; they open on first use
    pub async fn connect_lazy(
        resolver: &dyn ConfigResolver,
        name: &str,
    ) -> ClientFactoryResult<Self> {
        let config = resolver.datasource_config(name).await?;
        let pool = pool_options(name, &config)?
            .connect_lazy(&config.url)
            .map_err(|e| ClientFactoryError::data_source(name, e))?;

        log_datasource_operation("connect_lazy", name, "created", None, None);
        Ok(Self {
            name: name.to_string(),
            pool,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &DataSourceConfig {
        &self.config
    }

    pub async fn health_check(&self) -> ClientFactoryResult<bool> {
        let row = sqlx::query("SELECT 1 as health")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ClientFactoryError::data_source(&self.name, e))?;

        let health: i32 = row.get("health");
        Ok(health == 1)
    }

    pub async fn close(self) {
        info!(datasource = %self.name, "Closing datasource pool");
        self.pool.close().await;
    }
}
