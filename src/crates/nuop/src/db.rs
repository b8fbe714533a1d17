//! PostgreSQL connection management
//!
//! The operation tables are owned by the SPB platform; nuop only reads them,
//! so there is no schema or migration handling here.

use crate::config::DatabaseConfig;
use crate::error::{NuopError, Result};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for the database connection pool
pub type DatabasePool = PgPool;

/// Database connection wrapper
#[derive(Clone, Debug)]
pub struct Database {
    pub(crate) pool: Arc<DatabasePool>,
    statement_timeout: Duration,
}

impl Database {
    /// Build the pool for `config`.
    ///
    /// Connections are opened on first use, so an unreachable server
    /// surfaces on the first query rather than here.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .application_name("nuop");
        if let Some(password) = &config.password {
            options = options.password(password);
        }

        debug!(
            host = %config.host,
            port = config.port,
            database = %config.name,
            "Configuring database pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.statement_timeout())
            .connect_lazy_with(options);

        info!(host = %config.host, database = %config.name, "Database pool ready");

        Ok(Self {
            pool: Arc::new(pool),
            statement_timeout: config.statement_timeout(),
        })
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Upper bound applied to each statement
    pub fn statement_timeout(&self) -> Duration {
        self.statement_timeout
    }

    /// Run `SELECT 1` against the server
    pub async fn health_check(&self) -> Result<()> {
        tokio::time::timeout(
            self.statement_timeout,
            sqlx::query("SELECT 1").execute(self.pool.as_ref()),
        )
        .await
        .map_err(|_| NuopError::Database("health check timed out".to_string()))?
        .map_err(|e| NuopError::Database(format!("health check failed: {}", e)))?;
        Ok(())
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Database pool closed");
    }
}
