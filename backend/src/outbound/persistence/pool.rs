//! `bb8` pool of async Diesel connections and the startup migration runner.

use std::time::Duration;

use diesel::{Connection, PgConnection};
use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Failures building the pool, checking out a connection or migrating.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("failed to build connection pool: {message}")]
    Build { message: String },
    #[error("failed to check out a connection: {message}")]
    Checkout { message: String },
    #[error("failed to apply migrations: {message}")]
    Migration { message: String },
}

impl PoolError {
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }

    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn migration(message: impl Into<String>) -> Self {
        Self::Migration {
            message: message.into(),
        }
    }

    /// The underlying message regardless of stage.
    pub fn into_message(self) -> String {
        match self {
            Self::Build { message } | Self::Checkout { message } | Self::Migration { message } => {
                message
            }
        }
    }
}

/// Pool sizing and checkout limits.
///
/// Defaults: 10 connections, 2 kept idle, 30 second checkout timeout.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    min_idle: Option<u32>,
    connection_timeout: Duration,
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: 10,
            min_idle: Some(2),
            connection_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    pub fn with_min_idle(mut self, min_idle: Option<u32>) -> Self {
        self.min_idle = min_idle;
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
}

/// Shared handle to the connection pool. Cloning is cheap.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool and open the idle connections.
    ///
    /// # Errors
    /// [`PoolError::Build`] when the URL is invalid or the server is unreachable.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager =
            AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url.as_str());
        let inner = Pool::builder()
            .max_size(config.max_size)
            .min_idle(config.min_idle.map(|idle| idle.min(config.max_size)))
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|err| PoolError::build(err.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection, waiting up to the configured timeout.
    ///
    /// # Errors
    /// [`PoolError::Checkout`] when no connection became available.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| PoolError::checkout(err.to_string()))
    }
}

/// Apply embedded migrations over a short-lived synchronous connection.
///
/// Runs on the blocking thread pool so the async runtime stays responsive.
///
/// # Errors
/// [`PoolError::Migration`] when connecting or migrating fails.
pub async fn run_migrations(database_url: &str) -> Result<usize, PoolError> {
    let url = database_url.to_owned();
    tokio::task::spawn_blocking(move || {
        let mut conn = PgConnection::establish(&url)
            .map_err(|err| PoolError::migration(err.to_string()))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| PoolError::migration(err.to_string()))?;
        Ok(applied.len())
    })
    .await
    .map_err(|err| PoolError::migration(err.to_string()))?
    .inspect(|applied| info!(applied, "database migrations applied"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_match_a_small_service() {
        let config = PoolConfig::new("postgres://localhost/storefront");
        assert_eq!(config.database_url(), "postgres://localhost/storefront");
        assert_eq!(config.max_size, 10);
        assert_eq!(config.min_idle, Some(2));
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(25, 25)]
    fn max_size_never_drops_to_zero(#[case] requested: u32, #[case] expected: u32) {
        let config = PoolConfig::new("postgres://localhost/storefront").with_max_size(requested);
        assert_eq!(config.max_size, expected);
    }

    #[rstest]
    fn errors_keep_their_message() {
        assert_eq!(
            PoolError::checkout("timed out").into_message(),
            "timed out"
        );
        assert!(
            PoolError::migration("relation exists")
                .to_string()
                .contains("migrations")
        );
    }
}
