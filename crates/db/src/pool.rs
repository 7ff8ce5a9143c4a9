//! Database connection pool management.

use crate::config::DbConfig;
use anyhow::Result;
use log::LevelFilter;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use tracing::info;

/// Build per-connection options for a configuration.
///
/// With `echo` set, executed statements are logged at `INFO` so they show up
/// under the default log filter.
fn connect_options(config: &DbConfig) -> Result<SqliteConnectOptions> {
    let mut options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    if !config.is_in_memory() {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }
    options = if config.echo {
        options.log_statements(LevelFilter::Info)
    } else {
        options.disable_statement_logging()
    };

    Ok(options)
}

/// Database connection pool wrapper.
///
/// This provides a safe async wrapper for database access from Tokio tasks.
#[derive(Clone)]
pub struct DbPool {
    pool: SqlitePool,
}

impl DbPool {
    /// Create a new database pool from a SQLite database URL or path with
    /// default settings.
    ///
    /// # Arguments
    /// * `db_path` - Path or URL of the SQLite database
    pub async fn new(db_path: &str) -> Result<Self> {
        Self::connect(&DbConfig::new(db_path)).await
    }

    /// Open a pool for the given configuration.
    ///
    /// Foreign key enforcement is enabled on every connection.
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let options = connect_options(config)?;

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            // The database lives only as long as its last connection.
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options.connect_with(options).await?;

        info!(
            database_url = %config.database_url,
            echo = config.echo,
            "Connected to database"
        );

        Ok(Self { pool })
    }

    /// Get a reference to the underlying SQLite pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Execute a migration to set up the database schema.
    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Open an in-memory database with the schema already applied.
    pub async fn in_memory() -> Result<Self> {
        let db = Self::connect(&DbConfig::in_memory()).await?;
        db.migrate().await?;
        Ok(db)
    }
}
