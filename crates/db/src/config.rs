//! Database connection settings.

/// Default database location, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://votings.db";

/// Connection settings used to open a [`crate::DbPool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// SQLite URL or path, e.g. `sqlite://votings.db` or `:memory:`.
    pub database_url: String,
    /// Emit every executed SQL statement through the log.
    pub echo: bool,
    pub max_connections: u32,
}

impl DbConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }

    /// Private in-memory database.
    ///
    /// Pinned to a single connection so every query sees the same database.
    pub fn in_memory() -> Self {
        Self {
            database_url: ":memory:".to_string(),
            echo: false,
            max_connections: 1,
        }
    }

    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            echo: false,
            max_connections: 10,
        }
    }
}
