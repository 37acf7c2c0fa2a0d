//! Database connection configuration.

use serde::{Deserialize, Serialize};

/// DSN used by `--mock` runs and tests.
pub const MEMORY_DSN: &str = "sqlite::memory:";

/// Connection settings for the shared pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DbConfig {
    /// Connection string: `sqlite:`, `postgres://` or `mysql://`.
    pub dsn: String,
    /// Maximum number of pooled connections.
    pub max_conns: u32,
    /// Minimum number of idle connections kept open.
    pub min_conns: Option<u32>,
    /// Seconds to wait for a free connection.
    pub acquire_timeout_secs: u64,
    /// Seconds a connection may stay idle before it is closed.
    pub idle_timeout_secs: Option<u64>,
    /// Log every SQL statement at debug level.
    pub sql_logging: bool,
    /// Apply pending migrations on startup.
    pub auto_migrate: bool,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            dsn: "sqlite://lingua.db?mode=rwc".to_owned(),
            max_conns: 10,
            min_conns: None,
            acquire_timeout_secs: 30,
            idle_timeout_secs: None,
            sql_logging: false,
            auto_migrate: true,
        }
    }
}

impl DbConfig {
    /// In-memory `SQLite` configuration.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            dsn: MEMORY_DSN.to_owned(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_memory(&self) -> bool {
        let dsn = self.dsn.trim();
        dsn.starts_with("sqlite::memory:") || dsn.contains("mode=memory")
    }
}
