//! Shared connection pool handle.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::config::DbConfig;
use crate::uow::UnitOfWork;
use crate::{DbError, Result};

/// One year; keeps the single in-memory `SQLite` connection from being recycled.
const MEMORY_CONN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Supported engines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DbEngine {
    Postgres,
    MySql,
    Sqlite,
}

impl DbEngine {
    /// Detect engine by DSN scheme.
    ///
    /// # Errors
    /// Returns `DbError::UnknownDsn` if the scheme is not recognized.
    pub fn detect(dsn: &str) -> Result<Self> {
        let s = dsn.trim_start();
        if s.starts_with("postgres://") || s.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if s.starts_with("mysql://") {
            Ok(Self::MySql)
        } else if s.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            Err(DbError::UnknownDsn(redact_credentials_in_dsn(dsn)))
        }
    }

    fn ensure_enabled(self) -> Result<()> {
        match self {
            #[cfg(not(feature = "pg"))]
            Self::Postgres => Err(DbError::FeatureDisabled("PostgreSQL feature not enabled")),
            #[cfg(not(feature = "mysql"))]
            Self::MySql => Err(DbError::FeatureDisabled("MySQL feature not enabled")),
            #[cfg(not(feature = "sqlite"))]
            Self::Sqlite => Err(DbError::FeatureDisabled("SQLite feature not enabled")),
            #[allow(unreachable_patterns)]
            _ => Ok(()),
        }
    }
}

/// Replace the `user:password@` part of a DSN with `***@`.
#[must_use]
pub fn redact_credentials_in_dsn(dsn: &str) -> String {
    let Some(scheme_end) = dsn.find("://") else {
        return dsn.to_owned();
    };
    let rest = &dsn[scheme_end + 3..];
    let authority_end = rest.find('/').unwrap_or(rest.len());
    match rest[..authority_end].rfind('@') {
        Some(at) => format!("{}***{}", &dsn[..scheme_end + 3], &rest[at..]),
        None => dsn.to_owned(),
    }
}

/// Cheap-to-clone handle over the connection pool.
#[derive(Clone)]
pub struct Db {
    conn: DatabaseConnection,
    engine: DbEngine,
}

impl std::fmt::Debug for Db {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Db").field("engine", &self.engine).finish_non_exhaustive()
    }
}

impl Db {
    /// Connect and build the pool.
    ///
    /// In-memory `SQLite` pools are pinned to exactly one long-lived
    /// connection: every new connection would otherwise see an empty database.
    ///
    /// # Errors
    /// Returns an error if the DSN is unsupported or the connection fails.
    pub async fn connect(cfg: &DbConfig) -> Result<Self> {
        let engine = DbEngine::detect(&cfg.dsn)?;
        engine.ensure_enabled()?;

        if cfg.max_conns == 0 {
            return Err(DbError::InvalidConfig("max_conns must be at least 1".to_owned()));
        }

        let mut opts = ConnectOptions::new(cfg.dsn.clone());
        opts.acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
            .sqlx_logging(cfg.sql_logging);

        if cfg.is_memory() {
            opts.max_connections(1)
                .min_connections(1)
                .idle_timeout(MEMORY_CONN_LIFETIME)
                .max_lifetime(MEMORY_CONN_LIFETIME);
        } else {
            opts.max_connections(cfg.max_conns);
            if let Some(n) = cfg.min_conns {
                opts.min_connections(n);
            }
            if let Some(secs) = cfg.idle_timeout_secs {
                opts.idle_timeout(Duration::from_secs(secs));
            }
        }

        let conn = Database::connect(opts).await?;
        tracing::info!(
            engine = ?engine,
            dsn = %redact_credentials_in_dsn(&cfg.dsn),
            "database connected"
        );
        Ok(Self { conn, engine })
    }

    #[must_use]
    pub fn engine(&self) -> DbEngine {
        self.engine
    }

    /// Raw pool access, for migrations and health probes.
    #[must_use]
    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Start a new unit of work bound to this pool.
    #[must_use]
    pub fn unit_of_work(&self) -> UnitOfWork {
        UnitOfWork::new(self.conn.clone())
    }

    /// Round-trip to the database.
    ///
    /// # Errors
    /// Returns the driver error when the database is unreachable.
    pub async fn ping(&self) -> Result<()> {
        self.conn.ping().await.map_err(Into::into)
    }
}
