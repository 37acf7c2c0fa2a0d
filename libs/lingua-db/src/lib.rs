#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Lingua database layer.
//!
//! Thin, typed wrapper around `SeaORM`:
//! - [`Db`]: shared connection pool, created once per process from [`DbConfig`]
//! - [`UnitOfWork`]: one per request; owns the (optional) open transaction and
//!   counts the mutations applied through it
//! - [`Repository`]: generic CRUD/query accessor over any [`AggregateRoot`]
//!
//! Every repository mutation is written immediately (autocommit outside an
//! explicit transaction, inside it otherwise). [`UnitOfWork::save_changes`]
//! reports how many rows were touched since the previous call.
//!
//! # Example
//! ```rust,ignore
//! let db = Db::connect(&DbConfig::in_memory()).await?;
//! let uow = db.unit_of_work();
//! let tx = uow.begin_transaction(TxConfig::default()).await?;
//! let repo = Repository::<culture::Entity>::new(&uow);
//! repo.add(culture::ActiveModel { .. }).await?;
//! tx.commit().await?;
//! ```

pub mod audit;
pub mod config;
pub mod handle;
pub mod migrate;
pub mod repository;
pub mod tx_config;
pub mod uow;

pub use audit::{Audit, Clock, SystemClock};
pub use config::DbConfig;
pub use handle::{Db, DbEngine, redact_credentials_in_dsn};
pub use migrate::{MigrationReport, run_migrations};
pub use repository::{AggregateRoot, Page, Repository};
pub use tx_config::{TxAccessMode, TxConfig, TxIsolationLevel};
pub use uow::{Executor, TxScope, UnitOfWork};

use thiserror::Error;

/// Library-local result type.
pub type Result<T> = std::result::Result<T, DbError>;

/// Typed error for the DB handle, unit of work and repositories.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Unknown DSN: {0}")]
    UnknownDsn(String),

    #[error("Feature not enabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("a transaction is already active on this unit of work")]
    TransactionAlreadyActive,

    #[error("no active transaction on this unit of work")]
    NoActiveTransaction,

    #[error("query returned more than one row where at most one was expected")]
    MultipleRows,

    #[error("invalid page request: {0}")]
    InvalidPage(String),

    #[error(transparent)]
    Sea(#[from] sea_orm::DbErr),
}
