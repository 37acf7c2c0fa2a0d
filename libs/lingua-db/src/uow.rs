//! Unit of work: one logical connection plus at most one open transaction.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, DatabaseTransaction, DbErr, ExecResult,
    QueryResult, Statement, TransactionTrait,
};
use tokio::sync::{Mutex, MutexGuard};

use crate::tx_config::TxConfig;
use crate::{DbError, Result};

/// Request-scoped data access session.
///
/// Statements issued through [`UnitOfWork::executor`] (and therefore through
/// every [`crate::Repository`] built on it) run inside the open transaction
/// when there is one, and in autocommit mode on the pool otherwise.
pub struct UnitOfWork {
    conn: DatabaseConnection,
    tx: Mutex<Option<DatabaseTransaction>>,
    pending: AtomicU64,
}

impl UnitOfWork {
    #[must_use]
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            tx: Mutex::new(None),
            pending: AtomicU64::new(0),
        }
    }

    /// Open a transaction. Only one may be active per unit of work.
    ///
    /// # Errors
    /// `DbError::TransactionAlreadyActive` if one is open, or the driver error
    /// if `BEGIN` fails.
    pub async fn begin_transaction(&self, cfg: TxConfig) -> Result<TxScope<'_>> {
        let mut slot = self.tx.lock().await;
        if slot.is_some() {
            return Err(DbError::TransactionAlreadyActive);
        }

        let txn = match self.conn.get_database_backend() {
            // SQLite transactions are always serializable
            DatabaseBackend::Sqlite => self.conn.begin().await?,
            _ => {
                self.conn
                    .begin_with_config(
                        Some(cfg.effective_isolation().into()),
                        cfg.access_mode.map(Into::into),
                    )
                    .await?
            }
        };
        *slot = Some(txn);
        tracing::debug!(isolation = ?cfg.effective_isolation(), "transaction started");

        Ok(TxScope {
            uow: self,
            finished: false,
        })
    }

    /// Commit the open transaction.
    ///
    /// # Errors
    /// `DbError::NoActiveTransaction` if none is open, or the driver error.
    pub async fn commit_transaction(&self) -> Result<()> {
        let txn = self.tx.lock().await.take().ok_or(DbError::NoActiveTransaction)?;
        txn.commit().await?;
        tracing::debug!("transaction committed");
        Ok(())
    }

    /// Roll back the open transaction.
    ///
    /// # Errors
    /// `DbError::NoActiveTransaction` if none is open, or the driver error.
    pub async fn rollback_transaction(&self) -> Result<()> {
        let txn = self.tx.lock().await.take().ok_or(DbError::NoActiveTransaction)?;
        txn.rollback().await?;
        tracing::debug!("transaction rolled back");
        Ok(())
    }

    /// Whether a transaction is currently open.
    pub async fn in_transaction(&self) -> bool {
        self.tx.lock().await.is_some()
    }

    /// Number of rows changed since the previous call; resets the counter.
    ///
    /// Mutations are already written when they happen, so this never
    /// touches the database.
    pub fn save_changes(&self) -> u64 {
        self.pending.swap(0, Ordering::AcqRel)
    }

    pub(crate) fn record(&self, rows: u64) {
        self.pending.fetch_add(rows, Ordering::AcqRel);
    }

    /// Borrow the connection that statements should run on.
    ///
    /// Holds the transaction slot until dropped: do not keep an executor
    /// alive across `begin_transaction` / `commit_transaction`.
    pub async fn executor(&self) -> Executor<'_> {
        Executor {
            conn: &self.conn,
            tx: self.tx.lock().await,
        }
    }
}

/// Handle for an open transaction.
///
/// Dropping it without [`TxScope::commit`] rolls the transaction back.
#[must_use = "dropping a TxScope without commit rolls the transaction back"]
pub struct TxScope<'u> {
    uow: &'u UnitOfWork,
    finished: bool,
}

impl TxScope<'_> {
    /// # Errors
    /// Returns the driver error if `COMMIT` fails.
    pub async fn commit(mut self) -> Result<()> {
        self.finished = true;
        self.uow.commit_transaction().await
    }

    /// # Errors
    /// Returns the driver error if `ROLLBACK` fails.
    pub async fn rollback(mut self) -> Result<()> {
        self.finished = true;
        self.uow.rollback_transaction().await
    }
}

impl Drop for TxScope<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // An executor still holding the slot keeps the transaction; it is
        // rolled back when the unit of work itself is dropped.
        if let Ok(mut slot) = self.uow.tx.try_lock()
            && let Some(txn) = slot.take()
        {
            tracing::warn!("transaction scope dropped without commit; rolling back");
            drop(txn);
        }
    }
}

/// Connection borrowed from a [`UnitOfWork`]; routes statements to the open
/// transaction if any.
pub struct Executor<'u> {
    conn: &'u DatabaseConnection,
    tx: MutexGuard<'u, Option<DatabaseTransaction>>,
}

#[async_trait]
impl ConnectionTrait for Executor<'_> {
    fn get_database_backend(&self) -> DatabaseBackend {
        match self.tx.as_ref() {
            Some(tx) => tx.get_database_backend(),
            None => self.conn.get_database_backend(),
        }
    }

    async fn execute(&self, stmt: Statement) -> std::result::Result<ExecResult, DbErr> {
        match self.tx.as_ref() {
            Some(tx) => tx.execute(stmt).await,
            None => self.conn.execute(stmt).await,
        }
    }

    async fn execute_unprepared(&self, sql: &str) -> std::result::Result<ExecResult, DbErr> {
        match self.tx.as_ref() {
            Some(tx) => tx.execute_unprepared(sql).await,
            None => self.conn.execute_unprepared(sql).await,
        }
    }

    async fn query_one(&self, stmt: Statement) -> std::result::Result<Option<QueryResult>, DbErr> {
        match self.tx.as_ref() {
            Some(tx) => tx.query_one(stmt).await,
            None => self.conn.query_one(stmt).await,
        }
    }

    async fn query_all(&self, stmt: Statement) -> std::result::Result<Vec<QueryResult>, DbErr> {
        match self.tx.as_ref() {
            Some(tx) => tx.query_all(stmt).await,
            None => self.conn.query_all(stmt).await,
        }
    }

    fn support_returning(&self) -> bool {
        match self.tx.as_ref() {
            Some(tx) => tx.support_returning(),
            None => self.conn.support_returning(),
        }
    }

    fn is_mock_connection(&self) -> bool {
        self.conn.is_mock_connection()
    }
}
