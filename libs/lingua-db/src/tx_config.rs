//! Transaction configuration.
//!
//! Services describe isolation and access mode with these types and never
//! import `SeaORM` transaction types directly; conversion happens here.

use sea_orm::{AccessMode, IsolationLevel};

/// Transaction isolation level.
///
/// `SQLite` only knows serializable transactions; the level is ignored there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxIsolationLevel {
    ReadUncommitted,
    /// Default for every unit of work.
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

/// Transaction access mode. Read-only is a hint on `SQLite`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TxAccessMode {
    ReadOnly,
    #[default]
    ReadWrite,
}

/// Settings passed to [`crate::UnitOfWork::begin_transaction`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxConfig {
    /// `None` means [`TxIsolationLevel::ReadCommitted`].
    pub isolation: Option<TxIsolationLevel>,
    /// `None` leaves the database default (read-write).
    pub access_mode: Option<TxAccessMode>,
}

impl TxConfig {
    #[must_use]
    pub fn with_isolation(isolation: TxIsolationLevel) -> Self {
        Self {
            isolation: Some(isolation),
            access_mode: None,
        }
    }

    #[must_use]
    pub fn read_only() -> Self {
        Self {
            isolation: None,
            access_mode: Some(TxAccessMode::ReadOnly),
        }
    }

    #[must_use]
    pub fn serializable() -> Self {
        Self::with_isolation(TxIsolationLevel::Serializable)
    }

    /// Isolation actually requested from the driver.
    #[must_use]
    pub fn effective_isolation(&self) -> TxIsolationLevel {
        self.isolation.unwrap_or_default()
    }
}

impl From<TxIsolationLevel> for IsolationLevel {
    fn from(level: TxIsolationLevel) -> Self {
        match level {
            TxIsolationLevel::ReadUncommitted => IsolationLevel::ReadUncommitted,
            TxIsolationLevel::ReadCommitted => IsolationLevel::ReadCommitted,
            TxIsolationLevel::RepeatableRead => IsolationLevel::RepeatableRead,
            TxIsolationLevel::Serializable => IsolationLevel::Serializable,
        }
    }
}

impl From<TxAccessMode> for AccessMode {
    fn from(mode: TxAccessMode) -> Self {
        match mode {
            TxAccessMode::ReadOnly => AccessMode::ReadOnly,
            TxAccessMode::ReadWrite => AccessMode::ReadWrite,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn default_isolation_is_read_committed() {
        let cfg = TxConfig::default();
        assert!(cfg.isolation.is_none());
        assert_eq!(cfg.effective_isolation(), TxIsolationLevel::ReadCommitted);
    }

    #[test]
    fn constructors() {
        assert_eq!(
            TxConfig::serializable().effective_isolation(),
            TxIsolationLevel::Serializable
        );
        assert_eq!(TxConfig::read_only().access_mode, Some(TxAccessMode::ReadOnly));
    }

    #[test]
    fn converts_to_sea_orm() {
        assert!(matches!(
            IsolationLevel::from(TxIsolationLevel::RepeatableRead),
            IsolationLevel::RepeatableRead
        ));
        assert!(matches!(
            AccessMode::from(TxAccessMode::ReadWrite),
            AccessMode::ReadWrite
        ));
    }
}
