//! Schema migration runner.

use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::{Db, Result};

/// Result of a migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Names of the migrations applied by this run, in order.
    pub applied: Vec<String>,
}

/// Apply every pending migration of `M`.
///
/// Already applied migrations are skipped, so running this on every start is
/// safe.
///
/// # Errors
/// Returns the first failing migration's error.
pub async fn run_migrations<M: MigratorTrait>(db: &Db) -> Result<MigrationReport> {
    let pending: Vec<String> = M::get_pending_migrations(db.conn())
        .await?
        .iter()
        .map(|m| m.name().to_owned())
        .collect();

    if pending.is_empty() {
        info!("database schema is up to date");
        return Ok(MigrationReport::default());
    }

    for name in &pending {
        info!(migration = %name, "applying migration");
    }
    M::up(db.conn(), None).await?;
    info!(count = pending.len(), "migrations applied");

    Ok(MigrationReport { applied: pending })
}
