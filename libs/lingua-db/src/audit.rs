//! Audit metadata mixin for aggregates that need soft delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Identity plus created / updated / deleted timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Audit<Id> {
    pub id: Id,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl<Id> Audit<Id> {
    pub fn new(id: Id, clock: &dyn Clock) -> Self {
        Self {
            id,
            created_at: clock.now(),
            updated_at: None,
            deleted_at: None,
        }
    }

    pub fn touch(&mut self, clock: &dyn Clock) {
        self.updated_at = Some(clock.now());
    }

    /// Soft delete. The first deletion time is kept.
    pub fn mark_deleted(&mut self, clock: &dyn Clock) {
        if self.deleted_at.is_none() {
            let now = clock.now();
            self.deleted_at = Some(now);
            self.updated_at = Some(now);
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Mutex;

    struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        fn at(secs: i64) -> Self {
            Self(Mutex::new(Utc.timestamp_opt(secs, 0).unwrap()))
        }

        fn advance(&self, secs: i64) {
            let mut t = self.0.lock().unwrap();
            *t += chrono::Duration::seconds(secs);
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[test]
    fn lifecycle_timestamps() {
        let clock = FixedClock::at(1_700_000_000);
        let mut audit = Audit::new(7_i32, &clock);
        assert_eq!(audit.created_at.timestamp(), 1_700_000_000);
        assert!(audit.updated_at.is_none());

        clock.advance(10);
        audit.touch(&clock);
        assert_eq!(audit.updated_at.map(|t| t.timestamp()), Some(1_700_000_010));

        clock.advance(10);
        audit.mark_deleted(&clock);
        assert!(audit.is_deleted());
        let first_delete = audit.deleted_at;

        clock.advance(10);
        audit.mark_deleted(&clock);
        assert_eq!(audit.deleted_at, first_delete);
    }

    #[test]
    fn system_clock_moves_forward() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }
}
