//! Progression and achievement engine.
//!
//! [`ProgressionEngine`] owns a [`Storage`] handle and the point rules. Each
//! mutating operation runs in exactly one storage transaction: status reads,
//! compare-and-swap completions, point awards, ledger entries, and the level
//! cascade commit or roll back together.

pub mod cascade;
pub mod catalog;
pub mod error;
pub mod events;
pub mod goal_progress;
pub mod profile;
pub mod streak;
mod tx;
pub mod view;
pub mod weekly;

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, Utc};

use hoops_core::scoring::PointRules;
use hoops_storage::Storage;

pub use cascade::CascadeOutcome;
pub use catalog::{CatalogLevel, ImportSummary};
pub use error::{EngineError, ErrorKind, Result};
pub use events::ProgressEvent;
pub use goal_progress::UserGoalView;
pub use streak::DrillOutcome;
pub use view::{GoalProgressEntry, LevelProgression, LevelSummary, PlayerStats, WeeklyGoalEntry};
pub use weekly::UserWeeklyGoalView;

/// Largest accepted UTC offset, in minutes (UTC+14:00).
pub const MAX_OFFSET_MINUTES: i32 = 14 * 60;

/// The progression engine.
pub struct ProgressionEngine<S> {
    store: S,
    rules: PointRules,
    offset: FixedOffset,
}

impl<S: Storage> ProgressionEngine<S> {
    /// Creates an engine with the default point rules and UTC day boundaries.
    pub fn new(store: S) -> Self {
        Self {
            store,
            rules: PointRules::default(),
            offset: Utc.fix(),
        }
    }

    /// Replaces the point rules.
    pub fn with_rules(mut self, rules: PointRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the fixed UTC offset that defines local midnight for streaks.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Result<Self> {
        if minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(EngineError::validation(format!(
                "utc offset must be within ±{MAX_OFFSET_MINUTES} minutes (got {minutes})"
            )));
        }
        self.offset = FixedOffset::east_opt(minutes * 60).ok_or_else(|| {
            EngineError::validation(format!("invalid utc offset: {minutes} minutes"))
        })?;
        Ok(self)
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &PointRules {
        &self.rules
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Local calendar date of an instant under the configured offset.
    pub fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }

    /// Consumes the engine, returning the store.
    pub fn into_store(self) -> S {
        self.store
    }
}

impl<S> std::fmt::Debug for ProgressionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressionEngine")
            .field("rules", &self.rules)
            .field("offset", &self.offset)
            .finish_non_exhaustive()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use hoops_storage::SqliteStore;

    #[test]
    fn local_date_uses_offset() {
        let engine = ProgressionEngine::new(SqliteStore::open_in_memory().unwrap())
            .with_utc_offset_minutes(-300)
            .unwrap();
        // 03:00 UTC is still the previous evening at UTC-5.
        let at = testutil::at(2024, 3, 2, 3);
        assert_eq!(engine.local_date(at), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    }

    #[test]
    fn offset_out_of_range_rejected() {
        let err = ProgressionEngine::new(SqliteStore::open_in_memory().unwrap())
            .with_utc_offset_minutes(900)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }
}
