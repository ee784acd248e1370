//! Transaction wrapper for [`SqliteStore`].

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, TransactionBehavior};
use tracing::debug;

use hoops_core::award::PointAward;
use hoops_core::catalog::{Goal, Level, NewGoal, NewLevel, NewWeeklyGoal, WeeklyGoal};
use hoops_core::drill::DrillCompletion;
use hoops_core::enums::ProgressStatus;
use hoops_core::profile::PlayerProfile;
use hoops_core::progress::{UserGoal, UserLevel, UserWeeklyGoal};

use crate::error::{Result, StorageError};
use crate::sqlite::store::SqliteStore;
use crate::sqlite::{catalog, drills, ledger, metadata, profiles, progress};
use crate::traits::Transaction;

/// A thin wrapper around a SQLite connection that is inside a transaction.
///
/// Holds a reference to the connection (which already has an active
/// `BEGIN IMMEDIATE`) and delegates to the same connection-level helpers used
/// by [`SqliteStore`].
pub(crate) struct SqliteTx<'a> {
    pub(crate) conn: &'a Connection,
}

impl Transaction for SqliteTx<'_> {
    fn create_profile(&self, profile: &PlayerProfile) -> Result<()> {
        profiles::insert_profile(self.conn, profile)
    }

    fn get_profile(&self, user_id: &str) -> Result<PlayerProfile> {
        profiles::get_profile_on_conn(self.conn, user_id)
    }

    fn add_points(&self, user_id: &str, points: i64, now: DateTime<Utc>) -> Result<i64> {
        profiles::add_points_on_conn(self.conn, user_id, points, now)
    }

    fn update_streak(
        &self,
        user_id: &str,
        current: i32,
        longest: i32,
        last_active: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        profiles::update_streak_on_conn(self.conn, user_id, current, longest, last_active, now)
    }

    fn set_current_level_tag(&self, user_id: &str, tag: &str, now: DateTime<Utc>) -> Result<()> {
        profiles::set_current_level_tag_on_conn(self.conn, user_id, tag, now)
    }

    fn record_award(&self, award: &PointAward) -> Result<i64> {
        ledger::insert_award(self.conn, award)
    }

    fn create_level(&self, level: &NewLevel, now: DateTime<Utc>) -> Result<Level> {
        catalog::insert_level(self.conn, level, now)
    }

    fn get_level(&self, level_id: i64) -> Result<Level> {
        catalog::get_level_on_conn(self.conn, level_id)
    }

    fn get_level_by_number(&self, level_number: i32) -> Result<Option<Level>> {
        catalog::get_level_by_number_on_conn(self.conn, level_number)
    }

    fn list_levels(&self) -> Result<Vec<Level>> {
        catalog::list_levels_on_conn(self.conn)
    }

    fn create_goal(&self, goal: &NewGoal, now: DateTime<Utc>) -> Result<Goal> {
        catalog::insert_goal(self.conn, goal, now)
    }

    fn get_goal(&self, goal_id: i64) -> Result<Goal> {
        catalog::get_goal_on_conn(self.conn, goal_id)
    }

    fn update_goal(&self, goal: &Goal, now: DateTime<Utc>) -> Result<Goal> {
        catalog::update_goal_on_conn(self.conn, goal, now)
    }

    fn list_goals_for_level(&self, level_id: i64) -> Result<Vec<Goal>> {
        catalog::list_goals_for_level_on_conn(self.conn, level_id)
    }

    fn create_weekly_goal(&self, goal: &NewWeeklyGoal, now: DateTime<Utc>) -> Result<WeeklyGoal> {
        catalog::insert_weekly_goal(self.conn, goal, now)
    }

    fn get_weekly_goal(&self, weekly_goal_id: i64) -> Result<WeeklyGoal> {
        catalog::get_weekly_goal_on_conn(self.conn, weekly_goal_id)
    }

    fn set_weekly_goal_active(&self, weekly_goal_id: i64, active: bool) -> Result<()> {
        catalog::set_weekly_goal_active_on_conn(self.conn, weekly_goal_id, active)
    }

    fn get_user_goal(&self, user_id: &str, goal_id: i64) -> Result<Option<UserGoal>> {
        progress::get_user_goal_on_conn(self.conn, user_id, goal_id)
    }

    fn insert_user_goal(&self, row: &UserGoal, now: DateTime<Utc>) -> Result<()> {
        progress::insert_user_goal(self.conn, row, now)
    }

    fn update_user_goal_progress(
        &self,
        user_id: &str,
        goal_id: i64,
        progress: i32,
        status: ProgressStatus,
        started_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        progress::update_user_goal_progress_on_conn(
            self.conn, user_id, goal_id, progress, status, started_at, now,
        )
    }

    fn complete_user_goal(
        &self,
        user_id: &str,
        goal_id: i64,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        progress::complete_user_goal_on_conn(self.conn, user_id, goal_id, points, now)
    }

    fn list_user_goals_for_level(&self, user_id: &str, level_id: i64) -> Result<Vec<UserGoal>> {
        progress::list_user_goals_for_level_on_conn(self.conn, user_id, level_id)
    }

    fn get_user_level(&self, user_id: &str, level_id: i64) -> Result<Option<UserLevel>> {
        progress::get_user_level_on_conn(self.conn, user_id, level_id)
    }

    fn record_level_progress(
        &self,
        user_id: &str,
        level_id: i64,
        progress: i32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        progress::record_level_progress_on_conn(self.conn, user_id, level_id, progress, now)
    }

    fn complete_user_level(&self, user_id: &str, level_id: i64, now: DateTime<Utc>) -> Result<bool> {
        progress::complete_user_level_on_conn(self.conn, user_id, level_id, now)
    }

    fn unlock_user_level(&self, user_id: &str, level_id: i64, now: DateTime<Utc>) -> Result<bool> {
        progress::unlock_user_level_on_conn(self.conn, user_id, level_id, now)
    }

    fn count_completed_user_levels(&self, level_id: i64) -> Result<i64> {
        progress::count_completed_user_levels_on_conn(self.conn, level_id)
    }

    fn get_user_weekly_goal(
        &self,
        user_id: &str,
        weekly_goal_id: i64,
    ) -> Result<Option<UserWeeklyGoal>> {
        progress::get_user_weekly_goal_on_conn(self.conn, user_id, weekly_goal_id)
    }

    fn insert_user_weekly_goal(&self, row: &UserWeeklyGoal, now: DateTime<Utc>) -> Result<()> {
        progress::insert_user_weekly_goal(self.conn, row, now)
    }

    fn update_user_weekly_progress(
        &self,
        user_id: &str,
        weekly_goal_id: i64,
        progress: i32,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        progress::update_user_weekly_progress_on_conn(self.conn, user_id, weekly_goal_id, progress, now)
    }

    fn complete_user_weekly_goal(
        &self,
        user_id: &str,
        weekly_goal_id: i64,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<bool> {
        progress::complete_user_weekly_goal_on_conn(self.conn, user_id, weekly_goal_id, points, now)
    }

    fn count_drills_on(&self, user_id: &str, day: NaiveDate) -> Result<i64> {
        drills::count_drills_on_conn(self.conn, user_id, day)
    }

    fn insert_drill_completion(&self, drill: &DrillCompletion) -> Result<i64> {
        drills::insert_drill_completion(self.conn, drill)
    }

    fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        metadata::set_metadata_on_conn(self.conn, key, value)
    }

    fn get_metadata(&self, key: &str) -> Result<String> {
        metadata::get_metadata_on_conn(self.conn, key)
    }

    fn bump_catalog_version(&self) -> Result<i64> {
        catalog::bump_catalog_version_on_conn(self.conn)
    }
}

// ---------------------------------------------------------------------------
// SqliteStore::run_in_transaction
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// Runs a closure inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is held from the first statement, so two processes
    /// racing on the same completion serialize here and the loser observes
    /// the winner's committed row.
    pub fn run_in_transaction_impl(
        &self,
        f: &mut dyn FnMut(&dyn Transaction) -> Result<()>,
    ) -> Result<()> {
        let conn = self.lock_conn()?;
        let tx = rusqlite::Transaction::new_unchecked(&conn, TransactionBehavior::Immediate)
            .map_err(|e| StorageError::Transaction(format!("failed to begin: {e}")))?;

        let sqlite_tx = SqliteTx { conn: &tx };
        match f(&sqlite_tx) {
            Ok(()) => {
                tx.commit()
                    .map_err(|e| StorageError::Transaction(format!("failed to commit: {e}")))?;
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "rolling back transaction");
                // Rolled back on drop.
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hoops_core::enums::AwardSource;

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 17, 0, 0).unwrap()
    }

    #[test]
    fn transaction_commit() {
        let store = test_store();
        store
            .run_in_transaction_impl(&mut |tx| {
                tx.create_profile(&PlayerProfile::new("kid", "rookie", t0()))?;
                let total = tx.add_points("kid", 15, t0())?;
                tx.record_award(&PointAward {
                    id: 0,
                    user_id: "kid".into(),
                    source: AwardSource::Drill,
                    source_id: 1,
                    points: 15,
                    awarded_at: t0(),
                })?;
                assert_eq!(total, 15);
                Ok(())
            })
            .unwrap();

        assert_eq!(store.get_profile_impl("kid").unwrap().total_points, 15);
        assert_eq!(store.ledger_total_impl("kid").unwrap(), 15);
    }

    #[test]
    fn transaction_rollback_on_error() {
        let store = test_store();
        let result = store.run_in_transaction_impl(&mut |tx| {
            tx.create_profile(&PlayerProfile::new("kid", "rookie", t0()))?;
            tx.add_points("kid", 10, t0())?;
            Err(StorageError::Aborted("test rollback".into()))
        });
        assert!(matches!(result, Err(StorageError::Aborted(_))));
        assert!(store.get_profile_impl("kid").unwrap_err().is_not_found());
    }

    #[test]
    fn closure_can_capture_results() {
        let store = test_store();
        let mut created = None;
        store
            .run_in_transaction_impl(&mut |tx| {
                let level = tx.create_level(
                    &NewLevel {
                        level_number: 1,
                        tag: "rookie".into(),
                        name: "Rookie".into(),
                        points_required: 0,
                    },
                    t0(),
                )?;
                created = Some(level);
                Ok(())
            })
            .unwrap();
        let level = created.unwrap();
        assert_eq!(store.list_levels_impl().unwrap(), vec![level]);
    }
}
