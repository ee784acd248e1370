//! Storage backend for the hoops practice tracker.
//!
//! Provides the [`Storage`] trait and a SQLite implementation ([`SqliteStore`]).

pub mod error;
pub mod sqlite;
pub mod traits;

// Re-exports for convenience.
pub use error::StorageError;
pub use sqlite::SqliteStore;
pub use traits::{Storage, Transaction};

// ---------------------------------------------------------------------------
// Storage trait implementation for SqliteStore
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};

use hoops_core::award::PointAward;
use hoops_core::catalog::{Goal, Level, WeeklyGoal};
use hoops_core::drill::DrillCompletion;
use hoops_core::profile::PlayerProfile;
use hoops_core::progress::{UserGoal, UserLevel, UserWeeklyGoal};

use crate::error::Result;

impl Storage for SqliteStore {
    fn get_profile(&self, user_id: &str) -> Result<PlayerProfile> {
        self.get_profile_impl(user_id)
    }

    fn list_profiles(&self) -> Result<Vec<PlayerProfile>> {
        self.list_profiles_impl()
    }

    fn list_levels(&self) -> Result<Vec<Level>> {
        self.list_levels_impl()
    }

    fn list_goals_for_level(&self, level_id: i64) -> Result<Vec<Goal>> {
        self.list_goals_for_level_impl(level_id)
    }

    fn get_goal(&self, goal_id: i64) -> Result<Goal> {
        self.get_goal_impl(goal_id)
    }

    fn list_weekly_goals(&self) -> Result<Vec<WeeklyGoal>> {
        self.list_weekly_goals_impl()
    }

    fn list_user_levels(&self, user_id: &str) -> Result<Vec<UserLevel>> {
        self.list_user_levels_impl(user_id)
    }

    fn list_user_goals_for_level(&self, user_id: &str, level_id: i64) -> Result<Vec<UserGoal>> {
        self.list_user_goals_for_level_impl(user_id, level_id)
    }

    fn list_user_weekly_goals(&self, user_id: &str) -> Result<Vec<UserWeeklyGoal>> {
        self.list_user_weekly_goals_impl(user_id)
    }

    fn points_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        self.points_between_impl(user_id, from, to)
    }

    fn ledger_total(&self, user_id: &str) -> Result<i64> {
        self.ledger_total_impl(user_id)
    }

    fn recent_awards(&self, user_id: &str, limit: i64) -> Result<Vec<PointAward>> {
        self.recent_awards_impl(user_id, limit)
    }

    fn count_drills_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        self.count_drills_between_impl(user_id, from, to)
    }

    fn recent_drills(&self, user_id: &str, limit: i64) -> Result<Vec<DrillCompletion>> {
        self.recent_drills_impl(user_id, limit)
    }

    fn get_metadata(&self, key: &str) -> Result<String> {
        self.get_metadata_impl(key)
    }

    fn run_in_transaction(&self, f: &mut dyn FnMut(&dyn Transaction) -> Result<()>) -> Result<()> {
        self.run_in_transaction_impl(f)
    }

    fn close(&self) -> Result<()> {
        // SQLite connections are closed when the Connection is dropped.
        Ok(())
    }
}
