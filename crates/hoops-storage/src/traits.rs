//! Storage and Transaction traits -- the public API for progression state.
//!
//! Consumers depend on these traits rather than on concrete implementations so
//! that alternative backends (mocks, proxies, etc.) can be substituted.

use chrono::{DateTime, NaiveDate, Utc};

use hoops_core::award::PointAward;
use hoops_core::catalog::{Goal, Level, NewGoal, NewLevel, NewWeeklyGoal, WeeklyGoal};
use hoops_core::drill::DrillCompletion;
use hoops_core::enums::ProgressStatus;
use hoops_core::profile::PlayerProfile;
use hoops_core::progress::{UserGoal, UserLevel, UserWeeklyGoal};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Storage trait
// ---------------------------------------------------------------------------

/// Primary storage interface.
///
/// Read methods here run outside any transaction and may observe slightly
/// stale data relative to each other. Every mutation of progression state
/// goes through [`Storage::run_in_transaction`].
pub trait Storage: Send + Sync {
    // -- Profiles ------------------------------------------------------------

    /// Retrieves a profile by user id.
    fn get_profile(&self, user_id: &str) -> Result<PlayerProfile>;

    /// Returns every profile, ordered by user id.
    fn list_profiles(&self) -> Result<Vec<PlayerProfile>>;

    // -- Catalog -------------------------------------------------------------

    /// Returns all levels ordered by level number.
    fn list_levels(&self) -> Result<Vec<Level>>;

    /// Returns a level's goals ordered by goal number.
    fn list_goals_for_level(&self, level_id: i64) -> Result<Vec<Goal>>;

    /// Retrieves a goal by id.
    fn get_goal(&self, goal_id: i64) -> Result<Goal>;

    /// Returns all weekly goals, newest window first.
    fn list_weekly_goals(&self) -> Result<Vec<WeeklyGoal>>;

    // -- Per-user progress ---------------------------------------------------

    /// Returns the user's level rows (only levels that have one).
    fn list_user_levels(&self, user_id: &str) -> Result<Vec<UserLevel>>;

    /// Returns the user's goal rows for one level.
    fn list_user_goals_for_level(&self, user_id: &str, level_id: i64) -> Result<Vec<UserGoal>>;

    /// Returns the user's weekly goal rows.
    fn list_user_weekly_goals(&self, user_id: &str) -> Result<Vec<UserWeeklyGoal>>;

    // -- Ledger and drills ---------------------------------------------------

    /// Sums ledger entries with `from < awarded_at <= to`.
    fn points_between(&self, user_id: &str, from: DateTime<Utc>, to: DateTime<Utc>)
    -> Result<i64>;

    /// Sums every ledger entry for the user.
    fn ledger_total(&self, user_id: &str) -> Result<i64>;

    /// Returns the most recent ledger entries, newest first.
    fn recent_awards(&self, user_id: &str, limit: i64) -> Result<Vec<PointAward>>;

    /// Counts drill completions with `from < completed_at <= to`.
    fn count_drills_between(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64>;

    /// Returns the most recent drill completions, newest first.
    fn recent_drills(&self, user_id: &str, limit: i64) -> Result<Vec<DrillCompletion>>;

    // -- Metadata ------------------------------------------------------------

    /// Gets a metadata value by key.
    fn get_metadata(&self, key: &str) -> Result<String>;

    // -- Transactions --------------------------------------------------------

    /// Executes a closure within a database transaction.
    ///
    /// The write lock is taken when the transaction begins, so reads inside
    /// the closure observe the state its writes will replace. If the closure
    /// returns `Ok`, the transaction is committed; otherwise it is rolled back.
    fn run_in_transaction(&self, f: &mut dyn FnMut(&dyn Transaction) -> Result<()>) -> Result<()>;

    // -- Lifecycle -----------------------------------------------------------

    /// Closes the database connection and releases resources.
    fn close(&self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Transaction trait
// ---------------------------------------------------------------------------

/// Operations available inside a transaction.
///
/// All operations share a single database connection and are committed or
/// rolled back atomically. The `complete_*` and `unlock_*` methods are
/// compare-and-swap primitives: they report whether *this* call performed the
/// transition, and callers must gate point awards on that result.
pub trait Transaction {
    // -- Profiles ------------------------------------------------------------

    fn create_profile(&self, profile: &PlayerProfile) -> Result<()>;
    fn get_profile(&self, user_id: &str) -> Result<PlayerProfile>;
    /// Adds `points` to the total and returns the new total.
    fn add_points(&self, user_id: &str, points: i64, now: DateTime<Utc>) -> Result<i64>;
    fn update_streak(
        &self,
        user_id: &str,
        current: i32,
        longest: i32,
        last_active: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<()>;
    fn set_current_level_tag(&self, user_id: &str, tag: &str, now: DateTime<Utc>) -> Result<()>;

    // -- Ledger --------------------------------------------------------------

    /// Appends a ledger entry and returns its id.
    fn record_award(&self, award: &PointAward) -> Result<i64>;

    // -- Catalog -------------------------------------------------------------

    fn create_level(&self, level: &NewLevel, now: DateTime<Utc>) -> Result<Level>;
    fn get_level(&self, level_id: i64) -> Result<Level>;
    fn get_level_by_number(&self, level_number: i32) -> Result<Option<Level>>;
    fn list_levels(&self) -> Result<Vec<Level>>;
    fn create_goal(&self, goal: &NewGoal, now: DateTime<Utc>) -> Result<Goal>;
    fn get_goal(&self, goal_id: i64) -> Result<Goal>;
    /// Writes the goal's editable fields and bumps its version.
    fn update_goal(&self, goal: &Goal, now: DateTime<Utc>) -> Result<Goal>;
    fn list_goals_for_level(&self, level_id: i64) -> Result<Vec<Goal>>;
    fn create_weekly_goal(&self, goal: &NewWeeklyGoal, now: DateTime<Utc>) -> Result<WeeklyGoal>;
    fn get_weekly_goal(&self, weekly_goal_id: i64) -> Result<WeeklyGoal>;
    fn set_weekly_goal_active(&self, weekly_goal_id: i64, active: bool) -> Result<()>;

    // -- User goals ----------------------------------------------------------

    fn get_user_goal(&self, user_id: &str, goal_id: i64) -> Result<Option<UserGoal>>;
    fn insert_user_goal(&self, row: &UserGoal, now: DateTime<Utc>) -> Result<()>;
    /// Writes progress/status on a non-completed row. Returns `false` if the
    /// row was already completed.
    fn update_user_goal_progress(
        &self,
        user_id: &str,
        goal_id: i64,
        progress: i32,
        status: ProgressStatus,
        started_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool>;
    /// Marks the row completed unless it already is.
    fn complete_user_goal(
        &self,
        user_id: &str,
        goal_id: i64,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<bool>;
    fn list_user_goals_for_level(&self, user_id: &str, level_id: i64) -> Result<Vec<UserGoal>>;

    // -- User levels ---------------------------------------------------------

    fn get_user_level(&self, user_id: &str, level_id: i64) -> Result<Option<UserLevel>>;
    /// Records the completed-goal percentage, raising the status to
    /// in-progress when `progress > 0`. Never touches a completed row.
    fn record_level_progress(
        &self,
        user_id: &str,
        level_id: i64,
        progress: i32,
        now: DateTime<Utc>,
    ) -> Result<()>;
    /// Marks the level completed unless it already is.
    fn complete_user_level(&self, user_id: &str, level_id: i64, now: DateTime<Utc>) -> Result<bool>;
    /// Unlocks the level if its row is absent or locked.
    fn unlock_user_level(&self, user_id: &str, level_id: i64, now: DateTime<Utc>) -> Result<bool>;
    /// Counts users who have completed the level.
    fn count_completed_user_levels(&self, level_id: i64) -> Result<i64>;

    // -- User weekly goals ---------------------------------------------------

    fn get_user_weekly_goal(&self, user_id: &str, weekly_goal_id: i64)
    -> Result<Option<UserWeeklyGoal>>;
    fn insert_user_weekly_goal(&self, row: &UserWeeklyGoal, now: DateTime<Utc>) -> Result<()>;
    /// Writes progress on an active row. Returns `false` if it was not active.
    fn update_user_weekly_progress(
        &self,
        user_id: &str,
        weekly_goal_id: i64,
        progress: i32,
        now: DateTime<Utc>,
    ) -> Result<bool>;
    /// Marks the row completed unless it already is.
    fn complete_user_weekly_goal(
        &self,
        user_id: &str,
        weekly_goal_id: i64,
        points: i64,
        now: DateTime<Utc>,
    ) -> Result<bool>;

    // -- Drills --------------------------------------------------------------

    /// Counts the user's completions on a local calendar day.
    fn count_drills_on(&self, user_id: &str, day: NaiveDate) -> Result<i64>;
    /// Persists a completion and returns its id.
    fn insert_drill_completion(&self, drill: &DrillCompletion) -> Result<i64>;

    // -- Metadata ------------------------------------------------------------

    fn set_metadata(&self, key: &str, value: &str) -> Result<()>;
    fn get_metadata(&self, key: &str) -> Result<String>;
    /// Increments the store-wide catalog version and returns it.
    fn bump_catalog_version(&self) -> Result<i64>;
}
