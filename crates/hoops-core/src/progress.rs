//! Per-user progress rows joining a user to a catalog item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::{ProgressStatus, WeeklyStatus};

/// Upper bound of every progress value.
pub const PROGRESS_MAX: i32 = 100;

/// Clamps a submitted progress value into `0..=100`.
pub fn clamp_progress(progress: i64) -> i32 {
    progress.clamp(0, i64::from(PROGRESS_MAX)) as i32
}

/// Percentage of `done` out of `total`, rounded down. Zero when `total` is zero.
pub fn percent_of(done: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    ((done * 100) / total) as i32
}

/// A user's state on one level goal.
///
/// `points_earned > 0` exactly when `status == Completed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGoal {
    pub user_id: String,
    pub goal_id: i64,
    pub status: ProgressStatus,
    pub progress: i32,
    pub points_earned: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserGoal {
    /// The row created lazily on first submission.
    pub fn unlocked(user_id: impl Into<String>, goal_id: i64) -> Self {
        Self {
            user_id: user_id.into(),
            goal_id,
            status: ProgressStatus::Unlocked,
            progress: 0,
            points_earned: 0,
            started_at: None,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == ProgressStatus::Completed
    }
}

/// A user's state on one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLevel {
    pub user_id: String,
    pub level_id: i64,
    pub status: ProgressStatus,
    /// Percentage of the level's goals completed.
    pub progress: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A user's state on one weekly goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserWeeklyGoal {
    pub user_id: String,
    pub weekly_goal_id: i64,
    pub status: WeeklyStatus,
    pub progress: i32,
    pub points_earned: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl UserWeeklyGoal {
    /// The row created lazily on first submission.
    pub fn active(user_id: impl Into<String>, weekly_goal_id: i64) -> Self {
        Self {
            user_id: user_id.into(),
            weekly_goal_id,
            status: WeeklyStatus::Active,
            progress: 0,
            points_earned: 0,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == WeeklyStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp_progress(150), 100);
        assert_eq!(clamp_progress(-10), 0);
        assert_eq!(clamp_progress(42), 42);
        assert_eq!(clamp_progress(i64::MAX), 100);
    }

    #[test]
    fn percent_rounds_down() {
        assert_eq!(percent_of(0, 10), 0);
        assert_eq!(percent_of(3, 10), 30);
        assert_eq!(percent_of(2, 3), 66);
        assert_eq!(percent_of(4, 0), 0);
    }

    #[test]
    fn lazily_created_rows() {
        let g = UserGoal::unlocked("kid", 9);
        assert_eq!(g.status, ProgressStatus::Unlocked);
        assert_eq!(g.points_earned, 0);
        assert!(!g.is_completed());

        let w = UserWeeklyGoal::active("kid", 2);
        assert_eq!(w.status, WeeklyStatus::Active);
        assert!(!w.is_completed());
    }
}
