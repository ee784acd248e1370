//! Weekly goal progress.
//!
//! Same shape as goal progress, scoped to a weekly goal and gated on its
//! window: a submission is accepted only while the goal is active and
//! `start_at <= now <= end_at`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use hoops_core::award::PointAward;
use hoops_core::catalog::WeeklyGoal;
use hoops_core::enums::{AwardSource, WeeklyStatus};
use hoops_core::progress::{PROGRESS_MAX, UserWeeklyGoal, clamp_progress};
use hoops_storage::{Storage, Transaction};

use crate::error::{EngineError, Result};
use crate::tx::in_transaction;
use crate::ProgressionEngine;

/// A user's weekly goal state after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserWeeklyGoalView {
    pub weekly_goal_id: i64,
    pub status: WeeklyStatus,
    pub progress: i32,
    pub points_earned: i64,
    pub points_awarded: i64,
    pub total_points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub end_at: DateTime<Utc>,
}

impl UserWeeklyGoalView {
    fn new(goal: &WeeklyGoal, row: UserWeeklyGoal, points_awarded: i64, total_points: i64) -> Self {
        Self {
            weekly_goal_id: goal.id,
            status: row.status,
            progress: row.progress,
            points_earned: row.points_earned,
            points_awarded,
            total_points,
            completed_at: row.completed_at,
            end_at: goal.end_at,
        }
    }
}

impl<S: Storage> ProgressionEngine<S> {
    /// Records progress on a weekly goal.
    ///
    /// Fails with [`EngineError::Expired`] outside the goal's window or after
    /// it was deactivated; nothing is written in that case.
    pub fn submit_weekly_progress(
        &self,
        user_id: &str,
        weekly_goal_id: i64,
        progress: i64,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<UserWeeklyGoalView> {
        in_transaction(&self.store, |tx| {
            submit(tx, user_id, weekly_goal_id, progress, completed, now)
        })
    }
}

/// The weekly progress operation against an open transaction.
pub fn submit(
    tx: &dyn Transaction,
    user_id: &str,
    weekly_goal_id: i64,
    progress: i64,
    completed: bool,
    now: DateTime<Utc>,
) -> Result<UserWeeklyGoalView> {
    let goal = tx.get_weekly_goal(weekly_goal_id)?;
    let profile = tx.get_profile(user_id)?;

    if !goal.accepts_progress(now) {
        let reason = if !goal.is_active {
            "goal is no longer active".to_string()
        } else if now < goal.start_at {
            format!("window opens at {}", goal.start_at.to_rfc3339())
        } else {
            format!("window closed at {}", goal.end_at.to_rfc3339())
        };
        info!(user_id, weekly_goal_id, %reason, "weekly submission rejected");
        return Err(EngineError::Expired {
            weekly_goal_id,
            reason,
        });
    }

    let progress = clamp_progress(progress);
    let row = match tx.get_user_weekly_goal(user_id, weekly_goal_id)? {
        Some(row) => row,
        None => {
            let row = UserWeeklyGoal::active(user_id, weekly_goal_id);
            tx.insert_user_weekly_goal(&row, now)?;
            row
        }
    };

    if row.is_completed() {
        debug!(user_id, weekly_goal_id, "weekly goal already completed");
        return Ok(UserWeeklyGoalView::new(&goal, row, 0, profile.total_points));
    }

    if completed || progress >= PROGRESS_MAX {
        if !tx.complete_user_weekly_goal(user_id, weekly_goal_id, goal.points, now)? {
            let row = reload(tx, user_id, weekly_goal_id)?;
            return Ok(UserWeeklyGoalView::new(&goal, row, 0, profile.total_points));
        }
        let total = tx.add_points(user_id, goal.points, now)?;
        tx.record_award(&PointAward {
            id: 0,
            user_id: user_id.to_string(),
            source: AwardSource::WeeklyGoal,
            source_id: goal.id,
            points: goal.points,
            awarded_at: now,
        })?;
        info!(user_id, weekly_goal_id, points = goal.points, total, "weekly goal completed");

        let row = reload(tx, user_id, weekly_goal_id)?;
        return Ok(UserWeeklyGoalView::new(&goal, row, goal.points, total));
    }

    tx.update_user_weekly_progress(user_id, weekly_goal_id, progress, now)?;
    debug!(user_id, weekly_goal_id, progress, "weekly progress recorded");
    let row = reload(tx, user_id, weekly_goal_id)?;
    Ok(UserWeeklyGoalView::new(&goal, row, 0, profile.total_points))
}

fn reload(tx: &dyn Transaction, user_id: &str, weekly_goal_id: i64) -> Result<UserWeeklyGoal> {
    tx.get_user_weekly_goal(user_id, weekly_goal_id)?
        .ok_or_else(|| {
            EngineError::not_found("user weekly goal", format!("{user_id}/{weekly_goal_id}"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use hoops_core::catalog::NewWeeklyGoal;
    use hoops_core::enums::Role;
    use hoops_storage::SqliteStore;
    use pretty_assertions::assert_eq;

    use crate::error::ErrorKind;
    use crate::testutil::{at, seeded};

    fn weekly(engine: &ProgressionEngine<SqliteStore>) -> WeeklyGoal {
        let start = at(2024, 3, 4, 0);
        engine
            .create_weekly_goal(
                Role::Admin,
                &NewWeeklyGoal {
                    title: "Free throws".into(),
                    criteria: "Make 100 free throws".into(),
                    points: 40,
                    start_at: start,
                    end_at: start + Duration::days(7),
                },
                at(2024, 3, 1, 12),
            )
            .unwrap()
    }

    #[test]
    fn progress_then_completion_awards_once() {
        let engine = seeded(1, 1);
        let goal = weekly(&engine);

        let view = engine
            .submit_weekly_progress("kid", goal.id, 30, false, at(2024, 3, 5, 9))
            .unwrap();
        assert_eq!(view.status, WeeklyStatus::Active);
        assert_eq!(view.progress, 30);

        let view = engine
            .submit_weekly_progress("kid", goal.id, 120, false, at(2024, 3, 6, 9))
            .unwrap();
        assert_eq!(view.status, WeeklyStatus::Completed);
        assert_eq!(view.progress, 100);
        assert_eq!(view.points_awarded, 40);
        assert_eq!(view.total_points, 40);

        let again = engine
            .submit_weekly_progress("kid", goal.id, 100, true, at(2024, 3, 7, 9))
            .unwrap();
        assert_eq!(again.points_awarded, 0);
        assert_eq!(engine.get_profile("kid").unwrap().total_points, 40);
    }

    #[test]
    fn after_window_is_expired_and_writes_nothing() {
        let engine = seeded(1, 1);
        let goal = weekly(&engine);
        let late = goal.end_at + Duration::seconds(1);

        let err = engine
            .submit_weekly_progress("kid", goal.id, 100, false, late)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Expired);
        assert_eq!(engine.get_profile("kid").unwrap().total_points, 0);
        assert!(engine.store().list_user_weekly_goals("kid").unwrap().is_empty());
    }

    #[test]
    fn window_bounds_are_inclusive() {
        let engine = seeded(1, 1);
        let goal = weekly(&engine);
        assert!(engine
            .submit_weekly_progress("kid", goal.id, 10, false, goal.start_at)
            .is_ok());
        assert!(engine
            .submit_weekly_progress("kid", goal.id, 20, false, goal.end_at)
            .is_ok());
        let early = engine
            .submit_weekly_progress("kid", goal.id, 20, false, goal.start_at - Duration::seconds(1))
            .unwrap_err();
        assert_eq!(early.kind(), ErrorKind::Expired);
    }

    #[test]
    fn deactivated_goal_is_expired() {
        let engine = seeded(1, 1);
        let goal = weekly(&engine);
        engine
            .set_weekly_goal_active(Role::Admin, goal.id, false)
            .unwrap();
        let err = engine
            .submit_weekly_progress("kid", goal.id, 50, false, at(2024, 3, 5, 9))
            .unwrap_err();
        assert!(matches!(err, EngineError::Expired { ref reason, .. } if reason.contains("active")));
    }

    #[test]
    fn unknown_weekly_goal_not_found() {
        let engine = seeded(1, 1);
        let err = engine
            .submit_weekly_progress("kid", 42, 50, false, at(2024, 3, 5, 9))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
