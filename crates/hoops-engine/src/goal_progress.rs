//! Goal progress submission.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use hoops_core::award::PointAward;
use hoops_core::catalog::Goal;
use hoops_core::enums::{AwardSource, ProgressStatus};
use hoops_core::progress::{PROGRESS_MAX, UserGoal, clamp_progress};
use hoops_storage::{Storage, Transaction};

use crate::cascade::CascadeOutcome;
use crate::error::{EngineError, Result};
use crate::events::{self, ProgressEvent};
use crate::tx::in_transaction;
use crate::ProgressionEngine;

/// A user's goal state after a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserGoalView {
    pub goal_id: i64,
    pub level_id: i64,
    pub status: ProgressStatus,
    /// Stored progress. Clamped, and 100 once completed.
    pub progress: i32,
    pub points_earned: i64,
    /// Points credited by this call; 0 on repeats.
    pub points_awarded: i64,
    pub total_points: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// The level cascade triggered by a fresh completion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cascade: Option<CascadeOutcome>,
}

impl UserGoalView {
    fn new(goal: &Goal, row: UserGoal, points_awarded: i64, total_points: i64) -> Self {
        Self {
            goal_id: goal.id,
            level_id: goal.level_id,
            status: row.status,
            progress: row.progress,
            points_earned: row.points_earned,
            points_awarded,
            total_points,
            started_at: row.started_at,
            completed_at: row.completed_at,
            cascade: None,
        }
    }
}

impl<S: Storage> ProgressionEngine<S> {
    /// Records progress on a goal and awards its points on first completion.
    ///
    /// `progress` is clamped to 0..=100. The goal completes when `completed`
    /// is set or progress reaches 100. Completion is a compare-and-swap inside
    /// the transaction, so repeats and concurrent submissions award nothing.
    pub fn submit_goal_progress(
        &self,
        user_id: &str,
        goal_id: i64,
        progress: i64,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Result<UserGoalView> {
        in_transaction(&self.store, |tx| {
            submit(tx, user_id, goal_id, progress, completed, now)
        })
    }
}

/// The goal progress operation against an open transaction.
pub fn submit(
    tx: &dyn Transaction,
    user_id: &str,
    goal_id: i64,
    progress: i64,
    completed: bool,
    now: DateTime<Utc>,
) -> Result<UserGoalView> {
    let goal = tx.get_goal(goal_id)?;
    let profile = tx.get_profile(user_id)?;
    let progress = clamp_progress(progress);

    let row = match tx.get_user_goal(user_id, goal_id)? {
        Some(row) => row,
        None => {
            let row = UserGoal::unlocked(user_id, goal_id);
            tx.insert_user_goal(&row, now)?;
            row
        }
    };

    if row.is_completed() {
        debug!(user_id, goal_id, "goal already completed");
        return Ok(UserGoalView::new(&goal, row, 0, profile.total_points));
    }

    if completed || progress >= PROGRESS_MAX {
        if !tx.complete_user_goal(user_id, goal_id, goal.points, now)? {
            let row = reload(tx, user_id, goal_id)?;
            return Ok(UserGoalView::new(&goal, row, 0, profile.total_points));
        }

        let total = tx.add_points(user_id, goal.points, now)?;
        tx.record_award(&PointAward {
            id: 0,
            user_id: user_id.to_string(),
            source: AwardSource::Goal,
            source_id: goal.id,
            points: goal.points,
            awarded_at: now,
        })?;
        info!(
            user_id,
            goal_id,
            goal_number = goal.goal_number,
            points = goal.points,
            total,
            "goal completed"
        );

        let event = ProgressEvent::GoalCompleted {
            user_id: user_id.to_string(),
            goal_id,
            level_id: goal.level_id,
        };
        let cascade = events::dispatch(tx, &event, now)?;

        let row = reload(tx, user_id, goal_id)?;
        let mut view = UserGoalView::new(&goal, row, goal.points, total);
        view.cascade = cascade;
        return Ok(view);
    }

    let status = if progress > 0 {
        ProgressStatus::InProgress
    } else {
        row.status
    };
    let started_at = (progress > 0).then_some(now);
    tx.update_user_goal_progress(user_id, goal_id, progress, status, started_at, now)?;
    debug!(user_id, goal_id, progress, %status, "goal progress recorded");

    let row = reload(tx, user_id, goal_id)?;
    Ok(UserGoalView::new(&goal, row, 0, profile.total_points))
}

fn reload(tx: &dyn Transaction, user_id: &str, goal_id: i64) -> Result<UserGoal> {
    tx.get_user_goal(user_id, goal_id)?
        .ok_or_else(|| EngineError::not_found("user goal", format!("{user_id}/{goal_id}")))
}
