//! Read-only aggregate views: level progression, weekly goals, and stats.
//!
//! These read outside a transaction and may be slightly stale relative to
//! each other. Nothing here writes.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use hoops_core::catalog::{Goal, WeeklyGoal};
use hoops_core::enums::{ProgressStatus, WeeklyStatus};
use hoops_core::progress::{UserGoal, percent_of};
use hoops_storage::Storage;

use crate::error::Result;
use crate::ProgressionEngine;

/// Window used for "this week" statistics.
pub const STATS_WINDOW_DAYS: i64 = 7;

/// One level as seen by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelSummary {
    pub level_id: i64,
    pub level_number: i32,
    pub tag: String,
    pub name: String,
    pub status: ProgressStatus,
    pub progress: i32,
    pub goal_count: usize,
}

/// One goal of the current level as seen by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalProgressEntry {
    pub goal_id: i64,
    pub goal_number: i32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    pub criteria: String,
    pub points: i64,
    pub is_level_test: bool,
    pub status: ProgressStatus,
    pub progress: i32,
    pub points_earned: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GoalProgressEntry {
    fn new(goal: Goal, row: Option<&UserGoal>, level_reachable: bool) -> Self {
        let default_status = if level_reachable {
            ProgressStatus::Unlocked
        } else {
            ProgressStatus::Locked
        };
        Self {
            goal_id: goal.id,
            goal_number: goal.goal_number,
            title: goal.title,
            criteria: goal.criteria,
            points: goal.points,
            is_level_test: goal.is_level_test,
            status: row.map_or(default_status, |r| r.status),
            progress: row.map_or(0, |r| r.progress),
            points_earned: row.map_or(0, |r| r.points_earned),
            completed_at: row.and_then(|r| r.completed_at),
        }
    }
}

/// The user's position on the ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LevelProgression {
    pub user_id: String,
    pub current_level: Option<LevelSummary>,
    pub next_level: Option<LevelSummary>,
    /// Percentage of the current level's goals completed.
    pub progress_to_next: i32,
    pub ladder_complete: bool,
    pub goal_progress: Vec<GoalProgressEntry>,
    pub all_levels: Vec<LevelSummary>,
}

/// A weekly goal with the user's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyGoalEntry {
    #[serde(flatten)]
    pub goal: WeeklyGoal,
    pub status: WeeklyStatus,
    pub progress: i32,
    pub points_earned: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Dashboard statistics. Weekly figures come from the point ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerStats {
    pub user_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub display_name: String,
    pub total_points: i64,
    pub points_this_week: i64,
    pub drills_this_week: i64,
    pub current_streak: i32,
    pub longest_streak: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<NaiveDate>,
    pub current_level_tag: String,
}

/// Status of a level the user has no row for. The first level is always open.
fn implicit_status(first: bool) -> ProgressStatus {
    if first {
        ProgressStatus::Unlocked
    } else {
        ProgressStatus::Locked
    }
}

impl<S: Storage> ProgressionEngine<S> {
    /// Builds the user's level progression view.
    pub fn level_progression(&self, user_id: &str) -> Result<LevelProgression> {
        self.store.get_profile(user_id)?;
        let levels = self.store.list_levels()?;
        let rows = self.store.list_user_levels(user_id)?;

        let mut goals_by_level = Vec::with_capacity(levels.len());
        let mut all_levels = Vec::with_capacity(levels.len());
        for (i, level) in levels.iter().enumerate() {
            let goals = self.store.list_goals_for_level(level.id)?;
            let row = rows.iter().find(|r| r.level_id == level.id);
            all_levels.push(LevelSummary {
                level_id: level.id,
                level_number: level.level_number,
                tag: level.tag.clone(),
                name: level.name.clone(),
                status: row.map_or_else(|| implicit_status(i == 0), |r| r.status),
                progress: row.map_or(0, |r| r.progress),
                goal_count: goals.len(),
            });
            goals_by_level.push(goals);
        }

        let ladder_complete =
            !all_levels.is_empty() && all_levels.iter().all(|l| l.status.is_terminal());
        let current_idx = all_levels
            .iter()
            .position(|l| l.status.is_reachable() && !l.status.is_terminal())
            .or_else(|| all_levels.len().checked_sub(1));

        let mut progression = LevelProgression {
            user_id: user_id.to_string(),
            current_level: None,
            next_level: None,
            progress_to_next: 0,
            ladder_complete,
            goal_progress: Vec::new(),
            all_levels: Vec::new(),
        };

        if let Some(idx) = current_idx {
            let current = all_levels[idx].clone();
            let user_goals = self
                .store
                .list_user_goals_for_level(user_id, current.level_id)?;
            let goals = std::mem::take(&mut goals_by_level[idx]);
            let total = goals.len();
            let entries: Vec<GoalProgressEntry> = goals
                .into_iter()
                .map(|goal| {
                    let row = user_goals.iter().find(|r| r.goal_id == goal.id);
                    GoalProgressEntry::new(goal, row, current.status.is_reachable())
                })
                .collect();
            let done = entries
                .iter()
                .filter(|e| e.status == ProgressStatus::Completed)
                .count();

            progression.progress_to_next = if ladder_complete {
                100
            } else {
                percent_of(done, total)
            };
            progression.next_level = all_levels.get(idx + 1).cloned();
            progression.current_level = Some(current);
            progression.goal_progress = entries;
        }
        progression.all_levels = all_levels;
        Ok(progression)
    }

    /// Lists weekly goals with the user's state, newest window first.
    ///
    /// Uncompleted goals whose window has ended, or that were deactivated,
    /// are reported as expired.
    pub fn list_weekly_goals(&self, user_id: &str, now: DateTime<Utc>) -> Result<Vec<WeeklyGoalEntry>> {
        self.store.get_profile(user_id)?;
        let rows = self.store.list_user_weekly_goals(user_id)?;
        let entries = self
            .store
            .list_weekly_goals()?
            .into_iter()
            .map(|goal| {
                let row = rows.iter().find(|r| r.weekly_goal_id == goal.id);
                let status = match row {
                    Some(r) if r.is_completed() => WeeklyStatus::Completed,
                    _ if !goal.is_active || now > goal.end_at => WeeklyStatus::Expired,
                    _ => WeeklyStatus::Active,
                };
                WeeklyGoalEntry {
                    status,
                    progress: row.map_or(0, |r| r.progress),
                    points_earned: row.map_or(0, |r| r.points_earned),
                    completed_at: row.and_then(|r| r.completed_at),
                    goal,
                }
            })
            .collect();
        Ok(entries)
    }

    /// Dashboard statistics over the seven days ending at `now`.
    pub fn stats(&self, user_id: &str, now: DateTime<Utc>) -> Result<PlayerStats> {
        let profile = self.store.get_profile(user_id)?;
        let since = now - Duration::days(STATS_WINDOW_DAYS);
        Ok(PlayerStats {
            points_this_week: self.store.points_between(user_id, since, now)?,
            drills_this_week: self.store.count_drills_between(user_id, since, now)?,
            user_id: profile.user_id,
            display_name: profile.display_name,
            total_points: profile.total_points,
            current_streak: profile.current_streak,
            longest_streak: profile.longest_streak,
            last_active_date: profile.last_active_date,
            current_level_tag: profile.current_level_tag,
        })
    }
}
