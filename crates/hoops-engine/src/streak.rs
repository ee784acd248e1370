//! Drill completions, daily streaks, and drill points.
//!
//! Streak logic runs only for the first completion of a local calendar day.
//! That completion extends the streak when the previous day had one, and
//! otherwise restarts it at 1. Later completions on the same day earn points
//! but leave the streak alone.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{debug, info};

use hoops_core::award::PointAward;
use hoops_core::drill::DrillCompletion;
use hoops_core::enums::AwardSource;
use hoops_core::scoring::{DrillPoints, PointRules};
use hoops_core::validation::{validate_duration, validate_rating};
use hoops_storage::{Storage, Transaction};

use crate::error::{EngineError, Result};
use crate::tx::in_transaction;
use crate::ProgressionEngine;

/// Result of recording one drill completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrillOutcome {
    pub completion_id: i64,
    pub activity_date: NaiveDate,
    pub points_awarded: i64,
    pub breakdown: DrillPoints,
    pub new_streak: i32,
    pub longest_streak: i32,
    /// True when this completion extended the streak from yesterday.
    pub streak_extended: bool,
    pub total_points: i64,
}

/// Streak state after a day's first completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    pub current: i32,
    pub longest: i32,
    pub extended: bool,
}

/// Advances a streak for the first completion of a day.
pub fn advance(current: i32, longest: i32, active_yesterday: bool) -> StreakUpdate {
    let next = if active_yesterday { current + 1 } else { 1 };
    StreakUpdate {
        current: next,
        longest: longest.max(next),
        extended: active_yesterday,
    }
}

impl<S: Storage> ProgressionEngine<S> {
    /// Records a drill completion and credits its points.
    ///
    /// The completion row, the streak update, the point increment, and the
    /// ledger entry commit together.
    pub fn record_drill_completion(
        &self,
        user_id: &str,
        drill_id: &str,
        duration_seconds: i64,
        rating: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<DrillOutcome> {
        if drill_id.trim().is_empty() {
            return Err(EngineError::validation("drill id is required"));
        }
        let rating = validate_rating(rating)?;
        validate_duration(duration_seconds)?;

        let today = self.local_date(now);
        let rules = self.rules;
        in_transaction(&self.store, |tx| {
            record(
                tx,
                &rules,
                DrillCompletion {
                    id: 0,
                    user_id: user_id.to_string(),
                    drill_id: drill_id.trim().to_string(),
                    duration_seconds,
                    rating,
                    completed_at: now,
                    activity_date: today,
                    points_awarded: 0,
                },
            )
        })
    }
}

/// Records a validated completion against an open transaction.
///
/// `drill.activity_date` is the local day the streak is computed for.
pub fn record(
    tx: &dyn Transaction,
    rules: &PointRules,
    mut drill: DrillCompletion,
) -> Result<DrillOutcome> {
    let user = drill.user_id.clone();
    let user_id = user.as_str();
    let today = drill.activity_date;
    let now = drill.completed_at;
    let profile = tx.get_profile(user_id)?;

    let first_today = tx.count_drills_on(user_id, today)? == 0;
    let streak = if first_today {
        let active_yesterday = match today.pred_opt() {
            Some(yesterday) => tx.count_drills_on(user_id, yesterday)? > 0,
            None => false,
        };
        let update = advance(
            profile.current_streak,
            profile.longest_streak,
            active_yesterday,
        );
        tx.update_streak(user_id, update.current, update.longest, today, now)?;
        if update.extended {
            info!(user_id, streak = update.current, "streak extended");
        } else {
            debug!(user_id, previous = profile.current_streak, "streak started");
        }
        update
    } else {
        StreakUpdate {
            current: profile.current_streak,
            longest: profile.longest_streak,
            extended: false,
        }
    };

    let breakdown = rules.drill_points(drill.rating, streak.extended);
    let points = breakdown.total();
    drill.points_awarded = points;
    let completion_id = tx.insert_drill_completion(&drill)?;

    let total = tx.add_points(user_id, points, now)?;
    tx.record_award(&PointAward {
        id: 0,
        user_id: user.clone(),
        source: AwardSource::Drill,
        source_id: completion_id,
        points,
        awarded_at: now,
    })?;
    info!(user_id, drill_id = %drill.drill_id, points, total, "drill recorded");

    Ok(DrillOutcome {
        completion_id,
        activity_date: today,
        points_awarded: points,
        breakdown,
        new_streak: streak.current,
        longest_streak: streak.longest,
        streak_extended: streak.extended,
        total_points: total,
    })
}
