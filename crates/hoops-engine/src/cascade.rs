//! Level cascade: completing every goal in a level completes the level and
//! unlocks the next one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info};

use hoops_core::catalog::Level;
use hoops_core::enums::ProgressStatus;
use hoops_core::progress::percent_of;
use hoops_storage::Transaction;

use crate::error::Result;

/// What a cascade check did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeOutcome {
    pub level_id: i64,
    pub level_number: i32,
    /// Percentage of the level's goals the user has completed.
    pub progress: i32,
    /// True only for the check that moved the level to completed.
    pub newly_completed: bool,
    /// The next level, when this check unlocked it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unlocked_level: Option<Level>,
}

/// Re-evaluates one level for one user.
///
/// Records the completed-goal percentage, and when every goal is complete
/// marks the level completed and unlocks `level_number + 1`. Running it again
/// on a completed level changes nothing. A level with no goals never
/// completes.
pub fn check(
    tx: &dyn Transaction,
    user_id: &str,
    level_id: i64,
    now: DateTime<Utc>,
) -> Result<CascadeOutcome> {
    let level = tx.get_level(level_id)?;
    let goals = tx.list_goals_for_level(level_id)?;
    let rows = tx.list_user_goals_for_level(user_id, level_id)?;

    let done = goals
        .iter()
        .filter(|g| rows.iter().any(|r| r.goal_id == g.id && r.is_completed()))
        .count();
    let progress = percent_of(done, goals.len());
    let all_done = !goals.is_empty() && done == goals.len();

    let mut outcome = CascadeOutcome {
        level_id,
        level_number: level.level_number,
        progress,
        newly_completed: false,
        unlocked_level: None,
    };

    if !all_done {
        tx.record_level_progress(user_id, level_id, progress, now)?;
        debug!(user_id, level = level.level_number, progress, "level progress recorded");
        return Ok(outcome);
    }

    if !tx.complete_user_level(user_id, level_id, now)? {
        return Ok(outcome);
    }
    outcome.newly_completed = true;
    info!(user_id, level = level.level_number, tag = %level.tag, "level completed");

    let Some(next) = tx.get_level_by_number(level.level_number + 1)? else {
        info!(user_id, level = level.level_number, "ladder complete");
        return Ok(outcome);
    };

    if tx.unlock_user_level(user_id, next.id, now)? {
        info!(user_id, level = next.level_number, tag = %next.tag, "level unlocked");
    }
    advance_level_tag(tx, user_id, &level, now)?;
    outcome.unlocked_level = Some(next);
    Ok(outcome)
}

/// Moves the profile's level tag past `completed`.
///
/// Only a completion of the profile's current level moves the tag, so levels
/// finished out of order never skip one still open. The tag lands on the first
/// later level the user has not completed, or on the last level.
fn advance_level_tag(
    tx: &dyn Transaction,
    user_id: &str,
    completed: &Level,
    now: DateTime<Utc>,
) -> Result<()> {
    let profile = tx.get_profile(user_id)?;
    let levels = tx.list_levels()?;
    let current = levels
        .iter()
        .find(|l| l.tag == profile.current_level_tag)
        .map(|l| l.level_number);
    if current.is_some_and(|n| n != completed.level_number) {
        debug!(user_id, level = completed.level_number, "level tag unchanged");
        return Ok(());
    }

    let mut target = None;
    for level in levels.iter().filter(|l| l.level_number > completed.level_number) {
        target = Some(level);
        let finished = tx
            .get_user_level(user_id, level.id)?
            .is_some_and(|row| row.status == ProgressStatus::Completed);
        if !finished {
            break;
        }
    }
    match target {
        Some(level) => Ok(tx.set_current_level_tag(user_id, &level.tag, now)?),
        None => Ok(()),
    }
}
