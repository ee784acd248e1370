//! Validation rules for catalog edits and practice inputs.

use chrono::Duration;

use crate::catalog::{
    Goal, LEVEL_TEST_GOAL_NUMBER, MAX_GOALS_PER_LEVEL, NewGoal, NewLevel, NewWeeklyGoal,
    WEEKLY_WINDOW_DAYS,
};
use crate::drill::PERFECT_RATING;

/// Error type for validation failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("user id is required")]
    UserIdRequired,

    #[error("user id must be 128 characters or less (got {0})")]
    UserIdTooLong(usize),

    #[error("level number must be 1 or greater (got {0})")]
    InvalidLevelNumber(i32),

    #[error("level tag is required")]
    LevelTagRequired,

    #[error("level name is required")]
    LevelNameRequired,

    #[error("points required cannot be negative (got {0})")]
    NegativePointsRequired(i64),

    #[error("goal number must be between 1 and {max} (got {got})", max = MAX_GOALS_PER_LEVEL)]
    InvalidGoalNumber { got: i32 },

    #[error("goal #{0} already exists in this level")]
    DuplicateGoalNumber(i32),

    #[error("level already has {max} goals", max = MAX_GOALS_PER_LEVEL)]
    LevelFull,

    #[error("goal #{n} must be the level test", n = LEVEL_TEST_GOAL_NUMBER)]
    LevelTestRequired,

    #[error("only goal #{n} can be the level test (got goal #{0})", n = LEVEL_TEST_GOAL_NUMBER)]
    LevelTestMisplaced(i32),

    #[error("criteria is required")]
    CriteriaRequired,

    #[error("points must be greater than zero (got {0})")]
    NonPositivePoints(i64),

    #[error("weekly goal must end after it starts")]
    EmptyWindow,

    #[error("weekly goal window must be {max} days or less", max = WEEKLY_WINDOW_DAYS)]
    WindowTooLong,

    #[error("rating must be between 1 and {max} (got {0})", max = PERFECT_RATING)]
    InvalidRating(i64),

    #[error("duration cannot be negative (got {0})")]
    NegativeDuration(i64),

    #[error("{0}")]
    Other(String),
}

/// Validates an identity-provider user id.
pub fn validate_user_id(user_id: &str) -> Result<(), ValidationError> {
    if user_id.trim().is_empty() {
        return Err(ValidationError::UserIdRequired);
    }
    if user_id.len() > 128 {
        return Err(ValidationError::UserIdTooLong(user_id.len()));
    }
    Ok(())
}

/// Validates a level before it is created.
pub fn validate_new_level(level: &NewLevel) -> Result<(), ValidationError> {
    if level.level_number < 1 {
        return Err(ValidationError::InvalidLevelNumber(level.level_number));
    }
    if level.tag.trim().is_empty() {
        return Err(ValidationError::LevelTagRequired);
    }
    if level.name.trim().is_empty() {
        return Err(ValidationError::LevelNameRequired);
    }
    if level.points_required < 0 {
        return Err(ValidationError::NegativePointsRequired(level.points_required));
    }
    Ok(())
}

/// Field-level rules shared by goal creation and goal edits.
fn validate_goal_fields(
    goal_number: i32,
    criteria: &str,
    points: i64,
    is_level_test: bool,
) -> Result<(), ValidationError> {
    if !(1..=MAX_GOALS_PER_LEVEL).contains(&goal_number) {
        return Err(ValidationError::InvalidGoalNumber { got: goal_number });
    }
    if criteria.trim().is_empty() {
        return Err(ValidationError::CriteriaRequired);
    }
    if points <= 0 {
        return Err(ValidationError::NonPositivePoints(points));
    }
    // The level test position is structural: #10 always, nothing else ever.
    if goal_number == LEVEL_TEST_GOAL_NUMBER && !is_level_test {
        return Err(ValidationError::LevelTestRequired);
    }
    if goal_number != LEVEL_TEST_GOAL_NUMBER && is_level_test {
        return Err(ValidationError::LevelTestMisplaced(goal_number));
    }
    Ok(())
}

/// Validates a new goal against the goals already in its level.
pub fn validate_new_goal(goal: &NewGoal, siblings: &[Goal]) -> Result<(), ValidationError> {
    validate_goal_fields(
        goal.goal_number,
        &goal.criteria,
        goal.points,
        goal.is_level_test,
    )?;
    if siblings.iter().any(|g| g.goal_number == goal.goal_number) {
        return Err(ValidationError::DuplicateGoalNumber(goal.goal_number));
    }
    if siblings.len() >= MAX_GOALS_PER_LEVEL as usize {
        return Err(ValidationError::LevelFull);
    }
    Ok(())
}

/// Validates a goal as it would look after an edit.
pub fn validate_goal(goal: &Goal) -> Result<(), ValidationError> {
    validate_goal_fields(
        goal.goal_number,
        &goal.criteria,
        goal.points,
        goal.is_level_test,
    )
}

/// Validates a weekly goal before it is created.
pub fn validate_new_weekly_goal(goal: &NewWeeklyGoal) -> Result<(), ValidationError> {
    if goal.criteria.trim().is_empty() {
        return Err(ValidationError::CriteriaRequired);
    }
    if goal.points <= 0 {
        return Err(ValidationError::NonPositivePoints(goal.points));
    }
    if goal.end_at <= goal.start_at {
        return Err(ValidationError::EmptyWindow);
    }
    if goal.end_at - goal.start_at > Duration::days(WEEKLY_WINDOW_DAYS) {
        return Err(ValidationError::WindowTooLong);
    }
    Ok(())
}

/// Validates an optional drill rating, narrowing it to `u8`.
pub fn validate_rating(rating: Option<i64>) -> Result<Option<u8>, ValidationError> {
    match rating {
        None => Ok(None),
        Some(r) if (1..=i64::from(PERFECT_RATING)).contains(&r) => Ok(Some(r as u8)),
        Some(r) => Err(ValidationError::InvalidRating(r)),
    }
}

/// Validates a drill duration.
pub fn validate_duration(seconds: i64) -> Result<(), ValidationError> {
    if seconds < 0 {
        return Err(ValidationError::NegativeDuration(seconds));
    }
    Ok(())
}
