//! The progression catalog: levels, their goals, and weekly goals.
//!
//! Catalog rows are shared by every user and change only through explicit
//! administrative edits. Per-user state lives in [`crate::progress`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of goals a level may hold.
pub const MAX_GOALS_PER_LEVEL: i32 = 10;

/// Goal number reserved for the level test.
pub const LEVEL_TEST_GOAL_NUMBER: i32 = 10;

/// Longest allowed weekly goal window, in days.
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// One tier of the progression ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub id: i64,

    /// Unique, strictly ordered, 1-based.
    pub level_number: i32,

    /// Stable identifier stored in `PlayerProfile::current_level_tag`.
    pub tag: String,

    pub name: String,

    /// Informational only; unlocking is goal-driven.
    pub points_required: i64,
}

/// One objective within a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,

    pub level_id: i64,

    /// 1..=10, unique within the level.
    pub goal_number: i32,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// What must be achieved, as shown to the player.
    pub criteria: String,

    /// Awarded once, on completion.
    pub points: i64,

    /// Always `true` for goal #10, `false` otherwise.
    pub is_level_test: bool,

    /// Incremented on every edit.
    pub version: i32,
}

/// A goal scoped to a time window rather than the level ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyGoal {
    pub id: i64,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    pub criteria: String,

    pub points: i64,

    pub start_at: DateTime<Utc>,

    pub end_at: DateTime<Utc>,

    pub is_active: bool,
}

impl WeeklyGoal {
    /// Returns `true` if `now` falls within `[start_at, end_at]`.
    pub fn window_contains(&self, now: DateTime<Utc>) -> bool {
        self.start_at <= now && now <= self.end_at
    }

    /// Returns `true` if the goal accepts progress at `now`.
    pub fn accepts_progress(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.window_contains(now)
    }
}

// ---------------------------------------------------------------------------
// Inputs for catalog edits
// ---------------------------------------------------------------------------

/// Fields for creating a level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLevel {
    pub level_number: i32,
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub points_required: i64,
}

/// Fields for creating a goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGoal {
    pub level_id: i64,
    pub goal_number: i32,
    #[serde(default)]
    pub title: String,
    pub criteria: String,
    pub points: i64,
    pub is_level_test: bool,
}

/// Typed partial update for a goal. Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalUpdates {
    pub title: Option<String>,
    pub criteria: Option<String>,
    pub points: Option<i64>,
    pub is_level_test: Option<bool>,
}

impl GoalUpdates {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.criteria.is_none()
            && self.points.is_none()
            && self.is_level_test.is_none()
    }

    /// Returns a copy of `goal` with these updates applied (version untouched).
    pub fn apply_to(&self, goal: &Goal) -> Goal {
        let mut out = goal.clone();
        if let Some(ref t) = self.title {
            out.title = t.clone();
        }
        if let Some(ref c) = self.criteria {
            out.criteria = c.clone();
        }
        if let Some(p) = self.points {
            out.points = p;
        }
        if let Some(flag) = self.is_level_test {
            out.is_level_test = flag;
        }
        out
    }
}

/// Fields for creating a weekly goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWeeklyGoal {
    #[serde(default)]
    pub title: String,
    pub criteria: String,
    pub points: i64,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Ladder definition files
// ---------------------------------------------------------------------------

/// A whole ladder as written in a YAML catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct LadderDefinition {
    #[serde(default)]
    pub levels: Vec<LevelDefinition>,
}

/// One level inside a [`LadderDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub number: i32,
    pub tag: String,
    pub name: String,
    #[serde(default)]
    pub points_required: i64,
    #[serde(default)]
    pub goals: Vec<GoalDefinition>,
}

/// One goal inside a [`LevelDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalDefinition {
    pub number: i32,
    #[serde(default)]
    pub title: String,
    pub criteria: String,
    pub points: i64,
    /// Defaults to `number == 10` when omitted.
    #[serde(default)]
    pub level_test: Option<bool>,
}

impl LadderDefinition {
    /// Parses a ladder from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

impl LevelDefinition {
    /// Converts to a [`NewLevel`].
    pub fn to_new_level(&self) -> NewLevel {
        NewLevel {
            level_number: self.number,
            tag: self.tag.clone(),
            name: self.name.clone(),
            points_required: self.points_required,
        }
    }
}

impl GoalDefinition {
    /// Converts to a [`NewGoal`] owned by `level_id`.
    pub fn to_new_goal(&self, level_id: i64) -> NewGoal {
        NewGoal {
            level_id,
            goal_number: self.number,
            title: self.title.clone(),
            criteria: self.criteria.clone(),
            points: self.points,
            is_level_test: self
                .level_test
                .unwrap_or(self.number == LEVEL_TEST_GOAL_NUMBER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn weekly(start: DateTime<Utc>, days: i64, active: bool) -> WeeklyGoal {
        WeeklyGoal {
            id: 1,
            title: String::new(),
            criteria: "Make 50 free throws".into(),
            points: 40,
            start_at: start,
            end_at: start + Duration::days(days),
            is_active: active,
        }
    }

    #[test]
    fn weekly_window_is_inclusive() {
        let start = Utc::now();
        let w = weekly(start, 7, true);
        assert!(w.accepts_progress(start));
        assert!(w.accepts_progress(w.end_at));
        assert!(!w.accepts_progress(w.end_at + Duration::seconds(1)));
        assert!(!w.accepts_progress(start - Duration::seconds(1)));
    }

    #[test]
    fn inactive_weekly_goal_rejects_progress() {
        let start = Utc::now();
        let w = weekly(start, 7, false);
        assert!(w.window_contains(start));
        assert!(!w.accepts_progress(start));
    }

    #[test]
    fn goal_updates_apply_only_set_fields() {
        let goal = Goal {
            id: 3,
            level_id: 1,
            goal_number: 4,
            title: "Layups".into(),
            criteria: "10 left-hand layups".into(),
            points: 15,
            is_level_test: false,
            version: 1,
        };
        let updates = GoalUpdates {
            points: Some(20),
            ..GoalUpdates::default()
        };
        let updated = updates.apply_to(&goal);
        assert_eq!(updated.points, 20);
        assert_eq!(updated.criteria, goal.criteria);
        assert_eq!(updated.version, 1);
        assert!(GoalUpdates::default().is_empty());
    }

    #[test]
    fn ladder_yaml_defaults_level_test_on_goal_ten() {
        let yaml = r#"
levels:
  - number: 1
    tag: rookie
    name: Rookie
    goals:
      - number: 1
        criteria: Dribble 30 seconds with each hand
        points: 10
      - number: 10
        criteria: Rookie skills test
        points: 50
"#;
        let ladder = LadderDefinition::from_yaml(yaml).unwrap();
        assert_eq!(ladder.levels.len(), 1);
        let level = &ladder.levels[0];
        assert_eq!(level.points_required, 0);
        let goals: Vec<NewGoal> = level.goals.iter().map(|g| g.to_new_goal(7)).collect();
        assert!(!goals[0].is_level_test);
        assert!(goals[1].is_level_test);
        assert_eq!(goals[1].level_id, 7);
    }
}
