//! Per-user gamification state.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Persisted gamification state for one user.
///
/// Created at signup and never deleted while the user exists. Only the
/// progression engine mutates points and streak fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub user_id: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    /// Running total; always equal to the sum of the user's ledger entries.
    pub total_points: i64,

    pub current_streak: i32,

    /// Maximum `current_streak` ever observed.
    pub longest_streak: i32,

    /// Local calendar date of the last streak-relevant event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<NaiveDate>,

    /// Tag of the level the user is currently working on.
    #[serde(default)]
    pub current_level_tag: String,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl PlayerProfile {
    /// A fresh profile with zero points and no streak.
    pub fn new(user_id: impl Into<String>, level_tag: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: String::new(),
            total_points: 0,
            current_streak: 0,
            longest_streak: 0,
            last_active_date: None,
            current_level_tag: level_tag.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sets the display name (builder style).
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }
}
