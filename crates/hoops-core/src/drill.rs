//! Drill completions, produced by the drill tracker and consumed by the
//! streak calculator.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Highest rating a drill can receive; also the "perfect" rating.
pub const PERFECT_RATING: u8 = 5;

/// One finished practice drill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillCompletion {
    pub id: i64,
    pub user_id: String,
    pub drill_id: String,
    pub duration_seconds: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub completed_at: DateTime<Utc>,
    /// Local calendar day the completion counts towards.
    pub activity_date: NaiveDate,
    /// Points credited for this completion, bonuses included.
    pub points_awarded: i64,
}

impl DrillCompletion {
    /// Returns `true` if the drill was rated perfect.
    pub fn is_perfect(&self) -> bool {
        self.rating == Some(PERFECT_RATING)
    }
}
