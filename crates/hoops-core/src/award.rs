//! Point ledger entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::AwardSource;

/// One credit to a user's point total.
///
/// Every change to `PlayerProfile::total_points` writes exactly one of these
/// in the same transaction, so the ledger is the authoritative history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointAward {
    pub id: i64,
    pub user_id: String,
    pub source: AwardSource,
    /// Goal id, weekly goal id, or drill completion id.
    pub source_id: i64,
    pub points: i64,
    pub awarded_at: DateTime<Utc>,
}
