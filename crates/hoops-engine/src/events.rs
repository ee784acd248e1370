//! Internal progression events.
//!
//! Completing a goal does not call the level cascade directly. The updater
//! emits a [`ProgressEvent`], and [`dispatch`] routes it to its consumers
//! inside the same transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;

use hoops_storage::Transaction;

use crate::cascade::{self, CascadeOutcome};
use crate::error::Result;

/// Something that happened to a user's progression state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// A goal moved to completed in this transaction.
    GoalCompleted {
        user_id: String,
        goal_id: i64,
        level_id: i64,
    },
}

/// Delivers an event to its consumers within `tx`.
pub(crate) fn dispatch(
    tx: &dyn Transaction,
    event: &ProgressEvent,
    now: DateTime<Utc>,
) -> Result<Option<CascadeOutcome>> {
    match event {
        ProgressEvent::GoalCompleted {
            user_id, level_id, ..
        } => cascade::check(tx, user_id, *level_id, now).map(Some),
    }
}
