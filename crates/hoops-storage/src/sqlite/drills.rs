//! Drill completion records for [`SqliteStore`].

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, Row, params};

use hoops_core::drill::DrillCompletion;

use crate::error::{Result, StorageError};
use crate::sqlite::columns::{format_date, format_datetime, get_date, get_datetime};
use crate::sqlite::store::SqliteStore;

fn scan_drill(row: &Row<'_>) -> rusqlite::Result<DrillCompletion> {
    let rating: Option<i64> = row.get("rating")?;
    Ok(DrillCompletion {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        drill_id: row.get("drill_id")?,
        duration_seconds: row.get("duration_seconds")?,
        rating: rating.and_then(|r| u8::try_from(r).ok()),
        completed_at: get_datetime(row, "completed_at")?,
        activity_date: get_date(row, "activity_date")?,
        points_awarded: row.get("points_awarded")?,
    })
}

pub(crate) fn count_drills_on_conn(conn: &Connection, user_id: &str, day: NaiveDate) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM drill_completions WHERE user_id = ?1 AND activity_date = ?2",
        params![user_id, format_date(&day)],
        |row| row.get(0),
    )?)
}

pub(crate) fn insert_drill_completion(conn: &Connection, drill: &DrillCompletion) -> Result<i64> {
    conn.execute(
        "INSERT INTO drill_completions (user_id, drill_id, duration_seconds, rating,
             completed_at, activity_date, points_awarded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            drill.user_id,
            drill.drill_id,
            drill.duration_seconds,
            drill.rating,
            format_datetime(&drill.completed_at),
            format_date(&drill.activity_date),
            drill.points_awarded,
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(ref f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
        {
            StorageError::not_found("profile", &drill.user_id)
        }
        other => StorageError::Query(other),
    })?;
    Ok(conn.last_insert_rowid())
}

impl SqliteStore {
    /// Counts drill completions with `from < completed_at <= to`.
    pub fn count_drills_between_impl(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.lock_conn()?;
        Ok(conn.query_row(
            "SELECT COUNT(*) FROM drill_completions
             WHERE user_id = ?1 AND completed_at > ?2 AND completed_at <= ?3",
            params![user_id, format_datetime(&from), format_datetime(&to)],
            |row| row.get(0),
        )?)
    }

    /// Returns the most recent drill completions, newest first.
    pub fn recent_drills_impl(&self, user_id: &str, limit: i64) -> Result<Vec<DrillCompletion>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, drill_id, duration_seconds, rating, completed_at,
                    activity_date, points_awarded
             FROM drill_completions
             WHERE user_id = ?1
             ORDER BY completed_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit], scan_drill)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
