//! Point ledger for [`SqliteStore`].

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};

use hoops_core::award::PointAward;

use crate::error::Result;
use crate::sqlite::columns::{format_datetime, get_datetime, get_enum};
use crate::sqlite::store::SqliteStore;

fn scan_award(row: &Row<'_>) -> rusqlite::Result<PointAward> {
    Ok(PointAward {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        source: get_enum(row, "source")?,
        source_id: row.get("source_id")?,
        points: row.get("points")?,
        awarded_at: get_datetime(row, "awarded_at")?,
    })
}

pub(crate) fn insert_award(conn: &Connection, award: &PointAward) -> Result<i64> {
    conn.execute(
        "INSERT INTO point_awards (user_id, source, source_id, points, awarded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            award.user_id,
            award.source.as_str(),
            award.source_id,
            award.points,
            format_datetime(&award.awarded_at)
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

impl SqliteStore {
    /// Sums ledger entries with `from < awarded_at <= to`.
    pub fn points_between_impl(
        &self,
        user_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<i64> {
        let conn = self.lock_conn()?;
        Ok(conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM point_awards
             WHERE user_id = ?1 AND awarded_at > ?2 AND awarded_at <= ?3",
            params![user_id, format_datetime(&from), format_datetime(&to)],
            |row| row.get(0),
        )?)
    }

    /// Sums every ledger entry for the user.
    pub fn ledger_total_impl(&self, user_id: &str) -> Result<i64> {
        let conn = self.lock_conn()?;
        Ok(conn.query_row(
            "SELECT COALESCE(SUM(points), 0) FROM point_awards WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?)
    }

    /// Returns the most recent ledger entries, newest first.
    pub fn recent_awards_impl(&self, user_id: &str, limit: i64) -> Result<Vec<PointAward>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, source, source_id, points, awarded_at
             FROM point_awards
             WHERE user_id = ?1
             ORDER BY awarded_at DESC, id DESC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![user_id, limit], scan_award)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
