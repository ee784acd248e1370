//! Catalog operations (levels, goals, weekly goals) for [`SqliteStore`].

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use hoops_core::catalog::{Goal, Level, NewGoal, NewLevel, NewWeeklyGoal, WeeklyGoal};

use crate::error::{Result, StorageError, not_found_or, unique_or};
use crate::sqlite::columns::{format_datetime, get_bool, get_datetime};
use crate::sqlite::schema::CATALOG_VERSION_KEY;
use crate::sqlite::store::SqliteStore;

const LEVEL_COLUMNS: &str = "id, level_number, tag, name, points_required";
const GOAL_COLUMNS: &str =
    "id, level_id, goal_number, title, criteria, points, is_level_test, version";
const WEEKLY_COLUMNS: &str = "id, title, criteria, points, start_at, end_at, is_active";

// ---------------------------------------------------------------------------
// Row scanning
// ---------------------------------------------------------------------------

fn scan_level(row: &Row<'_>) -> rusqlite::Result<Level> {
    Ok(Level {
        id: row.get("id")?,
        level_number: row.get("level_number")?,
        tag: row.get("tag")?,
        name: row.get("name")?,
        points_required: row.get("points_required")?,
    })
}

fn scan_goal(row: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get("id")?,
        level_id: row.get("level_id")?,
        goal_number: row.get("goal_number")?,
        title: row.get("title")?,
        criteria: row.get("criteria")?,
        points: row.get("points")?,
        is_level_test: get_bool(row, "is_level_test")?,
        version: row.get("version")?,
    })
}

fn scan_weekly(row: &Row<'_>) -> rusqlite::Result<WeeklyGoal> {
    Ok(WeeklyGoal {
        id: row.get("id")?,
        title: row.get("title")?,
        criteria: row.get("criteria")?,
        points: row.get("points")?,
        start_at: get_datetime(row, "start_at")?,
        end_at: get_datetime(row, "end_at")?,
        is_active: get_bool(row, "is_active")?,
    })
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

pub(crate) fn insert_level(conn: &Connection, level: &NewLevel, now: DateTime<Utc>) -> Result<Level> {
    conn.execute(
        "INSERT INTO levels (level_number, tag, name, points_required, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            level.level_number,
            level.tag,
            level.name,
            level.points_required,
            format_datetime(&now)
        ],
    )
    .map_err(unique_or(format!(
        "level number {} or tag {:?} already exists",
        level.level_number, level.tag
    )))?;
    get_level_on_conn(conn, conn.last_insert_rowid())
}

pub(crate) fn get_level_on_conn(conn: &Connection, level_id: i64) -> Result<Level> {
    conn.query_row(
        &format!("SELECT {LEVEL_COLUMNS} FROM levels WHERE id = ?1"),
        params![level_id],
        scan_level,
    )
    .map_err(not_found_or("level", level_id))
}

pub(crate) fn get_level_by_number_on_conn(conn: &Connection, number: i32) -> Result<Option<Level>> {
    Ok(conn
        .query_row(
            &format!("SELECT {LEVEL_COLUMNS} FROM levels WHERE level_number = ?1"),
            params![number],
            scan_level,
        )
        .optional()?)
}

pub(crate) fn list_levels_on_conn(conn: &Connection) -> Result<Vec<Level>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LEVEL_COLUMNS} FROM levels ORDER BY level_number"
    ))?;
    let rows = stmt.query_map([], scan_level)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

pub(crate) fn insert_goal(conn: &Connection, goal: &NewGoal, now: DateTime<Utc>) -> Result<Goal> {
    // Resolve the level first so a bad id surfaces as not-found rather than
    // a foreign key failure.
    get_level_on_conn(conn, goal.level_id)?;
    let now_str = format_datetime(&now);
    conn.execute(
        "INSERT INTO goals (level_id, goal_number, title, criteria, points, is_level_test,
             version, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)",
        params![
            goal.level_id,
            goal.goal_number,
            goal.title,
            goal.criteria,
            goal.points,
            goal.is_level_test,
            now_str
        ],
    )
    .map_err(unique_or(format!(
        "goal #{} already exists in level {}",
        goal.goal_number, goal.level_id
    )))?;
    get_goal_on_conn(conn, conn.last_insert_rowid())
}

pub(crate) fn get_goal_on_conn(conn: &Connection, goal_id: i64) -> Result<Goal> {
    conn.query_row(
        &format!("SELECT {GOAL_COLUMNS} FROM goals WHERE id = ?1"),
        params![goal_id],
        scan_goal,
    )
    .map_err(not_found_or("goal", goal_id))
}

pub(crate) fn update_goal_on_conn(conn: &Connection, goal: &Goal, now: DateTime<Utc>) -> Result<Goal> {
    let n = conn.execute(
        "UPDATE goals
         SET title = ?2, criteria = ?3, points = ?4, is_level_test = ?5,
             version = version + 1, updated_at = ?6
         WHERE id = ?1",
        params![
            goal.id,
            goal.title,
            goal.criteria,
            goal.points,
            goal.is_level_test,
            format_datetime(&now)
        ],
    )?;
    if n == 0 {
        return Err(StorageError::not_found("goal", goal.id));
    }
    get_goal_on_conn(conn, goal.id)
}

pub(crate) fn list_goals_for_level_on_conn(conn: &Connection, level_id: i64) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GOAL_COLUMNS} FROM goals WHERE level_id = ?1 ORDER BY goal_number"
    ))?;
    let rows = stmt.query_map(params![level_id], scan_goal)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------------------
// Weekly goals
// ---------------------------------------------------------------------------

pub(crate) fn insert_weekly_goal(
    conn: &Connection,
    goal: &NewWeeklyGoal,
    now: DateTime<Utc>,
) -> Result<WeeklyGoal> {
    conn.execute(
        "INSERT INTO weekly_goals (title, criteria, points, start_at, end_at, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        params![
            goal.title,
            goal.criteria,
            goal.points,
            format_datetime(&goal.start_at),
            format_datetime(&goal.end_at),
            format_datetime(&now)
        ],
    )?;
    get_weekly_goal_on_conn(conn, conn.last_insert_rowid())
}

pub(crate) fn get_weekly_goal_on_conn(conn: &Connection, id: i64) -> Result<WeeklyGoal> {
    conn.query_row(
        &format!("SELECT {WEEKLY_COLUMNS} FROM weekly_goals WHERE id = ?1"),
        params![id],
        scan_weekly,
    )
    .map_err(not_found_or("weekly goal", id))
}

pub(crate) fn set_weekly_goal_active_on_conn(conn: &Connection, id: i64, active: bool) -> Result<()> {
    let n = conn.execute(
        "UPDATE weekly_goals SET is_active = ?2 WHERE id = ?1",
        params![id, active],
    )?;
    if n == 0 {
        return Err(StorageError::not_found("weekly goal", id));
    }
    Ok(())
}

pub(crate) fn list_weekly_goals_on_conn(conn: &Connection) -> Result<Vec<WeeklyGoal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {WEEKLY_COLUMNS} FROM weekly_goals ORDER BY start_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], scan_weekly)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------------------
// Catalog version
// ---------------------------------------------------------------------------

pub(crate) fn bump_catalog_version_on_conn(conn: &Connection) -> Result<i64> {
    let value: String = conn
        .query_row(
            "INSERT INTO metadata (key, value) VALUES (?1, '1')
             ON CONFLICT(key) DO UPDATE SET value = CAST(CAST(value AS INTEGER) + 1 AS TEXT)
             RETURNING value",
            params![CATALOG_VERSION_KEY],
            |row| row.get(0),
        )?;
    value.parse().map_err(|e| {
        StorageError::Internal(format!("catalog version {value:?} is not a number: {e}"))
    })
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// Returns all levels ordered by level number.
    pub fn list_levels_impl(&self) -> Result<Vec<Level>> {
        let conn = self.lock_conn()?;
        list_levels_on_conn(&conn)
    }

    /// Returns a level's goals ordered by goal number.
    pub fn list_goals_for_level_impl(&self, level_id: i64) -> Result<Vec<Goal>> {
        let conn = self.lock_conn()?;
        list_goals_for_level_on_conn(&conn, level_id)
    }

    /// Retrieves a goal by id.
    pub fn get_goal_impl(&self, goal_id: i64) -> Result<Goal> {
        let conn = self.lock_conn()?;
        get_goal_on_conn(&conn, goal_id)
    }

    /// Returns all weekly goals, newest window first.
    pub fn list_weekly_goals_impl(&self) -> Result<Vec<WeeklyGoal>> {
        let conn = self.lock_conn()?;
        list_weekly_goals_on_conn(&conn)
    }
}
