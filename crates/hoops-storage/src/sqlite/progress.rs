//! Per-user progress rows (goals, levels, weekly goals) for [`SqliteStore`].
//!
//! Every status transition into `completed` (and the level unlock) is a
//! guarded single-statement update. The returned row count tells the caller
//! whether it won the transition; awards must be gated on that.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use hoops_core::enums::ProgressStatus;
use hoops_core::progress::{UserGoal, UserLevel, UserWeeklyGoal};

use crate::error::{Result, unique_or};
use crate::sqlite::columns::{format_datetime, get_enum, get_opt_datetime};
use crate::sqlite::store::SqliteStore;

const USER_GOAL_COLUMNS: &str =
    "user_id, goal_id, status, progress, points_earned, started_at, completed_at";
const USER_LEVEL_COLUMNS: &str = "user_id, level_id, status, progress, completed_at";
const USER_WEEKLY_COLUMNS: &str =
    "user_id, weekly_goal_id, status, progress, points_earned, completed_at";

fn scan_user_goal(row: &Row<'_>) -> rusqlite::Result<UserGoal> {
    Ok(UserGoal {
        user_id: row.get("user_id")?,
        goal_id: row.get("goal_id")?,
        status: get_enum(row, "status")?,
        progress: row.get("progress")?,
        points_earned: row.get("points_earned")?,
        started_at: get_opt_datetime(row, "started_at")?,
        completed_at: get_opt_datetime(row, "completed_at")?,
    })
}

fn scan_user_level(row: &Row<'_>) -> rusqlite::Result<UserLevel> {
    Ok(UserLevel {
        user_id: row.get("user_id")?,
        level_id: row.get("level_id")?,
        status: get_enum(row, "status")?,
        progress: row.get("progress")?,
        completed_at: get_opt_datetime(row, "completed_at")?,
    })
}

fn scan_user_weekly(row: &Row<'_>) -> rusqlite::Result<UserWeeklyGoal> {
    Ok(UserWeeklyGoal {
        user_id: row.get("user_id")?,
        weekly_goal_id: row.get("weekly_goal_id")?,
        status: get_enum(row, "status")?,
        progress: row.get("progress")?,
        points_earned: row.get("points_earned")?,
        completed_at: get_opt_datetime(row, "completed_at")?,
    })
}

// ---------------------------------------------------------------------------
// User goals
// ---------------------------------------------------------------------------

pub(crate) fn get_user_goal_on_conn(
    conn: &Connection,
    user_id: &str,
    goal_id: i64,
) -> Result<Option<UserGoal>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {USER_GOAL_COLUMNS} FROM user_goals WHERE user_id = ?1 AND goal_id = ?2"
            ),
            params![user_id, goal_id],
            scan_user_goal,
        )
        .optional()?)
}

pub(crate) fn insert_user_goal(conn: &Connection, row: &UserGoal, now: DateTime<Utc>) -> Result<()> {
    conn.execute(
        "INSERT INTO user_goals (user_id, goal_id, status, progress, points_earned,
             started_at, completed_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            row.user_id,
            row.goal_id,
            row.status.as_str(),
            row.progress,
            row.points_earned,
            row.started_at.as_ref().map(format_datetime),
            row.completed_at.as_ref().map(format_datetime),
            format_datetime(&now),
        ],
    )
    .map_err(unique_or(format!(
        "progress for goal {} already exists for {}",
        row.goal_id, row.user_id
    )))?;
    Ok(())
}

pub(crate) fn update_user_goal_progress_on_conn(
    conn: &Connection,
    user_id: &str,
    goal_id: i64,
    progress: i32,
    status: ProgressStatus,
    started_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<bool> {
    let n = conn.execute(
        "UPDATE user_goals
         SET progress = ?3, status = ?4, started_at = COALESCE(started_at, ?5), updated_at = ?6
         WHERE user_id = ?1 AND goal_id = ?2 AND status != 'completed'",
        params![
            user_id,
            goal_id,
            progress,
            status.as_str(),
            started_at.as_ref().map(format_datetime),
            format_datetime(&now)
        ],
    )?;
    Ok(n == 1)
}

pub(crate) fn complete_user_goal_on_conn(
    conn: &Connection,
    user_id: &str,
    goal_id: i64,
    points: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let n = conn.execute(
        "UPDATE user_goals
         SET status = 'completed', progress = 100, points_earned = ?3,
             started_at = COALESCE(started_at, ?4), completed_at = ?4, updated_at = ?4
         WHERE user_id = ?1 AND goal_id = ?2 AND status != 'completed'",
        params![user_id, goal_id, points, format_datetime(&now)],
    )?;
    Ok(n == 1)
}

pub(crate) fn list_user_goals_for_level_on_conn(
    conn: &Connection,
    user_id: &str,
    level_id: i64,
) -> Result<Vec<UserGoal>> {
    let mut stmt = conn.prepare(
        "SELECT ug.user_id, ug.goal_id, ug.status, ug.progress, ug.points_earned,
                ug.started_at, ug.completed_at
         FROM user_goals ug
         JOIN goals g ON g.id = ug.goal_id
         WHERE ug.user_id = ?1 AND g.level_id = ?2
         ORDER BY g.goal_number",
    )?;
    let rows = stmt.query_map(params![user_id, level_id], scan_user_goal)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------------------
// User levels
// ---------------------------------------------------------------------------

pub(crate) fn get_user_level_on_conn(
    conn: &Connection,
    user_id: &str,
    level_id: i64,
) -> Result<Option<UserLevel>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {USER_LEVEL_COLUMNS} FROM user_levels WHERE user_id = ?1 AND level_id = ?2"
            ),
            params![user_id, level_id],
            scan_user_level,
        )
        .optional()?)
}

pub(crate) fn record_level_progress_on_conn(
    conn: &Connection,
    user_id: &str,
    level_id: i64,
    progress: i32,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO user_levels (user_id, level_id, status, progress, updated_at)
         VALUES (?1, ?2, CASE WHEN ?3 > 0 THEN 'in_progress' ELSE 'locked' END, ?3, ?4)
         ON CONFLICT(user_id, level_id) DO UPDATE SET
             progress = excluded.progress,
             status = CASE
                 WHEN excluded.progress > 0 THEN 'in_progress'
                 ELSE user_levels.status
             END,
             updated_at = excluded.updated_at
         WHERE user_levels.status != 'completed'",
        params![user_id, level_id, progress, format_datetime(&now)],
    )?;
    Ok(())
}

pub(crate) fn complete_user_level_on_conn(
    conn: &Connection,
    user_id: &str,
    level_id: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let n = conn.execute(
        "INSERT INTO user_levels (user_id, level_id, status, progress, completed_at, updated_at)
         VALUES (?1, ?2, 'completed', 100, ?3, ?3)
         ON CONFLICT(user_id, level_id) DO UPDATE SET
             status = 'completed',
             progress = 100,
             completed_at = excluded.completed_at,
             updated_at = excluded.updated_at
         WHERE user_levels.status != 'completed'",
        params![user_id, level_id, format_datetime(&now)],
    )?;
    Ok(n == 1)
}

pub(crate) fn unlock_user_level_on_conn(
    conn: &Connection,
    user_id: &str,
    level_id: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let n = conn.execute(
        "INSERT INTO user_levels (user_id, level_id, status, progress, updated_at)
         VALUES (?1, ?2, 'unlocked', 0, ?3)
         ON CONFLICT(user_id, level_id) DO UPDATE SET
             status = 'unlocked',
             updated_at = excluded.updated_at
         WHERE user_levels.status = 'locked'",
        params![user_id, level_id, format_datetime(&now)],
    )?;
    Ok(n == 1)
}

pub(crate) fn count_completed_user_levels_on_conn(conn: &Connection, level_id: i64) -> Result<i64> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM user_levels WHERE level_id = ?1 AND status = 'completed'",
        params![level_id],
        |row| row.get(0),
    )?)
}

pub(crate) fn list_user_levels_on_conn(conn: &Connection, user_id: &str) -> Result<Vec<UserLevel>> {
    let mut stmt = conn.prepare(
        "SELECT ul.user_id, ul.level_id, ul.status, ul.progress, ul.completed_at
         FROM user_levels ul
         JOIN levels l ON l.id = ul.level_id
         WHERE ul.user_id = ?1
         ORDER BY l.level_number",
    )?;
    let rows = stmt.query_map(params![user_id], scan_user_level)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------------------
// User weekly goals
// ---------------------------------------------------------------------------

pub(crate) fn get_user_weekly_goal_on_conn(
    conn: &Connection,
    user_id: &str,
    weekly_goal_id: i64,
) -> Result<Option<UserWeeklyGoal>> {
    Ok(conn
        .query_row(
            &format!(
                "SELECT {USER_WEEKLY_COLUMNS} FROM user_weekly_goals
                 WHERE user_id = ?1 AND weekly_goal_id = ?2"
            ),
            params![user_id, weekly_goal_id],
            scan_user_weekly,
        )
        .optional()?)
}

pub(crate) fn insert_user_weekly_goal(
    conn: &Connection,
    row: &UserWeeklyGoal,
    now: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO user_weekly_goals (user_id, weekly_goal_id, status, progress,
             points_earned, completed_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            row.user_id,
            row.weekly_goal_id,
            row.status.as_str(),
            row.progress,
            row.points_earned,
            row.completed_at.as_ref().map(format_datetime),
            format_datetime(&now),
        ],
    )
    .map_err(unique_or(format!(
        "progress for weekly goal {} already exists for {}",
        row.weekly_goal_id, row.user_id
    )))?;
    Ok(())
}

pub(crate) fn update_user_weekly_progress_on_conn(
    conn: &Connection,
    user_id: &str,
    weekly_goal_id: i64,
    progress: i32,
    now: DateTime<Utc>,
) -> Result<bool> {
    let n = conn.execute(
        "UPDATE user_weekly_goals SET progress = ?3, updated_at = ?4
         WHERE user_id = ?1 AND weekly_goal_id = ?2 AND status = 'active'",
        params![user_id, weekly_goal_id, progress, format_datetime(&now)],
    )?;
    Ok(n == 1)
}

pub(crate) fn complete_user_weekly_goal_on_conn(
    conn: &Connection,
    user_id: &str,
    weekly_goal_id: i64,
    points: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let n = conn.execute(
        "UPDATE user_weekly_goals
         SET status = 'completed', progress = 100, points_earned = ?3,
             completed_at = ?4, updated_at = ?4
         WHERE user_id = ?1 AND weekly_goal_id = ?2 AND status != 'completed'",
        params![user_id, weekly_goal_id, points, format_datetime(&now)],
    )?;
    Ok(n == 1)
}

pub(crate) fn list_user_weekly_goals_on_conn(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<UserWeeklyGoal>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {USER_WEEKLY_COLUMNS} FROM user_weekly_goals
         WHERE user_id = ?1 ORDER BY weekly_goal_id"
    ))?;
    let rows = stmt.query_map(params![user_id], scan_user_weekly)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// Returns the user's level rows ordered by level number.
    pub fn list_user_levels_impl(&self, user_id: &str) -> Result<Vec<UserLevel>> {
        let conn = self.lock_conn()?;
        list_user_levels_on_conn(&conn, user_id)
    }

    /// Returns the user's goal rows for one level.
    pub fn list_user_goals_for_level_impl(
        &self,
        user_id: &str,
        level_id: i64,
    ) -> Result<Vec<UserGoal>> {
        let conn = self.lock_conn()?;
        list_user_goals_for_level_on_conn(&conn, user_id, level_id)
    }

    /// Returns the user's weekly goal rows.
    pub fn list_user_weekly_goals_impl(&self, user_id: &str) -> Result<Vec<UserWeeklyGoal>> {
        let conn = self.lock_conn()?;
        list_user_weekly_goals_on_conn(&conn, user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::catalog::{insert_goal, insert_level, insert_weekly_goal};
    use crate::sqlite::profiles::insert_profile;
    use chrono::{Duration, TimeZone};
    use hoops_core::catalog::{NewGoal, NewLevel, NewWeeklyGoal};
    use hoops_core::enums::WeeklyStatus;
    use hoops_core::profile::PlayerProfile;
    use pretty_assertions::assert_eq;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 17, 0, 0).unwrap()
    }

    /// Store with one user, one level, and goal #1 in it.
    fn seeded() -> (SqliteStore, i64, i64) {
        let store = SqliteStore::open_in_memory().unwrap();
        let (level_id, goal_id) = {
            let conn = store.lock_conn().unwrap();
            insert_profile(&conn, &PlayerProfile::new("kid", "rookie", t0())).unwrap();
            let level = insert_level(
                &conn,
                &NewLevel {
                    level_number: 1,
                    tag: "rookie".into(),
                    name: "Rookie".into(),
                    points_required: 0,
                },
                t0(),
            )
            .unwrap();
            let goal = insert_goal(
                &conn,
                &NewGoal {
                    level_id: level.id,
                    goal_number: 1,
                    title: String::new(),
                    criteria: "Dribble 30 seconds".into(),
                    points: 10,
                    is_level_test: false,
                },
                t0(),
            )
            .unwrap();
            (level.id, goal.id)
        };
        (store, level_id, goal_id)
    }

    #[test]
    fn goal_completion_is_compare_and_swap() {
        let (store, _, goal_id) = seeded();
        let conn = store.lock_conn().unwrap();
        insert_user_goal(&conn, &UserGoal::unlocked("kid", goal_id), t0()).unwrap();

        assert!(complete_user_goal_on_conn(&conn, "kid", goal_id, 10, t0()).unwrap());
        assert!(!complete_user_goal_on_conn(&conn, "kid", goal_id, 10, t0()).unwrap());

        let row = get_user_goal_on_conn(&conn, "kid", goal_id).unwrap().unwrap();
        assert_eq!(row.status, ProgressStatus::Completed);
        assert_eq!(row.progress, 100);
        assert_eq!(row.points_earned, 10);
        assert_eq!(row.completed_at, Some(t0()));
    }

    #[test]
    fn progress_update_skips_completed_rows() {
        let (store, _, goal_id) = seeded();
        let conn = store.lock_conn().unwrap();
        insert_user_goal(&conn, &UserGoal::unlocked("kid", goal_id), t0()).unwrap();
        assert!(
            update_user_goal_progress_on_conn(
                &conn,
                "kid",
                goal_id,
                40,
                ProgressStatus::InProgress,
                Some(t0()),
                t0()
            )
            .unwrap()
        );
        complete_user_goal_on_conn(&conn, "kid", goal_id, 10, t0()).unwrap();
        assert!(
            !update_user_goal_progress_on_conn(
                &conn,
                "kid",
                goal_id,
                10,
                ProgressStatus::InProgress,
                None,
                t0()
            )
            .unwrap()
        );
        let row = get_user_goal_on_conn(&conn, "kid", goal_id).unwrap().unwrap();
        assert_eq!(row.progress, 100);
        assert_eq!(row.started_at, Some(t0()));
    }

    #[test]
    fn schema_ties_points_to_completion() {
        let (store, _, goal_id) = seeded();
        let conn = store.lock_conn().unwrap();
        let mut row = UserGoal::unlocked("kid", goal_id);
        row.points_earned = 10;
        assert!(insert_user_goal(&conn, &row, t0()).is_err());
    }

    #[test]
    fn level_unlock_only_from_absent_or_locked() {
        let (store, level_id, _) = seeded();
        let conn = store.lock_conn().unwrap();
        assert!(unlock_user_level_on_conn(&conn, "kid", level_id, t0()).unwrap());
        assert!(!unlock_user_level_on_conn(&conn, "kid", level_id, t0()).unwrap());
        let row = get_user_level_on_conn(&conn, "kid", level_id).unwrap().unwrap();
        assert_eq!(row.status, ProgressStatus::Unlocked);
    }

    #[test]
    fn level_progress_then_completion() {
        let (store, level_id, _) = seeded();
        let conn = store.lock_conn().unwrap();
        record_level_progress_on_conn(&conn, "kid", level_id, 30, t0()).unwrap();
        let row = get_user_level_on_conn(&conn, "kid", level_id).unwrap().unwrap();
        assert_eq!(row.status, ProgressStatus::InProgress);
        assert_eq!(row.progress, 30);

        assert!(complete_user_level_on_conn(&conn, "kid", level_id, t0()).unwrap());
        assert!(!complete_user_level_on_conn(&conn, "kid", level_id, t0()).unwrap());

        // Completed rows are frozen.
        record_level_progress_on_conn(&conn, "kid", level_id, 50, t0()).unwrap();
        assert!(!unlock_user_level_on_conn(&conn, "kid", level_id, t0()).unwrap());
        let row = get_user_level_on_conn(&conn, "kid", level_id).unwrap().unwrap();
        assert_eq!(row.status, ProgressStatus::Completed);
        assert_eq!(row.progress, 100);
    }

    #[test]
    fn completed_level_rows_counted_per_level() {
        let (store, level_id, _) = seeded();
        let conn = store.lock_conn().unwrap();
        assert_eq!(count_completed_user_levels_on_conn(&conn, level_id).unwrap(), 0);
        record_level_progress_on_conn(&conn, "kid", level_id, 50, t0()).unwrap();
        assert_eq!(count_completed_user_levels_on_conn(&conn, level_id).unwrap(), 0);
        complete_user_level_on_conn(&conn, "kid", level_id, t0()).unwrap();
        assert_eq!(count_completed_user_levels_on_conn(&conn, level_id).unwrap(), 1);
        assert_eq!(count_completed_user_levels_on_conn(&conn, level_id + 1).unwrap(), 0);
    }

    #[test]
    fn weekly_rows_complete_once() {
        let (store, _, _) = seeded();
        let conn = store.lock_conn().unwrap();
        let weekly = insert_weekly_goal(
            &conn,
            &NewWeeklyGoal {
                title: String::new(),
                criteria: "Shoot 200 shots".into(),
                points: 40,
                start_at: t0(),
                end_at: t0() + Duration::days(7),
            },
            t0(),
        )
        .unwrap();
        insert_user_weekly_goal(&conn, &UserWeeklyGoal::active("kid", weekly.id), t0()).unwrap();
        assert!(update_user_weekly_progress_on_conn(&conn, "kid", weekly.id, 60, t0()).unwrap());
        assert!(complete_user_weekly_goal_on_conn(&conn, "kid", weekly.id, 40, t0()).unwrap());
        assert!(!complete_user_weekly_goal_on_conn(&conn, "kid", weekly.id, 40, t0()).unwrap());
        assert!(!update_user_weekly_progress_on_conn(&conn, "kid", weekly.id, 10, t0()).unwrap());

        drop(conn);
        let rows = store.list_user_weekly_goals_impl("kid").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, WeeklyStatus::Completed);
        assert_eq!(rows[0].points_earned, 40);
    }

    #[test]
    fn user_goals_listed_per_level() {
        let (store, level_id, goal_id) = seeded();
        {
            let conn = store.lock_conn().unwrap();
            insert_user_goal(&conn, &UserGoal::unlocked("kid", goal_id), t0()).unwrap();
        }
        let rows = store.list_user_goals_for_level_impl("kid", level_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(store.list_user_goals_for_level_impl("kid", level_id + 1).unwrap().is_empty());
    }
}
