//! Player profile operations for [`SqliteStore`].

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use hoops_core::profile::PlayerProfile;

use crate::error::{Result, StorageError, not_found_or, unique_or};
use crate::sqlite::columns::{format_date, format_datetime, get_datetime, get_opt_date};
use crate::sqlite::store::SqliteStore;

const PROFILE_COLUMNS: &str = "user_id, display_name, total_points, current_streak, \
     longest_streak, last_active_date, current_level_tag, created_at, updated_at";

fn scan_profile(row: &Row<'_>) -> rusqlite::Result<PlayerProfile> {
    Ok(PlayerProfile {
        user_id: row.get("user_id")?,
        display_name: row.get("display_name")?,
        total_points: row.get("total_points")?,
        current_streak: row.get("current_streak")?,
        longest_streak: row.get("longest_streak")?,
        last_active_date: get_opt_date(row, "last_active_date")?,
        current_level_tag: row.get("current_level_tag")?,
        created_at: get_datetime(row, "created_at")?,
        updated_at: get_datetime(row, "updated_at")?,
    })
}

// ---------------------------------------------------------------------------
// Connection-level helpers (shared with Transaction)
// ---------------------------------------------------------------------------

pub(crate) fn insert_profile(conn: &Connection, p: &PlayerProfile) -> Result<()> {
    conn.execute(
        "INSERT INTO profiles (user_id, display_name, total_points, current_streak,
             longest_streak, last_active_date, current_level_tag, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            p.user_id,
            p.display_name,
            p.total_points,
            p.current_streak,
            p.longest_streak,
            p.last_active_date.as_ref().map(format_date),
            p.current_level_tag,
            format_datetime(&p.created_at),
            format_datetime(&p.updated_at),
        ],
    )
    .map_err(unique_or(format!("profile {} already exists", p.user_id)))?;
    Ok(())
}

pub(crate) fn get_profile_on_conn(conn: &Connection, user_id: &str) -> Result<PlayerProfile> {
    conn.query_row(
        &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = ?1"),
        params![user_id],
        scan_profile,
    )
    .map_err(not_found_or("profile", user_id))
}

pub(crate) fn list_profiles_on_conn(conn: &Connection) -> Result<Vec<PlayerProfile>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY user_id"
    ))?;
    let rows = stmt.query_map([], scan_profile)?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

pub(crate) fn add_points_on_conn(
    conn: &Connection,
    user_id: &str,
    points: i64,
    now: DateTime<Utc>,
) -> Result<i64> {
    let total: Option<i64> = conn
        .query_row(
            "UPDATE profiles SET total_points = total_points + ?2, updated_at = ?3
             WHERE user_id = ?1
             RETURNING total_points",
            params![user_id, points, format_datetime(&now)],
            |row| row.get(0),
        )
        .optional()?;
    total.ok_or_else(|| StorageError::not_found("profile", user_id))
}

pub(crate) fn update_streak_on_conn(
    conn: &Connection,
    user_id: &str,
    current: i32,
    longest: i32,
    last_active: NaiveDate,
    now: DateTime<Utc>,
) -> Result<()> {
    let n = conn.execute(
        "UPDATE profiles
         SET current_streak = ?2, longest_streak = ?3, last_active_date = ?4, updated_at = ?5
         WHERE user_id = ?1",
        params![
            user_id,
            current,
            longest,
            format_date(&last_active),
            format_datetime(&now)
        ],
    )?;
    if n == 0 {
        return Err(StorageError::not_found("profile", user_id));
    }
    Ok(())
}

pub(crate) fn set_current_level_tag_on_conn(
    conn: &Connection,
    user_id: &str,
    tag: &str,
    now: DateTime<Utc>,
) -> Result<()> {
    let n = conn.execute(
        "UPDATE profiles SET current_level_tag = ?2, updated_at = ?3 WHERE user_id = ?1",
        params![user_id, tag, format_datetime(&now)],
    )?;
    if n == 0 {
        return Err(StorageError::not_found("profile", user_id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// SqliteStore methods
// ---------------------------------------------------------------------------

impl SqliteStore {
    /// Retrieves a profile by user id.
    pub fn get_profile_impl(&self, user_id: &str) -> Result<PlayerProfile> {
        let conn = self.lock_conn()?;
        get_profile_on_conn(&conn, user_id)
    }

    /// Returns every profile, ordered by user id.
    pub fn list_profiles_impl(&self) -> Result<Vec<PlayerProfile>> {
        let conn = self.lock_conn()?;
        list_profiles_on_conn(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 17, 0, 0).unwrap()
    }

    #[test]
    fn create_and_get_profile() {
        let store = test_store();
        let profile = PlayerProfile::new("kid-1", "rookie", t0()).with_display_name("Sam");
        {
            let conn = store.lock_conn().unwrap();
            insert_profile(&conn, &profile).unwrap();
        }
        let got = store.get_profile_impl("kid-1").unwrap();
        assert_eq!(got, profile);
    }

    #[test]
    fn duplicate_profile_is_validation_error() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        let profile = PlayerProfile::new("kid-1", "rookie", t0());
        insert_profile(&conn, &profile).unwrap();
        let err = insert_profile(&conn, &profile).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn missing_profile_is_not_found() {
        let store = test_store();
        assert!(store.get_profile_impl("ghost").unwrap_err().is_not_found());
        let conn = store.lock_conn().unwrap();
        assert!(add_points_on_conn(&conn, "ghost", 5, t0()).unwrap_err().is_not_found());
    }

    #[test]
    fn add_points_returns_new_total() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        insert_profile(&conn, &PlayerProfile::new("kid-1", "rookie", t0())).unwrap();
        assert_eq!(add_points_on_conn(&conn, "kid-1", 15, t0()).unwrap(), 15);
        assert_eq!(add_points_on_conn(&conn, "kid-1", 20, t0()).unwrap(), 35);
    }

    #[test]
    fn streak_fields_persist() {
        let store = test_store();
        {
            let conn = store.lock_conn().unwrap();
            insert_profile(&conn, &PlayerProfile::new("kid-1", "rookie", t0())).unwrap();
            let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
            update_streak_on_conn(&conn, "kid-1", 3, 7, day, t0()).unwrap();
            set_current_level_tag_on_conn(&conn, "kid-1", "starter", t0()).unwrap();
        }
        let got = store.get_profile_impl("kid-1").unwrap();
        assert_eq!(got.current_streak, 3);
        assert_eq!(got.longest_streak, 7);
        assert_eq!(got.last_active_date, NaiveDate::from_ymd_opt(2024, 5, 6));
        assert_eq!(got.current_level_tag, "starter");
    }

    #[test]
    fn longest_streak_cannot_trail_current() {
        let store = test_store();
        let conn = store.lock_conn().unwrap();
        insert_profile(&conn, &PlayerProfile::new("kid-1", "rookie", t0())).unwrap();
        let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
        assert!(update_streak_on_conn(&conn, "kid-1", 4, 2, day, t0()).is_err());
    }
}
