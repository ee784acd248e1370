//! Metadata key-value store operations for [`SqliteStore`].

use rusqlite::{Connection, params};

use crate::error::{Result, not_found_or};
use crate::sqlite::store::SqliteStore;

pub(crate) fn set_metadata_on_conn(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        params![key, value],
    )?;
    Ok(())
}

pub(crate) fn get_metadata_on_conn(conn: &Connection, key: &str) -> Result<String> {
    conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        params![key],
        |row| row.get::<_, String>(0),
    )
    .map_err(not_found_or("metadata", key))
}

impl SqliteStore {
    /// Gets a metadata value by key.
    pub fn get_metadata_impl(&self, key: &str) -> Result<String> {
        let conn = self.lock_conn()?;
        get_metadata_on_conn(&conn, key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_and_missing() {
        let store = SqliteStore::open_in_memory().unwrap();
        {
            let conn = store.lock_conn().unwrap();
            set_metadata_on_conn(&conn, "seeded_ladder", "v1").unwrap();
            set_metadata_on_conn(&conn, "seeded_ladder", "v2").unwrap();
        }
        assert_eq!(store.get_metadata_impl("seeded_ladder").unwrap(), "v2");
        assert!(store.get_metadata_impl("nope").unwrap_err().is_not_found());
    }
}
