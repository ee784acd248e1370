//! DDL for the SQLite schema.
//!
//! Timestamps are stored as TEXT in ISO 8601 format, calendar dates as
//! `YYYY-MM-DD`. Booleans are stored as INTEGER (0/1).

/// Schema version recorded in `PRAGMA user_version`.
pub const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Core DDL statements executed during `init_schema`.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    // -- Profiles ------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        user_id           TEXT PRIMARY KEY,
        display_name      TEXT NOT NULL DEFAULT '',
        total_points      INTEGER NOT NULL DEFAULT 0 CHECK (total_points >= 0),
        current_streak    INTEGER NOT NULL DEFAULT 0 CHECK (current_streak >= 0),
        longest_streak    INTEGER NOT NULL DEFAULT 0 CHECK (longest_streak >= current_streak),
        last_active_date  TEXT,
        current_level_tag TEXT NOT NULL DEFAULT '',
        created_at        TEXT NOT NULL,
        updated_at        TEXT NOT NULL
    )
    "#,
    // -- Catalog -------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS levels (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        level_number    INTEGER NOT NULL UNIQUE CHECK (level_number >= 1),
        tag             TEXT NOT NULL UNIQUE,
        name            TEXT NOT NULL,
        points_required INTEGER NOT NULL DEFAULT 0,
        created_at      TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS goals (
        id            INTEGER PRIMARY KEY AUTOINCREMENT,
        level_id      INTEGER NOT NULL,
        goal_number   INTEGER NOT NULL CHECK (goal_number BETWEEN 1 AND 10),
        title         TEXT NOT NULL DEFAULT '',
        criteria      TEXT NOT NULL,
        points        INTEGER NOT NULL CHECK (points > 0),
        is_level_test INTEGER NOT NULL DEFAULT 0,
        version       INTEGER NOT NULL DEFAULT 1,
        created_at    TEXT NOT NULL,
        updated_at    TEXT NOT NULL,
        UNIQUE (level_id, goal_number),
        CHECK ((goal_number = 10) = (is_level_test = 1)),
        FOREIGN KEY (level_id) REFERENCES levels(id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_goals_level ON goals(level_id)",
    r#"
    CREATE TABLE IF NOT EXISTS weekly_goals (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        title      TEXT NOT NULL DEFAULT '',
        criteria   TEXT NOT NULL,
        points     INTEGER NOT NULL CHECK (points > 0),
        start_at   TEXT NOT NULL,
        end_at     TEXT NOT NULL,
        is_active  INTEGER NOT NULL DEFAULT 1,
        created_at TEXT NOT NULL,
        CHECK (end_at > start_at)
    )
    "#,
    // -- Per-user progress ---------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS user_goals (
        user_id       TEXT NOT NULL,
        goal_id       INTEGER NOT NULL,
        status        TEXT NOT NULL DEFAULT 'unlocked',
        progress      INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
        points_earned INTEGER NOT NULL DEFAULT 0,
        started_at    TEXT,
        completed_at  TEXT,
        updated_at    TEXT NOT NULL,
        PRIMARY KEY (user_id, goal_id),
        CHECK ((points_earned > 0) = (status = 'completed')),
        FOREIGN KEY (user_id) REFERENCES profiles(user_id) ON DELETE CASCADE,
        FOREIGN KEY (goal_id) REFERENCES goals(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_levels (
        user_id      TEXT NOT NULL,
        level_id     INTEGER NOT NULL,
        status       TEXT NOT NULL DEFAULT 'locked',
        progress     INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
        completed_at TEXT,
        updated_at   TEXT NOT NULL,
        PRIMARY KEY (user_id, level_id),
        FOREIGN KEY (user_id) REFERENCES profiles(user_id) ON DELETE CASCADE,
        FOREIGN KEY (level_id) REFERENCES levels(id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS user_weekly_goals (
        user_id        TEXT NOT NULL,
        weekly_goal_id INTEGER NOT NULL,
        status         TEXT NOT NULL DEFAULT 'active',
        progress       INTEGER NOT NULL DEFAULT 0 CHECK (progress BETWEEN 0 AND 100),
        points_earned  INTEGER NOT NULL DEFAULT 0,
        completed_at   TEXT,
        updated_at     TEXT NOT NULL,
        PRIMARY KEY (user_id, weekly_goal_id),
        FOREIGN KEY (user_id) REFERENCES profiles(user_id) ON DELETE CASCADE,
        FOREIGN KEY (weekly_goal_id) REFERENCES weekly_goals(id) ON DELETE CASCADE
    )
    "#,
    // -- Drill completions ---------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS drill_completions (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id          TEXT NOT NULL,
        drill_id         TEXT NOT NULL,
        duration_seconds INTEGER NOT NULL CHECK (duration_seconds >= 0),
        rating           INTEGER CHECK (rating BETWEEN 1 AND 5),
        completed_at     TEXT NOT NULL,
        activity_date    TEXT NOT NULL,
        points_awarded   INTEGER NOT NULL DEFAULT 0,
        FOREIGN KEY (user_id) REFERENCES profiles(user_id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_drills_user_day ON drill_completions(user_id, activity_date)",
    "CREATE INDEX IF NOT EXISTS idx_drills_user_time ON drill_completions(user_id, completed_at)",
    // -- Point ledger --------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS point_awards (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id    TEXT NOT NULL,
        source     TEXT NOT NULL,
        source_id  INTEGER NOT NULL,
        points     INTEGER NOT NULL,
        awarded_at TEXT NOT NULL,
        FOREIGN KEY (user_id) REFERENCES profiles(user_id) ON DELETE CASCADE
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_awards_user_time ON point_awards(user_id, awarded_at)",
    // -- Metadata ------------------------------------------------------------
    r#"
    CREATE TABLE IF NOT EXISTS metadata (
        key   TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )
    "#,
];

/// Metadata keys inserted on first init.
pub const DEFAULT_METADATA: &[(&str, &str)] = &[("catalog_version", "0")];

/// Metadata key holding the store-wide catalog version.
pub const CATALOG_VERSION_KEY: &str = "catalog_version";
