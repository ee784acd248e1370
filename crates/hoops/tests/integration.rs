//! End-to-end CLI tests for the `hoops` binary.
//!
//! Each test initializes its own temporary directory and drives the binary
//! with `--now` to simulate practice on different days.

use assert_cmd::Command;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn hoops(tmp: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hoops").unwrap();
    cmd.current_dir(tmp.path());
    for var in [
        "HOOPS_USER",
        "HOOPS_ROLE",
        "HOOPS_NOW",
        "HOOPS_DIR",
        "HOOPS_LOG",
        "HOOPS_DATABASE",
        "HOOPS_TIMEZONE_OFFSET_MINUTES",
    ] {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Runs a command that must succeed and returns its JSON output.
fn json(tmp: &TempDir, args: &[&str]) -> Value {
    let output = hoops(tmp).arg("--json").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "{args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

/// Runs a command that must fail and returns its JSON error body.
fn json_err(tmp: &TempDir, args: &[&str]) -> Value {
    let output = hoops(tmp).arg("--json").args(args).output().unwrap();
    assert_eq!(output.status.code(), Some(1), "{args:?} should fail");
    serde_json::from_slice(&output.stderr).unwrap()
}

/// Initializes a project with the default ladder and a profile for `kid`.
fn setup() -> TempDir {
    let tmp = TempDir::new().unwrap();
    hoops(&tmp)
        .args(["init", "--now", "2024-03-01T08:00:00Z"])
        .assert()
        .success();
    json(
        &tmp,
        &["--user", "kid", "profile", "create", "--name", "Sam"],
    );
    tmp
}

/// Goal ids of level `level_index` (0-based), in goal-number order.
fn goal_ids(tmp: &TempDir, level_index: usize) -> Vec<i64> {
    let catalog = json(tmp, &["catalog", "list"]);
    catalog[level_index]["goals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_i64().unwrap())
        .collect()
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[test]
fn init_creates_database_and_refuses_reinit() {
    let tmp = TempDir::new().unwrap();
    hoops(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Loaded default ladder: 3 levels, 30 goals"));
    assert!(tmp.path().join(".hoops").join("hoops.db").exists());
    assert!(tmp.path().join(".hoops").join("config.yaml").exists());

    hoops(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));

    hoops(&tmp).args(["init", "--force", "--no-seed"]).assert().success();
    let catalog = json(&tmp, &["catalog", "list"]);
    assert_eq!(catalog.as_array().unwrap().len(), 0);
}

#[test]
fn commands_without_init_fail() {
    let tmp = TempDir::new().unwrap();
    hoops(&tmp)
        .args(["--user", "kid", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hoops init"));
}

#[test]
fn profile_starts_on_first_level() {
    let tmp = setup();
    let profile = json(&tmp, &["--user", "kid", "profile", "show"]);
    assert_eq!(profile["current_level_tag"], "rookie");
    assert_eq!(profile["display_name"], "Sam");
    assert_eq!(profile["total_points"], 0);

    let err = json_err(&tmp, &["--user", "kid", "profile", "create"]);
    assert_eq!(err["kind"], "validation_error");

    let err = json_err(&tmp, &["--user", "ghost", "profile", "show"]);
    assert_eq!(err["kind"], "not_found");
}

#[test]
fn missing_user_is_an_error() {
    let tmp = setup();
    hoops(&tmp)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no user specified"));
}

// ---------------------------------------------------------------------------
// Goals and the level cascade
// ---------------------------------------------------------------------------

#[test]
fn goal_completion_is_idempotent_and_clamped() {
    let tmp = setup();
    let ids = goal_ids(&tmp, 0);
    let g1 = ids[0].to_string();
    let g2 = ids[1].to_string();

    let view = json(&tmp, &["--user", "kid", "goal", "progress", &g1, "150"]);
    assert_eq!(view["progress"], 100);
    assert_eq!(view["status"], "completed");
    assert_eq!(view["points_awarded"], 10);

    for _ in 0..2 {
        let again = json(&tmp, &["--user", "kid", "goal", "progress", &g1, "100"]);
        assert_eq!(again["points_awarded"], 0);
        assert_eq!(again["total_points"], 10);
    }

    let low = json(&tmp, &["--user", "kid", "goal", "progress", &g2, "-10"]);
    assert_eq!(low["progress"], 0);
    assert_eq!(low["status"], "unlocked");

    let stats = json(&tmp, &["--user", "kid", "stats"]);
    assert_eq!(stats["total_points"], 10);
}

#[test]
fn finishing_a_level_unlocks_the_next() {
    let tmp = setup();
    let ids = goal_ids(&tmp, 0);
    for id in &ids {
        json(&tmp, &["--user", "kid", "goal", "progress", &id.to_string(), "100"]);
    }

    let levels = json(&tmp, &["--user", "kid", "levels"]);
    assert_eq!(levels["current_level"]["tag"], "starter");
    assert_eq!(levels["all_levels"][0]["status"], "completed");
    assert_eq!(levels["all_levels"][1]["status"], "unlocked");
    assert_eq!(levels["all_levels"][2]["status"], "locked");

    let profile = json(&tmp, &["--user", "kid", "profile", "show"]);
    assert_eq!(profile["current_level_tag"], "starter");
    assert_eq!(profile["total_points"], 155);
}

#[test]
fn unknown_goal_reports_not_found() {
    let tmp = setup();
    let err = json_err(&tmp, &["--user", "kid", "goal", "progress", "9999", "50"]);
    assert_eq!(err["kind"], "not_found");
}

// ---------------------------------------------------------------------------
// Drills and streaks
// ---------------------------------------------------------------------------

fn drill(tmp: &TempDir, now: &str, extra: &[&str]) -> Value {
    let mut args = vec!["--user", "kid", "--now", now, "drill", "form-shooting", "--duration", "300"];
    args.extend_from_slice(extra);
    json(tmp, &args)
}

#[test]
fn streak_builds_and_resets() {
    let tmp = setup();
    let d1 = drill(&tmp, "2024-03-01T17:00:00Z", &[]);
    assert_eq!(d1["new_streak"], 1);
    assert_eq!(d1["points_awarded"], 10);

    let d2 = drill(&tmp, "2024-03-02T17:00:00Z", &["--rating", "5"]);
    assert_eq!(d2["new_streak"], 2);
    assert_eq!(d2["points_awarded"], 35);

    let same_day = drill(&tmp, "2024-03-02T19:00:00Z", &[]);
    assert_eq!(same_day["new_streak"], 2);
    assert_eq!(same_day["points_awarded"], 10);

    let d4 = drill(&tmp, "2024-03-04T17:00:00Z", &[]);
    assert_eq!(d4["new_streak"], 1);
    assert_eq!(d4["longest_streak"], 2);

    let stats = json(&tmp, &["--user", "kid", "--now", "2024-03-04T18:00:00Z", "stats"]);
    assert_eq!(stats["total_points"], 65);
    assert_eq!(stats["points_this_week"], 65);
    assert_eq!(stats["drills_this_week"], 4);
}

#[test]
fn bad_rating_is_validation_error() {
    let tmp = setup();
    let err = json_err(
        &tmp,
        &["--user", "kid", "drill", "layups", "--duration", "60", "--rating", "6"],
    );
    assert_eq!(err["kind"], "validation_error");
}

// ---------------------------------------------------------------------------
// Weekly goals and roles
// ---------------------------------------------------------------------------

#[test]
fn weekly_goals_need_admin_and_expire() {
    let tmp = setup();
    let add = [
        "weekly",
        "add",
        "Make 100 free throws",
        "--points",
        "40",
        "--start",
        "2024-03-04T00:00:00Z",
    ];

    let err = json_err(&tmp, &add);
    assert_eq!(err["kind"], "forbidden");

    let mut admin = vec!["--role", "admin"];
    admin.extend_from_slice(&add);
    let goal = json(&tmp, &admin);
    let id = goal["id"].as_i64().unwrap().to_string();

    let late = json_err(
        &tmp,
        &["--user", "kid", "--now", "2024-03-12T00:00:00Z", "weekly", "progress", &id, "100"],
    );
    assert_eq!(late["kind"], "expired");
    let stats = json(&tmp, &["--user", "kid", "stats"]);
    assert_eq!(stats["total_points"], 0);

    let done = json(
        &tmp,
        &["--user", "kid", "--now", "2024-03-06T12:00:00Z", "weekly", "progress", &id, "100"],
    );
    assert_eq!(done["status"], "completed");
    assert_eq!(done["points_awarded"], 40);

    let list = json(
        &tmp,
        &["--user", "kid", "--now", "2024-03-12T00:00:00Z", "weekly", "list"],
    );
    assert_eq!(list[0]["status"], "completed");
}

#[test]
fn catalog_edits_keep_level_test_on_goal_ten() {
    let tmp = setup();
    let ids = goal_ids(&tmp, 0);
    let g10 = ids[9].to_string();

    let err = json_err(
        &tmp,
        &["--role", "admin", "catalog", "goal-edit", &g10, "--level-test", "false"],
    );
    assert_eq!(err["kind"], "validation_error");

    let edited = json(
        &tmp,
        &["--role", "admin", "catalog", "goal-edit", &g10, "--points", "60"],
    );
    assert_eq!(edited["points"], 60);
    assert_eq!(edited["version"], 2);

    let err = json_err(&tmp, &["catalog", "goal-edit", &g10, "--points", "70"]);
    assert_eq!(err["kind"], "forbidden");
}

// ---------------------------------------------------------------------------
// Misc
// ---------------------------------------------------------------------------

#[test]
fn version_and_completion() {
    let tmp = TempDir::new().unwrap();
    hoops(&tmp)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("hoops version"));
    hoops(&tmp)
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hoops"));
}
