use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn bin() -> Command {
    let mut c = Command::cargo_bin("habit").expect("binary built");
    c.env_remove("HABIT_DB_PATH")
        .env_remove("HABIT_NOW")
        .env_remove("HABIT_UTC_OFFSET")
        .env_remove("HABIT_WEEK_START")
        .env_remove("HABIT_LOG");
    c
}

#[test]
fn env_config_roundtrip_json() {
    let td = tempfile::tempdir().unwrap();
    let db = td.path().join("nested").join("db.json");

    bin()
        .env("HABIT_DB_PATH", &db)
        .env("HABIT_NOW", "2026-03-18T10:00:00Z")
        .env("HABIT_UTC_OFFSET", "+00:00")
        .args(["add", "Stretch", "--format", "json"])
        .assert()
        .success();
    assert!(db.exists());

    bin()
        .env("HABIT_DB_PATH", &db)
        .env("HABIT_NOW", "2026-03-18T10:00:00Z")
        .env("HABIT_UTC_OFFSET", "+00:00")
        .args(["log", "Stretch", "--minutes", "10"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged 10m: Stretch (l000001) on 2026-03-18"));

    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["list", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stretch"));
}

#[test]
fn week_start_env_moves_the_week_window() {
    let td = tempfile::tempdir().unwrap();
    let db = td.path().join("db.json");
    let run = |week_start: &str, args: &[&str]| {
        bin()
            .env("HABIT_DB_PATH", &db)
            // Sunday
            .env("HABIT_NOW", "2026-03-15T12:00:00Z")
            .env("HABIT_UTC_OFFSET", "Z")
            .env("HABIT_WEEK_START", week_start)
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    run("sunday", &["add", "Read"]);
    run("sunday", &["log", "Read", "--minutes", "30"]);

    let out = run("sunday", &["--format", "json", "progress", "--period", "week"]);
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["habits"][0]["window"]["start"], 1773532800000i64);

    let out = run("monday", &["--format", "json", "progress", "--period", "week"]);
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["habits"][0]["window"]["start"], 1773014400000i64);
    assert_eq!(v["habits"][0]["actual"], 30);
}

#[test]
fn ambiguous_selector_exit_code_4() {
    let td = tempfile::tempdir().unwrap();
    let db = td.path().join("db.json");

    for name in ["Read", "Run"] {
        bin()
            .env("HABIT_DB_PATH", &db)
            .args(["add", name])
            .assert()
            .success();
    }

    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["show", "r"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Ambiguous selector"));

    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["show", "h0042"])
        .assert()
        .code(3);
}

#[test]
fn usage_errors_exit_code_2() {
    let td = tempfile::tempdir().unwrap();
    let db = td.path().join("db.json");

    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["--format", "csv", "list"])
        .assert()
        .code(2);

    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["export"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--format csv"));

    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["--now", "yesterday", "list"])
        .assert()
        .code(2);

    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["--utc-offset", "nine", "list"])
        .assert()
        .code(2);

    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["alarm", "add", "25:00"])
        .assert()
        .code(2);

    bin().args(["frobnicate"]).assert().code(2);
}

#[test]
fn held_lock_and_corrupt_db_exit_code_5() {
    let td = tempfile::tempdir().unwrap();
    let db = td.path().join("db.json");

    fs::write(td.path().join("db.json.lock"), "").unwrap();
    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["add", "Read"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("DB is locked"));
    fs::remove_file(td.path().join("db.json.lock")).unwrap();

    fs::write(&db, "{ not json").unwrap();
    bin()
        .env("HABIT_DB_PATH", &db)
        .args(["list"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("DB corrupted"));
}
