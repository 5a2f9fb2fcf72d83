use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

const WED: &str = "2026-03-18T10:00:00Z";

fn habit_cmd() -> Command {
    Command::cargo_bin("habit").expect("binary habit is built")
}

fn read_json(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).expect("valid json")
}

fn ms(ts: &str) -> i64 {
    chrono::DateTime::parse_from_rfc3339(ts)
        .expect("valid timestamp")
        .timestamp_millis()
}

struct Sandbox {
    _dir: tempfile::TempDir,
    db: PathBuf,
}

impl Sandbox {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("db.json");
        Self { _dir: dir, db }
    }

    fn cmd(&self, now: &str) -> Command {
        let mut c = habit_cmd();
        c.env_remove("HABIT_DB_PATH")
            .env_remove("HABIT_NOW")
            .env_remove("HABIT_UTC_OFFSET")
            .env_remove("HABIT_WEEK_START")
            .env_remove("HABIT_LOG")
            .env("NO_COLOR", "1")
            .args(["--db", self.db.to_str().unwrap(), "--now", now, "--utc-offset", "Z"]);
        c
    }

    fn json(&self, now: &str, args: &[&str]) -> Value {
        let out = self
            .cmd(now)
            .args(["--format", "json"])
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        read_json(&out)
    }

    fn stdout(&self, now: &str, args: &[&str]) -> String {
        let out = self
            .cmd(now)
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        String::from_utf8(out).expect("utf8 stdout")
    }
}

#[test]
fn add_uses_default_goal_and_rejects_duplicate_names() {
    let sb = Sandbox::new();

    let v = sb.json(WED, &["add", "Meditate"]);
    assert_eq!(v["habit"]["id"], "h0001");
    assert_eq!(v["habit"]["name"], "Meditate");
    assert_eq!(v["habit"]["goal"]["goal_type"], "time");
    assert_eq!(v["habit"]["goal"]["days_per_week"], 7);
    assert_eq!(v["habit"]["goal"]["daily_goal_minutes"], 30);
    assert_eq!(v["habit"]["goal"]["weekly_goal_minutes"], 210);
    assert_eq!(v["habit"]["goal"]["monthly_goal_minutes"], 840);
    assert_eq!(v["habit"]["goal"]["yearly_goal_minutes"], 10920);

    sb.cmd(WED)
        .args(["add", "meditate"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("already exists"));

    let v = sb.json(WED, &["list"]);
    assert_eq!(v["habits"].as_array().unwrap().len(), 1);
}

#[test]
fn goal_changes_recompute_targets() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Read"]);

    let v = sb.json(
        WED,
        &["goal", "read", "--days-per-week", "5", "--minutes", "45"],
    );
    assert_eq!(v["habit"]["goal"]["weekly_goal_minutes"], 225);
    assert_eq!(v["habit"]["goal"]["monthly_goal_minutes"], 900);
    assert_eq!(v["habit"]["goal"]["yearly_goal_minutes"], 11700);

    let v = sb.json(WED, &["goal", "h0001", "--type", "days", "--rename", "Reading"]);
    assert_eq!(v["habit"]["name"], "Reading");
    assert_eq!(v["habit"]["goal"]["goal_type"], "days");

    sb.cmd(WED)
        .args(["goal", "Reading"])
        .assert()
        .code(2);
    sb.cmd(WED)
        .args(["goal", "Reading", "--days-per-week", "8"])
        .assert()
        .code(2);
}

#[test]
fn week_progress_sums_minutes_and_ignores_skips() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Read", "--days-per-week", "5", "--minutes", "30"]);

    sb.json("2026-03-16T08:00:00Z", &["log", "Read", "--minutes", "20"]);
    sb.json("2026-03-17T08:00:00Z", &["log", "Read", "--skip"]);
    sb.json("2026-03-18T09:00:00Z", &["log", "Read", "--minutes", "25"]);
    // Previous week
    sb.json("2026-03-13T08:00:00Z", &["log", "Read", "--minutes", "90"]);

    let v = sb.json(WED, &["progress", "--period", "week"]);
    assert_eq!(v["period"], "week");
    assert_eq!(v["year"], 2026);
    let row = &v["habits"][0];
    assert_eq!(row["goal"], 150);
    assert_eq!(row["actual"], 45);
    assert_eq!(row["unit"], "minutes");
    assert_eq!(row["percent"], 30);
    assert_eq!(row["window"]["start"], ms("2026-03-15T00:00:00Z"));

    let v = sb.json(WED, &["progress", "--period", "day"]);
    assert_eq!(v["habits"][0]["goal"], 30);
    assert_eq!(v["habits"][0]["actual"], 25);
    assert_eq!(v["habits"][0]["percent"], 83);

    let v = sb.json(WED, &["progress", "--period", "month"]);
    assert_eq!(v["habits"][0]["goal"], 600);
    assert_eq!(v["habits"][0]["actual"], 135);
}

#[test]
fn days_goal_counts_distinct_days() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Run", "--type", "days", "--days-per-week", "3"]);

    sb.json("2026-03-16T07:00:00Z", &["log", "Run", "--minutes", "20"]);
    sb.json("2026-03-16T19:00:00Z", &["log", "Run", "--minutes", "10"]);
    sb.json("2026-03-18T07:00:00Z", &["log", "Run", "--minutes", "30"]);

    let v = sb.json(WED, &["progress", "--period", "week"]);
    let row = &v["habits"][0];
    assert_eq!(row["unit"], "days");
    assert_eq!(row["goal"], 3);
    assert_eq!(row["actual"], 2);
    assert_eq!(row["percent"], 67);

    let v = sb.json(WED, &["progress", "--period", "day"]);
    assert_eq!(v["habits"][0]["goal"], 1);
    assert_eq!(v["habits"][0]["percent"], 100);
}

#[test]
fn past_year_selection_only_counts_that_year() {
    let sb = Sandbox::new();
    sb.json("2025-06-01T08:00:00Z", &["add", "Read"]);
    sb.json("2025-06-01T08:00:00Z", &["log", "Read", "--minutes", "40"]);
    sb.json(WED, &["log", "Read", "--minutes", "10"]);

    let v = sb.json(WED, &["progress", "--period", "year", "--year", "2025"]);
    assert_eq!(v["habits"][0]["actual"], 40);
    assert_eq!(v["habits"][0]["window"]["end"], ms("2025-12-31T23:59:59Z"));

    // A week around "now" has nothing to do with 2025.
    let v = sb.json(WED, &["progress", "--period", "week", "--year", "2025"]);
    assert_eq!(v["habits"][0]["actual"], 0);
    assert_eq!(v["habits"][0]["percent"], 0);

    let v = sb.json(WED, &["summary"]);
    assert_eq!(v["year"], 2026);
    assert_eq!(v["available_years"], serde_json::json!([2026, 2025]));
    assert_eq!(v["habits"][0]["actual_minutes"], 10);
    assert_eq!(v["habits"][0]["goal_minutes"], 10950);
    assert_eq!(v["minutes_by_habit"][0]["minutes"], 10);
}

#[test]
fn today_reports_skips_as_handled() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Read"]);
    sb.json(WED, &["add", "Stretch"]);
    sb.json("2026-03-18T08:00:00Z", &["log", "Stretch", "--skip"]);

    let v = sb.json(WED, &["today"]);
    assert_eq!(v["date"], "2026-03-18");
    let habits = v["habits"].as_array().unwrap();
    assert_eq!(habits[0]["name"], "Read");
    assert_eq!(habits[0]["handled"], false);
    assert_eq!(habits[1]["name"], "Stretch");
    assert_eq!(habits[1]["handled"], true);
    assert_eq!(habits[1]["actual"], 0);

    let v = sb.json(WED, &["show", "stretch"]);
    assert_eq!(v["handled_today"], true);
    assert_eq!(v["counts"]["today"], 0);
    assert_eq!(v["logs"][0]["note"], "Skipped");
    assert_eq!(v["logs"][0]["actual_duration_minutes"], 0);
}

#[test]
fn log_from_alarm_prefills_fields() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Read"]);

    let v = sb.json(WED, &["alarm", "add", "07:00", "--habit", "Read", "--timer", "15"]);
    assert_eq!(v["alarm"]["id"], "a0001");
    assert_eq!(v["alarm"]["habit_id"], "h0001");

    let now = "2026-03-18T07:20:00Z";
    let v = sb.json(now, &["log", "--alarm", "a0001", "--note", "chapter 3"]);
    assert_eq!(v["log"]["habit_id"], "h0001");
    assert_eq!(v["log"]["alarm_time"], "07:00");
    assert_eq!(v["log"]["start_time"], ms("2026-03-18T07:00:00Z"));
    assert_eq!(v["log"]["end_time"], ms(now));
    assert_eq!(v["log"]["actual_duration_minutes"], 15);
    assert_eq!(v["log"]["date"], "2026-03-18");
    assert_eq!(v["counts"]["today"], 1);

    // Explicit minutes win over the alarm's timer.
    let v = sb.json(now, &["log", "--alarm", "a0001", "--minutes", "40"]);
    assert_eq!(v["log"]["actual_duration_minutes"], 40);

    let v = sb.json(WED, &["alarm", "list"]);
    assert_eq!(v["alarms"].as_array().unwrap().len(), 1);
    sb.json(WED, &["alarm", "remove", "a0001"]);
    sb.cmd(WED)
        .args(["log", "--alarm", "a0001"])
        .assert()
        .code(3);
}

#[test]
fn history_export_csv() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Read"]);
    sb.json("2026-03-16T08:00:00Z", &["log", "Read", "--minutes", "20"]);
    sb.json("2026-03-18T08:00:00Z", &["log", "Read", "--minutes", "10"]);

    let out = sb.stdout(WED, &["--format", "csv", "export", "--kind", "history"]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(
        lines[0],
        "date,alarm_time,habit,actual_minutes,yearly_goal,yearly_actual,monthly_goal,monthly_actual,weekly_goal,weekly_actual,daily_goal,daily_actual"
    );
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "2026-03-16,00:00,Read,20,10920,30,840,30,210,30,30,20");
    assert_eq!(lines[2], "2026-03-18,00:00,Read,10,10920,30,840,30,210,30,30,10");
}

#[test]
fn logs_export_keeps_orphans_under_unknown_habit() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Read"]);
    sb.json(WED, &["add", "Swim"]);
    sb.json(
        "2026-03-18T08:30:00Z",
        &["log", "Swim", "--minutes", "30", "--start", "2026-03-18T08:00:00Z", "--note", "pool, lane 2"],
    );

    let v = sb.json(WED, &["delete", "swim"]);
    assert_eq!(v["kept_logs"], 1);

    let out_file = sb.db.with_file_name("logs.csv");
    sb.cmd(WED)
        .args([
            "--format",
            "csv",
            "export",
            "--kind",
            "logs",
            "--out",
            out_file.to_str().unwrap(),
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let csv = fs::read_to_string(&out_file).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "date,time,habit,note,duration_seconds");
    assert_eq!(lines[1], "2026-03-18,08:30:00,Unknown Habit,\"pool, lane 2\",1800");

    // History drops rows whose habit is gone.
    let v = sb.json(WED, &["history"]);
    assert_eq!(v["records"].as_array().unwrap().len(), 0);
}

#[test]
fn unlog_removes_a_single_log() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Read"]);
    sb.json(WED, &["log", "Read", "--minutes", "20"]);
    sb.json(WED, &["log", "Read", "--minutes", "5"]);

    let v = sb.json(WED, &["unlog", "l000001"]);
    assert_eq!(v["log"]["actual_duration_minutes"], 20);

    let v = sb.json(WED, &["logs", "read"]);
    let logs = v["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0]["id"], "l000002");

    sb.cmd(WED).args(["unlog", "l000001"]).assert().code(3);
}

#[test]
fn table_output_renders_progress() {
    let sb = Sandbox::new();
    sb.json(WED, &["add", "Read"]);
    sb.json(WED, &["log", "Read", "--minutes", "105"]);

    let out = sb.stdout(WED, &["progress", "--period", "week"]);
    assert!(out.contains("Progress: week (2026)"));
    assert!(out.contains("1h 45m"));
    assert!(out.contains("3h 30m"));
    assert!(out.contains("50%"));

    let out = sb.stdout(WED, &["list"]);
    assert!(out.contains("30m/day"));
}
