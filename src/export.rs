use crate::date::Calendar;
use crate::error::CliError;
use crate::habits::habit_name_or_unknown;
use crate::history::HistoryRecord;
use crate::model::{Habit, HabitLog};
use std::fs;
use std::io::Write;
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

pub const HISTORY_HEADER: [&str; 12] = [
    "date",
    "alarm_time",
    "habit",
    "actual_minutes",
    "yearly_goal",
    "yearly_actual",
    "monthly_goal",
    "monthly_actual",
    "weekly_goal",
    "weekly_actual",
    "daily_goal",
    "daily_actual",
];

pub const LOGS_HEADER: [&str; 5] = ["date", "time", "habit", "note", "duration_seconds"];

fn csv_escape(value: &str) -> String {
    if value.contains(['\n', '\r', '"', ',']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn to_csv_line<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| csv_escape(v.as_ref()))
        .collect::<Vec<String>>()
        .join(",")
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn history_csv(records: &[HistoryRecord]) -> String {
    let mut lines = vec![to_csv_line(&HISTORY_HEADER)];
    for r in records {
        lines.push(to_csv_line(&[
            r.date.clone(),
            r.alarm_time.clone(),
            r.habit_name.clone(),
            r.actual_duration.to_string(),
            r.yearly_goal.to_string(),
            r.yearly_actual.to_string(),
            r.monthly_goal.to_string(),
            r.monthly_actual.to_string(),
            r.weekly_goal.to_string(),
            r.weekly_actual.to_string(),
            r.daily_goal.to_string(),
            r.daily_actual.to_string(),
        ]));
    }
    finish(lines)
}

/// Raw log listing. Date and time come from `end_time` in the calendar's
/// zone; logs of deleted habits are kept under "Unknown Habit".
#[derive(Debug, Clone, serde::Serialize)]
pub struct LogExportRow {
    pub date: String,
    pub time: String,
    pub habit: String,
    pub note: String,
    pub duration_seconds: f64,
}

pub fn log_export_rows(logs: &[HabitLog], habits: &[Habit], cal: &Calendar) -> Vec<LogExportRow> {
    logs.iter()
        .map(|l| {
            let at = cal.local_datetime(l.end_time);
            LogExportRow {
                date: at.format("%Y-%m-%d").to_string(),
                time: at.format("%H:%M:%S").to_string(),
                habit: habit_name_or_unknown(habits, &l.habit_id).to_string(),
                note: l.note.clone().unwrap_or_default(),
                duration_seconds: l.elapsed_ms() as f64 / 1000.0,
            }
        })
        .collect()
}

pub fn logs_csv(rows: &[LogExportRow]) -> String {
    let mut lines = vec![to_csv_line(&LOGS_HEADER)];
    for r in rows {
        lines.push(to_csv_line(&[
            r.date.clone(),
            r.time.clone(),
            r.habit.clone(),
            r.note.clone(),
            r.duration_seconds.to_string(),
        ]));
    }
    finish(lines)
}

/// Writes to `out` (owner-only permissions) or to stdout when `out` is None.
pub fn write_export(out: Option<&str>, content: &str) -> Result<(), CliError> {
    let Some(path) = out else {
        print!("{}", content);
        return Ok(());
    };

    let p = Path::new(path);
    if let Some(parent) = p.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|_| CliError::io("Export IO error"))?;
    }

    let mut f = fs::File::create(p).map_err(|_| CliError::io("Export IO error"))?;
    #[cfg(unix)]
    {
        let _ = f.set_permissions(fs::Permissions::from_mode(0o600));
    }
    f.write_all(content.as_bytes())
        .map_err(|_| CliError::io("Export IO error"))?;
    tracing::debug!(path = %p.display(), bytes = content.len(), "export written");
    Ok(())
}
