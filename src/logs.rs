use crate::date::{fmt_date, Calendar};
use crate::error::CliError;
use crate::model::{Db, HabitLog};
use chrono::NaiveDate;

pub const SKIPPED_NOTE: &str = "Skipped";

pub fn next_log_id(db: &mut Db) -> String {
    let n = db.meta.next_log_number;
    let id = format!("l{:06}", n);
    db.meta.next_log_number = n + 1;
    id
}

/// Everything a logging action supplies; the id and derived date are filled
/// in by [`record_log`].
#[derive(Debug, Clone, Default)]
pub struct NewLog {
    pub habit_id: String,
    pub note: Option<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub actual_duration_minutes: Option<u32>,
    pub alarm_time: Option<String>,
    pub date: Option<NaiveDate>,
    pub skipped: bool,
}

/// Appends exactly one log. Skipped logs never carry minutes.
pub fn record_log(db: &mut Db, new: NewLog, cal: &Calendar) -> HabitLog {
    let id = next_log_id(db);
    let date = new.date.unwrap_or_else(|| cal.local_date(new.end_time));
    let note = new
        .note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let (note, minutes) = if new.skipped {
        (note.or_else(|| Some(SKIPPED_NOTE.to_string())), Some(0))
    } else {
        (note, new.actual_duration_minutes)
    };

    let log = HabitLog {
        id,
        habit_id: new.habit_id,
        note,
        start_time: new.start_time,
        end_time: new.end_time,
        actual_duration_minutes: minutes,
        alarm_time: new.alarm_time,
        date: Some(fmt_date(date)),
        skipped: new.skipped,
    };
    tracing::debug!(log_id = %log.id, habit_id = %log.habit_id, skipped = log.skipped, "log recorded");
    db.logs.push(log.clone());
    log
}

pub fn delete_log(db: &mut Db, log_id: &str) -> Result<HabitLog, CliError> {
    let idx = db
        .logs
        .iter()
        .position(|l| l.id == log_id.trim())
        .ok_or_else(|| CliError::not_found(format!("Log not found: {}", log_id)))?;
    Ok(db.logs.remove(idx))
}

/// Oldest first; ties broken by id.
pub fn list_logs(db: &Db, habit_id: Option<&str>) -> Vec<HabitLog> {
    let mut out: Vec<HabitLog> = db
        .logs
        .iter()
        .filter(|l| habit_id.map_or(true, |id| l.habit_id == id))
        .cloned()
        .collect();
    out.sort_by(|a, b| a.end_time.cmp(&b.end_time).then_with(|| a.id.cmp(&b.id)));
    out
}

/// Whether the habit was already dealt with on `date`. Skipped logs count
/// here even though they never count toward goals.
pub fn is_handled_on(logs: &[HabitLog], habit_id: &str, date: NaiveDate, cal: &Calendar) -> bool {
    logs.iter()
        .any(|l| l.habit_id == habit_id && cal.local_date(l.end_time) == date)
}

/// `1h 2m 3s`, dropping zero parts; negative input reads as `0s`.
pub fn format_duration(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    let mut parts: Vec<String> = Vec::new();
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }
    parts.join(" ")
}
