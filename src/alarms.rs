use crate::date::{parse_clock_time, Calendar};
use crate::error::CliError;
use crate::goal::MAX_DAILY_MINUTES;
use crate::model::{Alarm, Db};

pub fn next_alarm_id(db: &mut Db) -> String {
    let n = db.meta.next_alarm_number;
    let id = format!("a{:04}", n);
    db.meta.next_alarm_number = n + 1;
    id
}

#[derive(Debug, Clone, Default)]
pub struct NewAlarm {
    pub time: String,
    pub label: Option<String>,
    pub habit_id: Option<String>,
    pub timer_duration_minutes: Option<u32>,
}

pub fn add_alarm(db: &mut Db, new: NewAlarm) -> Result<Alarm, CliError> {
    let time = parse_clock_time(&new.time, "alarm time")?
        .format("%H:%M")
        .to_string();

    if let Some(habit_id) = new.habit_id.as_deref() {
        if !db.habits.iter().any(|h| h.id == habit_id) {
            return Err(CliError::not_found(format!("Habit not found: {}", habit_id)));
        }
    }

    if let Some(m) = new.timer_duration_minutes {
        if m == 0 || m > MAX_DAILY_MINUTES {
            return Err(CliError::usage(format!(
                "Invalid timer minutes: {} (expected 1..={})",
                m, MAX_DAILY_MINUTES
            )));
        }
    }

    let label = new
        .label
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty());

    let alarm = Alarm {
        id: next_alarm_id(db),
        time,
        label,
        habit_id: new.habit_id,
        timer_duration_minutes: new.timer_duration_minutes,
    };
    db.alarms.push(alarm.clone());
    Ok(alarm)
}

/// By clock time, then id.
pub fn list_alarms(db: &Db) -> Vec<Alarm> {
    let mut out = db.alarms.to_vec();
    out.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.id.cmp(&b.id)));
    out
}

pub fn select_alarm_index(db: &Db, alarm_id: &str) -> Result<usize, CliError> {
    db.alarms
        .iter()
        .position(|a| a.id == alarm_id.trim())
        .ok_or_else(|| CliError::not_found(format!("Alarm not found: {}", alarm_id)))
}

pub fn remove_alarm(db: &mut Db, alarm_id: &str) -> Result<Alarm, CliError> {
    let idx = select_alarm_index(db, alarm_id)?;
    Ok(db.alarms.remove(idx))
}

/// Values a log started from an alarm inherits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogPrefill {
    pub habit_id: Option<String>,
    pub alarm_time: String,
    /// Today's local date at the alarm's clock time.
    pub start_time: i64,
    pub minutes: Option<u32>,
}

pub fn prefill_from_alarm(alarm: &Alarm, now: i64, cal: &Calendar) -> Result<LogPrefill, CliError> {
    let at = parse_clock_time(&alarm.time, "alarm time")?;
    let today = cal.local_date(now);
    Ok(LogPrefill {
        habit_id: alarm.habit_id.clone(),
        alarm_time: alarm.time.clone(),
        start_time: cal.instant(today.and_time(at)),
        minutes: alarm.timer_duration_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{parse_instant, parse_utc_offset, WeekStart, Zone};
    use crate::habits::make_habit;
    use crate::model::default_db;

    fn db_with_habit() -> Db {
        let mut db = default_db();
        db.habits.push(make_habit("h0001".to_string(), "Read").unwrap());
        db.meta.next_habit_number = 2;
        db
    }

    #[test]
    fn add_validates_and_normalizes() {
        let mut db = db_with_habit();
        let a = add_alarm(
            &mut db,
            NewAlarm {
                time: " 07:30 ".to_string(),
                label: Some("  ".to_string()),
                habit_id: Some("h0001".to_string()),
                timer_duration_minutes: Some(25),
            },
        )
        .unwrap();
        assert_eq!(a.id, "a0001");
        assert_eq!(a.time, "07:30");
        assert_eq!(a.label, None);

        let bad_time = NewAlarm {
            time: "7:30".to_string(),
            ..NewAlarm::default()
        };
        assert_eq!(add_alarm(&mut db, bad_time).unwrap_err().exit_code, 2);

        let bad_habit = NewAlarm {
            time: "08:00".to_string(),
            habit_id: Some("h0042".to_string()),
            ..NewAlarm::default()
        };
        assert_eq!(add_alarm(&mut db, bad_habit).unwrap_err().exit_code, 3);

        let bad_timer = NewAlarm {
            time: "08:00".to_string(),
            timer_duration_minutes: Some(0),
            ..NewAlarm::default()
        };
        assert_eq!(add_alarm(&mut db, bad_timer).unwrap_err().exit_code, 2);
        assert_eq!(db.alarms.len(), 1);
    }

    #[test]
    fn list_and_remove() {
        let mut db = db_with_habit();
        for t in ["21:00", "06:15"] {
            add_alarm(
                &mut db,
                NewAlarm {
                    time: t.to_string(),
                    ..NewAlarm::default()
                },
            )
            .unwrap();
        }
        let times: Vec<String> = list_alarms(&db).into_iter().map(|a| a.time).collect();
        assert_eq!(times, vec!["06:15", "21:00"]);

        assert_eq!(remove_alarm(&mut db, "a0001").unwrap().time, "21:00");
        assert_eq!(remove_alarm(&mut db, "a0001").unwrap_err().exit_code, 3);
        assert_eq!(db.alarms.len(), 1);
    }

    #[test]
    fn prefill_starts_at_alarm_time_today() {
        let cal = Calendar::new(
            Zone::Fixed(parse_utc_offset("+09:00").unwrap()),
            WeekStart::Sunday,
        );
        let alarm = Alarm {
            id: "a0001".to_string(),
            time: "07:00".to_string(),
            label: None,
            habit_id: Some("h0001".to_string()),
            timer_duration_minutes: Some(20),
        };
        let now = parse_instant("2026-03-18T00:30:00Z", "now").unwrap();
        let p = prefill_from_alarm(&alarm, now, &cal).unwrap();
        assert_eq!(p.start_time, parse_instant("2026-03-18T07:00:00+09:00", "t").unwrap());
        assert_eq!(p.alarm_time, "07:00");
        assert_eq!(p.minutes, Some(20));
        assert_eq!(p.habit_id.as_deref(), Some("h0001"));
    }
}
