//! Local calendar arithmetic on top of chrono.
//!
//! Timestamps are UTC milliseconds. Every "local" notion (calendar date, start
//! of day, start of week) goes through a [`Calendar`], which carries the time
//! zone and the first day of the week so nothing reads ambient settings.

use crate::error::CliError;
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Local, LocalResult, NaiveDate, NaiveDateTime,
    NaiveTime, Offset, TimeZone, Utc,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// The system's local time zone, DST included.
    Local,
    Fixed(FixedOffset),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeekStart::Sunday => "sunday",
            WeekStart::Monday => "monday",
        }
    }

    fn days_into_week(&self, date: NaiveDate) -> i64 {
        let wd = date.weekday();
        match self {
            WeekStart::Sunday => wd.num_days_from_sunday() as i64,
            WeekStart::Monday => wd.num_days_from_monday() as i64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
    zone: Zone,
    week_start: WeekStart,
}

impl Calendar {
    pub fn new(zone: Zone, week_start: WeekStart) -> Self {
        Self { zone, week_start }
    }

    /// UTC with Sunday-first weeks.
    pub fn utc() -> Self {
        Self::new(Zone::Fixed(utc_offset()), WeekStart::Sunday)
    }

    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    pub fn local_datetime(&self, ms: i64) -> NaiveDateTime {
        let utc = DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or_default();
        match self.zone {
            Zone::Local => utc.with_timezone(&Local).naive_local(),
            Zone::Fixed(offset) => utc.with_timezone(&offset).naive_local(),
        }
    }

    pub fn local_date(&self, ms: i64) -> NaiveDate {
        self.local_datetime(ms).date()
    }

    pub fn local_year(&self, ms: i64) -> i32 {
        self.local_date(ms).year()
    }

    /// UTC milliseconds of a local wall-clock time.
    pub fn instant(&self, local: NaiveDateTime) -> i64 {
        match self.zone {
            Zone::Local => resolve_local(&Local, local),
            Zone::Fixed(offset) => resolve_local(&offset, local),
        }
    }

    pub fn start_of_day(&self, date: NaiveDate) -> i64 {
        self.instant(date.and_time(NaiveTime::MIN))
    }

    pub fn week_start_date(&self, date: NaiveDate) -> NaiveDate {
        date - Duration::days(self.week_start.days_into_week(date))
    }
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> i64 {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        // Inside a DST gap: use the first valid instant after it.
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| Utc.from_utc_datetime(&local).timestamp_millis()),
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}

pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

pub fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or_default()
}

pub fn fmt_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date(s: &str, label: &str) -> Result<NaiveDate, CliError> {
    let ss = s.trim();
    if ss.len() != 10 {
        return Err(CliError::usage(format!("Invalid {}: {}", label, s)));
    }
    NaiveDate::parse_from_str(ss, "%Y-%m-%d")
        .map_err(|_| CliError::usage(format!("Invalid {}: {}", label, s)))
}

/// Parses an RFC3339 timestamp (offset required) into UTC milliseconds.
pub fn parse_instant(ts: &str, label: &str) -> Result<i64, CliError> {
    let t = ts.trim();
    if t.is_empty() {
        return Err(CliError::usage(format!("Invalid {}: (empty)", label)));
    }
    DateTime::parse_from_rfc3339(t)
        .map(|dt| dt.timestamp_millis())
        .map_err(|_| CliError::usage(format!("Invalid {}: {}", label, ts)))
}

/// Accepts `Z`, `UTC`, `+HH:MM`, `-HH:MM` or `+HHMM`.
pub fn parse_utc_offset(s: &str) -> Result<FixedOffset, CliError> {
    let raw = s.trim();
    let invalid = || CliError::usage(format!("Invalid utc offset: {}", s));

    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return Ok(utc_offset());
    }

    let (sign, rest) = match raw.chars().next() {
        Some('+') => (1, &raw[1..]),
        Some('-') => (-1, &raw[1..]),
        _ => return Err(invalid()),
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    let hours: i32 = digits[0..2].parse().map_err(|_| invalid())?;
    let minutes: i32 = digits[2..4].parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or_else(invalid)
}

/// Parses a 24h "HH:MM" clock time.
pub fn parse_clock_time(s: &str, label: &str) -> Result<NaiveTime, CliError> {
    let ss = s.trim();
    if ss.len() != 5 {
        return Err(CliError::usage(format!("Invalid {}: {}", label, s)));
    }
    NaiveTime::parse_from_str(ss, "%H:%M")
        .map_err(|_| CliError::usage(format!("Invalid {}: {}", label, s)))
}

pub fn system_now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
