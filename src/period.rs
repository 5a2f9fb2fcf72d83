//! Reporting periods and the concrete `[start, end]` windows behind them.

use crate::date::{month_start, year_start, Calendar};
use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Day, Period::Week, Period::Month, Period::Year];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }

    /// First local date of the unit of this period that contains `date`.
    pub fn unit_start(&self, date: NaiveDate, cal: &Calendar) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => cal.week_start_date(date),
            Period::Month => month_start(date),
            Period::Year => year_start(date.year()),
        }
    }

    fn next_unit_start(&self, unit_start: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => unit_start + Duration::days(1),
            Period::Week => unit_start + Duration::days(7),
            Period::Month => unit_start
                .checked_add_months(Months::new(1))
                .unwrap_or(NaiveDate::MAX),
            Period::Year => unit_start
                .checked_add_months(Months::new(12))
                .unwrap_or(NaiveDate::MAX),
        }
    }
}

/// Inclusive range of UTC milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct Window {
    pub start: i64,
    pub end: i64,
}

impl Window {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, ms: i64) -> bool {
        self.start <= ms && ms <= self.end
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    /// May come back empty when the two windows do not overlap.
    pub fn intersect(&self, other: &Window) -> Window {
        Window::new(self.start.max(other.start), self.end.min(other.end))
    }
}

/// The whole day/week/month/year containing `anchor`, ending one
/// millisecond before the next unit starts.
pub fn calendar_window(period: Period, anchor: i64, cal: &Calendar) -> Window {
    let start_date = period.unit_start(cal.local_date(anchor), cal);
    let next = period.next_unit_start(start_date);
    Window::new(cal.start_of_day(start_date), cal.start_of_day(next) - 1)
}

/// Jan 1 of `selected_year` up to `now` when that is the current year,
/// otherwise up to Dec 31 23:59:59.
pub fn year_scope(selected_year: i32, now: i64, cal: &Calendar) -> Window {
    let start = cal.start_of_day(year_start(selected_year));
    let end = if selected_year == cal.local_year(now) {
        now
    } else {
        let last_second = NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN);
        let dec31 = NaiveDate::from_ymd_opt(selected_year, 12, 31).unwrap_or_default();
        cal.instant(dec31.and_time(last_second))
    };
    Window::new(start, end)
}

/// Window used for progress reporting: day/week/month are taken around
/// `now`, year is the selected year, and every window is clipped to the
/// selected-year scope so only logs from that year ever count.
pub fn report_window(period: Period, now: i64, selected_year: i32, cal: &Calendar) -> Window {
    let scope = year_scope(selected_year, now, cal);
    match period {
        Period::Year => scope,
        _ => calendar_window(period, now, cal).intersect(&scope),
    }
}
