//! Flattened per-log history rows for export.
//!
//! Every log of a known habit becomes one row carrying minute totals for the
//! day, week, month and year that log falls in, next to the habit's goals for
//! those periods. Rows are relative to the log's own date, not to "now", and
//! are always in minutes whatever the habit's goal type.

use crate::date::{fmt_date, Calendar};
use crate::model::{Habit, HabitLog};
use crate::period::Period;
use chrono::NaiveDate;
use std::collections::HashMap;

pub const DEFAULT_ALARM_TIME: &str = "00:00";

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct HistoryRecord {
    pub date: String,
    pub alarm_time: String,
    pub habit_name: String,
    pub actual_duration: u32,
    pub yearly_goal: u32,
    pub yearly_actual: u32,
    pub monthly_goal: u32,
    pub monthly_actual: u32,
    pub weekly_goal: u32,
    pub weekly_actual: u32,
    pub daily_goal: u32,
    pub daily_actual: u32,
}

type UnitKey<'a> = (&'a str, Period, NaiveDate);

struct PeriodTotals<'a> {
    minutes: HashMap<UnitKey<'a>, u32>,
}

impl<'a> PeriodTotals<'a> {
    fn collect(logs: &'a [HabitLog], cal: &Calendar) -> Self {
        let mut minutes: HashMap<UnitKey<'a>, u32> = HashMap::new();
        for l in logs {
            let date = cal.local_date(l.end_time);
            for period in Period::ALL {
                let key = (l.habit_id.as_str(), period, period.unit_start(date, cal));
                let total = minutes.entry(key).or_insert(0);
                *total = total.saturating_add(l.counted_minutes());
            }
        }
        Self { minutes }
    }

    fn get(&self, habit_id: &'a str, period: Period, date: NaiveDate, cal: &Calendar) -> u32 {
        self.minutes
            .get(&(habit_id, period, period.unit_start(date, cal)))
            .copied()
            .unwrap_or(0)
    }
}

/// One row per log, in input order. Logs whose habit no longer exists are
/// dropped.
pub fn build_history_records(
    logs: &[HabitLog],
    habits: &[Habit],
    cal: &Calendar,
) -> Vec<HistoryRecord> {
    let by_id: HashMap<&str, &Habit> = habits.iter().map(|h| (h.id.as_str(), h)).collect();
    let totals = PeriodTotals::collect(logs, cal);

    let mut orphans = 0usize;
    let records: Vec<HistoryRecord> = logs
        .iter()
        .filter_map(|l| {
            let Some(habit) = by_id.get(l.habit_id.as_str()) else {
                orphans += 1;
                return None;
            };
            let date = cal.local_date(l.end_time);
            let actual = |p: Period| totals.get(l.habit_id.as_str(), p, date, cal);

            let weekly_goal = habit.goal.weekly_goal_minutes();
            Some(HistoryRecord {
                date: l.date.clone().unwrap_or_else(|| fmt_date(date)),
                alarm_time: l
                    .alarm_time
                    .clone()
                    .unwrap_or_else(|| DEFAULT_ALARM_TIME.to_string()),
                habit_name: habit.name.clone(),
                actual_duration: l.counted_minutes(),
                yearly_goal: weekly_goal * 52,
                yearly_actual: actual(Period::Year),
                monthly_goal: weekly_goal * 4,
                monthly_actual: actual(Period::Month),
                weekly_goal,
                weekly_actual: actual(Period::Week),
                daily_goal: (weekly_goal as f64 / 7.0).round() as u32,
                daily_actual: actual(Period::Day),
            })
        })
        .collect();

    if orphans > 0 {
        tracing::debug!(orphans, "history rows skipped for logs of deleted habits");
    }
    records
}
