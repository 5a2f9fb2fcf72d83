//! Goal-vs-actual reporting: per-period progress, the yearly summary and the
//! small per-habit counters shown next to a log prompt.
//!
//! Percentages are always computed by [`progress_percent`], so they stay in
//! `[0, 100]` and a zero goal reads as 0% instead of dividing by zero.

use crate::aggregate::{aggregate_actual, logs_in_window};
use crate::date::{year_start, Calendar};
use crate::model::{Habit, HabitLog};
use crate::period::{calendar_window, report_window, Period, Window};
use crate::resolve::{resolve_goal, Unit};
use std::collections::BTreeSet;

/// Days in the yearly summary goal (`daily_goal_minutes × 365`).
const SUMMARY_DAYS_PER_YEAR: u32 = 365;

pub fn progress_percent(actual: u32, goal: u32) -> u32 {
    if goal == 0 {
        return 0;
    }
    let pct = (actual as f64 / goal as f64) * 100.0;
    pct.min(100.0).round() as u32
}

/// One habit's progress for one period.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProgressRow {
    pub habit_id: String,
    pub name: String,
    pub period: Period,
    pub goal: u32,
    pub actual: u32,
    pub unit: Unit,
    /// 0-100, rounded.
    pub percent: u32,
    pub window: Window,
}

pub fn habit_progress(
    habit: &Habit,
    logs: &[HabitLog],
    period: Period,
    window: &Window,
    cal: &Calendar,
) -> ProgressRow {
    let goal = resolve_goal(habit, period);
    let actual = aggregate_actual(logs, &habit.id, window, goal.unit, cal);
    ProgressRow {
        habit_id: habit.id.clone(),
        name: habit.name.clone(),
        period,
        goal: goal.value,
        actual,
        unit: goal.unit,
        percent: progress_percent(actual, goal.value),
        window: *window,
    }
}

/// Progress of every habit over `period`, in the order the habits are given.
pub fn build_progress(
    habits: &[Habit],
    logs: &[HabitLog],
    period: Period,
    now: i64,
    selected_year: i32,
    cal: &Calendar,
) -> Vec<ProgressRow> {
    let window = report_window(period, now, selected_year, cal);
    habits
        .iter()
        .map(|h| habit_progress(h, logs, period, &window, cal))
        .collect()
}

/// Minutes over a whole calendar year against `daily_goal_minutes × 365`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnnualRow {
    pub habit_id: String,
    pub name: String,
    pub actual_minutes: u32,
    pub goal_minutes: u32,
    pub percent: u32,
}

fn selected_year_window(selected_year: i32, cal: &Calendar) -> Window {
    calendar_window(
        Period::Year,
        cal.start_of_day(year_start(selected_year)),
        cal,
    )
}

fn minutes_in(logs: &[HabitLog], habit_id: &str, window: &Window, cal: &Calendar) -> u32 {
    aggregate_actual(logs, habit_id, window, Unit::Minutes, cal)
}

/// Sorted by percent, highest first; ties keep the habits' order.
pub fn annual_summary(
    habits: &[Habit],
    logs: &[HabitLog],
    selected_year: i32,
    cal: &Calendar,
) -> Vec<AnnualRow> {
    let window = selected_year_window(selected_year, cal);
    let mut rows: Vec<AnnualRow> = habits
        .iter()
        .map(|h| {
            let actual = minutes_in(logs, &h.id, &window, cal);
            let goal = h.goal.daily_goal_minutes() * SUMMARY_DAYS_PER_YEAR;
            AnnualRow {
                habit_id: h.id.clone(),
                name: h.name.clone(),
                actual_minutes: actual,
                goal_minutes: goal,
                percent: progress_percent(actual, goal),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.percent.cmp(&a.percent));
    rows
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct HabitMinutes {
    pub habit_id: String,
    pub name: String,
    pub minutes: u32,
}

/// Share of the selected year's minutes per habit; habits without any
/// minutes are left out.
pub fn minutes_by_habit(
    habits: &[Habit],
    logs: &[HabitLog],
    selected_year: i32,
    cal: &Calendar,
) -> Vec<HabitMinutes> {
    let window = selected_year_window(selected_year, cal);
    habits
        .iter()
        .map(|h| HabitMinutes {
            habit_id: h.id.clone(),
            name: h.name.clone(),
            minutes: minutes_in(logs, &h.id, &window, cal),
        })
        .filter(|m| m.minutes > 0)
        .collect()
}

/// Years that have logs, plus the current one, newest first.
pub fn available_years(logs: &[HabitLog], now: i64, cal: &Calendar) -> Vec<i32> {
    let mut years: BTreeSet<i32> = logs.iter().map(|l| cal.local_year(l.end_time)).collect();
    years.insert(cal.local_year(now));
    years.into_iter().rev().collect()
}

/// Number of non-skipped logs in the calendar units around `now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct LogCounts {
    pub today: u32,
    pub week: u32,
    pub month: u32,
    pub year: u32,
}

pub fn log_counts(logs: &[HabitLog], habit_id: &str, now: i64, cal: &Calendar) -> LogCounts {
    let count = |period: Period| {
        let window = calendar_window(period, now, cal);
        logs_in_window(logs, habit_id, &window).len() as u32
    };
    LogCounts {
        today: count(Period::Day),
        week: count(Period::Week),
        month: count(Period::Month),
        year: count(Period::Year),
    }
}
