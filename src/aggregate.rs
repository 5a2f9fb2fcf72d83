//! Actual achieved value of a habit over a window.
//!
//! Both goal types select the same logs (matching habit, not skipped,
//! `end_time` inside the window) and differ only in how the selection is
//! reduced: minutes are summed, days are counted once per local date.

use crate::date::Calendar;
use crate::model::HabitLog;
use crate::period::Window;
use crate::resolve::Unit;
use std::collections::BTreeSet;

pub trait Aggregate {
    fn aggregate(&self, logs: &[&HabitLog], cal: &Calendar) -> u32;
}

pub struct MinutesSum;

impl Aggregate for MinutesSum {
    fn aggregate(&self, logs: &[&HabitLog], _cal: &Calendar) -> u32 {
        logs.iter()
            .fold(0u32, |acc, l| acc.saturating_add(l.counted_minutes()))
    }
}

pub struct DistinctDays;

impl Aggregate for DistinctDays {
    fn aggregate(&self, logs: &[&HabitLog], cal: &Calendar) -> u32 {
        let days: BTreeSet<_> = logs.iter().map(|l| cal.local_date(l.end_time)).collect();
        days.len() as u32
    }
}

pub fn strategy_for(unit: Unit) -> &'static dyn Aggregate {
    match unit {
        Unit::Minutes => &MinutesSum,
        Unit::Days => &DistinctDays,
    }
}

/// Non-skipped logs of `habit_id` whose `end_time` falls inside `window`.
pub fn logs_in_window<'a>(logs: &'a [HabitLog], habit_id: &str, window: &Window) -> Vec<&'a HabitLog> {
    logs.iter()
        .filter(|l| l.habit_id == habit_id && !l.skipped && window.contains(l.end_time))
        .collect()
}

/// An unknown habit id simply selects nothing and yields 0.
pub fn aggregate_actual(
    logs: &[HabitLog],
    habit_id: &str,
    window: &Window,
    unit: Unit,
    cal: &Calendar,
) -> u32 {
    let selected = logs_in_window(logs, habit_id, window);
    strategy_for(unit).aggregate(&selected, cal)
}
