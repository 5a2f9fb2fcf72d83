use crate::error::CliError;
use crate::goal::{Goal, GoalType};
use crate::model::{Db, Habit};
use crate::output::format_minutes;

pub const UNKNOWN_HABIT: &str = "Unknown Habit";

fn normalize_name(name: &str) -> String {
    name.trim().to_string()
}

pub fn validate_habit_name(name: &str) -> Result<String, CliError> {
    let n = normalize_name(name);
    if n.is_empty() {
        return Err(CliError::usage("Habit name is required"));
    }
    Ok(n)
}

/// Names are unique per db, compared case-insensitively.
pub fn ensure_unique_name(db: &Db, name: &str, except_id: Option<&str>) -> Result<(), CliError> {
    let wanted = name.to_lowercase();
    let clash = db
        .habits
        .iter()
        .filter(|h| Some(h.id.as_str()) != except_id)
        .any(|h| h.name.to_lowercase() == wanted);
    if clash {
        return Err(CliError::conflict(format!(
            "A habit with this name already exists: {}",
            name
        )));
    }
    Ok(())
}

pub fn next_habit_id(db: &mut Db) -> String {
    let n = db.meta.next_habit_number;
    let id = format!("h{:04}", n);
    db.meta.next_habit_number = n + 1;
    id
}

pub fn stable_habit_sort(a: &Habit, b: &Habit) -> std::cmp::Ordering {
    let an = a.name.to_lowercase();
    let bn = b.name.to_lowercase();
    match an.cmp(&bn) {
        std::cmp::Ordering::Equal => a.id.cmp(&b.id),
        o => o,
    }
}

pub fn list_habits(db: &Db) -> Vec<Habit> {
    let mut out: Vec<Habit> = db.habits.to_vec();
    out.sort_by(stable_habit_sort);
    out
}

fn looks_like_habit_id(s: &str) -> bool {
    s.len() == 5 && s.starts_with('h') && s[1..].chars().all(|c| c.is_ascii_digit())
}

/// Resolves an exact id (`h0001`), an exact name, or a unique
/// case-insensitive name prefix.
pub fn select_habit_index(db: &Db, selector: &str) -> Result<usize, CliError> {
    let s = selector.trim();
    if s.is_empty() {
        return Err(CliError::usage("Habit selector is required"));
    }

    if looks_like_habit_id(s) {
        return db
            .habits
            .iter()
            .position(|h| h.id == s)
            .ok_or_else(|| CliError::not_found(format!("Habit not found: {}", selector)));
    }

    let needle = s.to_lowercase();
    if let Some(i) = db.habits.iter().position(|h| h.name.to_lowercase() == needle) {
        return Ok(i);
    }

    let mut matches: Vec<(usize, &Habit)> = db
        .habits
        .iter()
        .enumerate()
        .filter(|(_, h)| h.name.to_lowercase().starts_with(&needle))
        .collect();

    matches.sort_by(|a, b| stable_habit_sort(a.1, b.1));

    match matches.len() {
        0 => Err(CliError::not_found(format!("Habit not found: {}", selector))),
        1 => Ok(matches[0].0),
        _ => {
            let candidates = matches
                .iter()
                .map(|(_, h)| format!("{} {}", h.id, h.name))
                .collect::<Vec<String>>()
                .join(", ");
            Err(CliError::ambiguous(format!(
                "Ambiguous selector '{}'. Candidates: {}",
                selector, candidates
            )))
        }
    }
}

/// New habits start as a 30 minute, every-day time goal.
pub fn make_habit(id: String, name: &str) -> Result<Habit, CliError> {
    Ok(Habit {
        id,
        name: validate_habit_name(name)?,
        goal: Goal::default(),
    })
}

/// Partial goal change; unset fields are left alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalUpdate {
    pub goal_type: Option<GoalType>,
    pub days_per_week: Option<u32>,
    pub daily_minutes: Option<u32>,
}

impl GoalUpdate {
    pub fn is_empty(&self) -> bool {
        self.goal_type.is_none() && self.days_per_week.is_none() && self.daily_minutes.is_none()
    }
}

pub fn apply_goal_update(habit: &mut Habit, update: GoalUpdate) {
    if let Some(t) = update.goal_type {
        habit.goal.set_goal_type(t);
    }
    if let Some(d) = update.days_per_week {
        habit.goal.set_days_per_week(d);
    }
    if let Some(m) = update.daily_minutes {
        habit.goal.set_daily_minutes(m);
    }
}

/// Removes the habit only. Its logs stay behind and show up as
/// [`UNKNOWN_HABIT`] in listings.
pub fn delete_habit(db: &mut Db, idx: usize) -> Habit {
    let removed = db.habits.remove(idx);
    let orphaned = db.logs.iter().filter(|l| l.habit_id == removed.id).count();
    tracing::info!(habit_id = %removed.id, orphaned, "habit deleted");
    removed
}

pub fn habit_name_or_unknown<'a>(habits: &'a [Habit], habit_id: &str) -> &'a str {
    habits
        .iter()
        .find(|h| h.id == habit_id)
        .map(|h| h.name.as_str())
        .unwrap_or(UNKNOWN_HABIT)
}

pub fn goal_summary(habit: &Habit) -> String {
    let goal = &habit.goal;
    match goal.goal_type() {
        GoalType::Days if goal.is_every_day() => "every day".to_string(),
        GoalType::Days => format!("{} days/week", goal.days_per_week()),
        GoalType::Time if goal.is_every_day() => {
            format!("{}/day", format_minutes(goal.daily_goal_minutes()))
        }
        GoalType::Time => format!(
            "{} days/week, {}/session",
            goal.days_per_week(),
            format_minutes(goal.daily_goal_minutes())
        ),
    }
}
