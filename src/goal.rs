//! Goal configuration of a habit.
//!
//! The authoritative inputs are `daily_goal_minutes` and `days_per_week`.
//! Weekly/monthly/yearly minute targets are cached alongside them and are only
//! ever written by [`Goal::recompute`], so they cannot drift from the inputs.

use serde::{Deserialize, Serialize};

pub const DEFAULT_DAYS_PER_WEEK: u32 = 7;
pub const DEFAULT_DAILY_MINUTES: u32 = 30;
pub const MAX_DAILY_MINUTES: u32 = 1440;

/// A month is always four weeks and a year 52 weeks of the weekly target.
pub const WEEKS_PER_MONTH: u32 = 4;
pub const WEEKS_PER_YEAR: u32 = 52;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Cumulative minutes actually spent.
    #[default]
    Time,
    /// Distinct calendar days with at least one non-skipped log.
    Days,
}

impl GoalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Time => "time",
            GoalType::Days => "days",
        }
    }
}

/// Minute targets derived from `(daily_goal_minutes, days_per_week)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalTargets {
    pub weekly_minutes: u32,
    pub monthly_minutes: u32,
    pub yearly_minutes: u32,
}

impl GoalTargets {
    pub fn compute(daily_goal_minutes: u32, days_per_week: u32) -> Self {
        let weekly = daily_goal_minutes * days_per_week;
        Self {
            weekly_minutes: weekly,
            monthly_minutes: weekly * WEEKS_PER_MONTH,
            yearly_minutes: weekly * WEEKS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredGoal", into = "StoredGoal")]
pub struct Goal {
    goal_type: GoalType,
    days_per_week: u32,
    daily_goal_minutes: u32,
    targets: GoalTargets,
}

impl Default for Goal {
    fn default() -> Self {
        Self::new(GoalType::Time, DEFAULT_DAYS_PER_WEEK, DEFAULT_DAILY_MINUTES)
    }
}

impl Goal {
    /// Builds a goal, clamping both inputs into their valid ranges.
    pub fn new(goal_type: GoalType, days_per_week: u32, daily_goal_minutes: u32) -> Self {
        let mut goal = Self {
            goal_type,
            days_per_week: clamp_days_per_week(days_per_week),
            daily_goal_minutes: clamp_daily_minutes(daily_goal_minutes),
            targets: GoalTargets::compute(0, 0),
        };
        goal.recompute();
        goal
    }

    pub fn goal_type(&self) -> GoalType {
        self.goal_type
    }

    pub fn days_per_week(&self) -> u32 {
        self.days_per_week
    }

    /// Only meaningful for [`GoalType::Time`], but always kept valid.
    pub fn daily_goal_minutes(&self) -> u32 {
        self.daily_goal_minutes
    }

    pub fn targets(&self) -> GoalTargets {
        self.targets
    }

    pub fn weekly_goal_minutes(&self) -> u32 {
        self.targets.weekly_minutes
    }

    pub fn monthly_goal_minutes(&self) -> u32 {
        self.targets.monthly_minutes
    }

    pub fn yearly_goal_minutes(&self) -> u32 {
        self.targets.yearly_minutes
    }

    pub fn is_every_day(&self) -> bool {
        self.days_per_week == 7
    }

    /// Changing the type never touches frequency or minutes.
    pub fn set_goal_type(&mut self, goal_type: GoalType) {
        self.goal_type = goal_type;
    }

    /// Clamped to `[1, 1440]`.
    pub fn set_daily_minutes(&mut self, minutes: u32) {
        self.daily_goal_minutes = clamp_daily_minutes(minutes);
        self.recompute();
    }

    /// Clamped to `[1, 7]`.
    pub fn set_days_per_week(&mut self, days: u32) {
        self.days_per_week = clamp_days_per_week(days);
        self.recompute();
    }

    fn recompute(&mut self) {
        self.targets = GoalTargets::compute(self.daily_goal_minutes, self.days_per_week);
    }
}

fn clamp_daily_minutes(minutes: u32) -> u32 {
    minutes.clamp(1, MAX_DAILY_MINUTES)
}

fn clamp_days_per_week(days: u32) -> u32 {
    days.clamp(1, 7)
}

/// On-disk shape. Cached targets are written for readers of the file but are
/// recomputed on load; zero or missing inputs fall back to the defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredGoal {
    #[serde(default)]
    goal_type: GoalType,
    #[serde(default)]
    days_per_week: Option<u32>,
    #[serde(default)]
    daily_goal_minutes: Option<u32>,
    #[serde(default)]
    weekly_goal_minutes: Option<u32>,
    #[serde(default)]
    monthly_goal_minutes: Option<u32>,
    #[serde(default)]
    yearly_goal_minutes: Option<u32>,
}

impl From<StoredGoal> for Goal {
    fn from(raw: StoredGoal) -> Self {
        let days = raw
            .days_per_week
            .filter(|d| *d > 0)
            .unwrap_or(DEFAULT_DAYS_PER_WEEK);
        let minutes = raw
            .daily_goal_minutes
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_DAILY_MINUTES);
        Goal::new(raw.goal_type, days, minutes)
    }
}

impl From<Goal> for StoredGoal {
    fn from(goal: Goal) -> Self {
        StoredGoal {
            goal_type: goal.goal_type,
            days_per_week: Some(goal.days_per_week),
            daily_goal_minutes: Some(goal.daily_goal_minutes),
            weekly_goal_minutes: Some(goal.targets.weekly_minutes),
            monthly_goal_minutes: Some(goal.targets.monthly_minutes),
            yearly_goal_minutes: Some(goal.targets.yearly_minutes),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_consistent(g: &Goal) {
        assert_eq!(g.weekly_goal_minutes(), g.daily_goal_minutes() * g.days_per_week());
        assert_eq!(g.monthly_goal_minutes(), g.weekly_goal_minutes() * 4);
        assert_eq!(g.yearly_goal_minutes(), g.weekly_goal_minutes() * 52);
    }

    #[test]
    fn default_goal_is_thirty_minutes_every_day() {
        let g = Goal::default();
        assert_eq!(g.goal_type(), GoalType::Time);
        assert_eq!(g.days_per_week(), 7);
        assert_eq!(g.daily_goal_minutes(), 30);
        assert_eq!(g.weekly_goal_minutes(), 210);
        assert_eq!(g.monthly_goal_minutes(), 840);
        assert_eq!(g.yearly_goal_minutes(), 10920);
    }

    #[test]
    fn mutations_keep_derived_targets_in_sync() {
        let mut g = Goal::default();
        g.set_daily_minutes(45);
        assert_consistent(&g);
        g.set_days_per_week(3);
        assert_consistent(&g);
        g.set_goal_type(GoalType::Days);
        assert_consistent(&g);
        assert_eq!(g.weekly_goal_minutes(), 135);
    }

    #[test]
    fn inputs_are_clamped() {
        let mut g = Goal::default();
        g.set_daily_minutes(0);
        assert_eq!(g.daily_goal_minutes(), 1);
        g.set_daily_minutes(5000);
        assert_eq!(g.daily_goal_minutes(), 1440);
        g.set_days_per_week(0);
        assert_eq!(g.days_per_week(), 1);
        g.set_days_per_week(9);
        assert_eq!(g.days_per_week(), 7);
        assert_consistent(&g);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut g = Goal::new(GoalType::Time, 5, 30);
        let before = g.clone();
        g.set_days_per_week(5);
        g.set_daily_minutes(30);
        assert_eq!(g, before);
    }

    #[test]
    fn switching_to_every_day_keeps_type() {
        let mut g = Goal::new(GoalType::Days, 3, 30);
        g.set_days_per_week(7);
        assert_eq!(g.goal_type(), GoalType::Days);
        assert!(g.is_every_day());
    }

    #[test]
    fn load_defaults_missing_fields_and_ignores_stale_cache() {
        let g: Goal = serde_json::from_str(r#"{"goal_type":"days"}"#).unwrap();
        assert_eq!(g.goal_type(), GoalType::Days);
        assert_eq!(g.days_per_week(), 7);
        assert_eq!(g.daily_goal_minutes(), 30);

        let g: Goal = serde_json::from_str(
            r#"{"days_per_week":5,"daily_goal_minutes":30,"weekly_goal_minutes":999}"#,
        )
        .unwrap();
        assert_eq!(g.goal_type(), GoalType::Time);
        assert_eq!(g.weekly_goal_minutes(), 150);
    }

    #[test]
    fn stored_shape_carries_cached_targets() {
        let v = serde_json::to_value(Goal::new(GoalType::Time, 5, 30)).unwrap();
        assert_eq!(v["goal_type"], "time");
        assert_eq!(v["weekly_goal_minutes"], 150);
        assert_eq!(v["monthly_goal_minutes"], 600);
        assert_eq!(v["yearly_goal_minutes"], 7800);
    }
}
