use crate::goal::{GoalType, WEEKS_PER_MONTH, WEEKS_PER_YEAR};
use crate::model::Habit;
use crate::period::Period;

/// What a goal (and the matching actual) is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Minutes,
    Days,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Minutes => "minutes",
            Unit::Days => "days",
        }
    }
}

impl From<GoalType> for Unit {
    fn from(goal_type: GoalType) -> Self {
        match goal_type {
            GoalType::Time => Unit::Minutes,
            GoalType::Days => Unit::Days,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ResolvedGoal {
    pub value: u32,
    pub unit: Unit,
}

/// Target for `period`. Months are four weeks and years 52 weeks, whatever
/// the real calendar length.
pub fn resolve_goal(habit: &Habit, period: Period) -> ResolvedGoal {
    let goal = &habit.goal;
    let days = goal.days_per_week();
    match goal.goal_type() {
        GoalType::Days => ResolvedGoal {
            value: match period {
                Period::Day => 1,
                Period::Week => days,
                Period::Month => days * WEEKS_PER_MONTH,
                Period::Year => days * WEEKS_PER_YEAR,
            },
            unit: Unit::Days,
        },
        GoalType::Time => {
            let weekly = goal.daily_goal_minutes() * days;
            ResolvedGoal {
                value: match period {
                    Period::Day => goal.daily_goal_minutes(),
                    Period::Week => weekly,
                    Period::Month => weekly * WEEKS_PER_MONTH,
                    Period::Year => weekly * WEEKS_PER_YEAR,
                },
                unit: Unit::Minutes,
            }
        }
    }
}
