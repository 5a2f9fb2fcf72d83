use crate::goal::Goal;

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Db {
    pub version: u32,
    pub meta: Meta,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub logs: Vec<HabitLog>,
    #[serde(default)]
    pub alarms: Vec<Alarm>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Meta {
    pub next_habit_number: u32,
    #[serde(default = "first_number")]
    pub next_log_number: u32,
    #[serde(default = "first_number")]
    pub next_alarm_number: u32,
}

fn first_number() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub goal: Goal,
}

/// One completion (or explicit skip). Never mutated after creation.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct HabitLog {
    pub id: String,
    /// Lookup only; the habit may have been deleted since.
    pub habit_id: String,
    #[serde(default)]
    pub note: Option<String>,
    /// Milliseconds since the Unix epoch (UTC).
    pub start_time: i64,
    /// Milliseconds since the Unix epoch (UTC).
    pub end_time: i64,
    #[serde(default)]
    pub actual_duration_minutes: Option<u32>,
    /// "HH:MM" of the alarm that prompted this log.
    #[serde(default)]
    pub alarm_time: Option<String>,
    /// Local "YYYY-MM-DD" the log is attributed to.
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub skipped: bool,
}

impl HabitLog {
    /// Minutes that count toward goals: zero for skipped logs.
    pub fn counted_minutes(&self) -> u32 {
        if self.skipped {
            0
        } else {
            self.actual_duration_minutes.unwrap_or(0)
        }
    }

    /// Wall-clock time between prompt and submission, never negative.
    pub fn elapsed_ms(&self) -> i64 {
        (self.end_time - self.start_time).max(0)
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Alarm {
    pub id: String,
    /// "HH:MM", 24h.
    pub time: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub habit_id: Option<String>,
    /// Suggested `actual_duration_minutes` for logs created from this alarm.
    #[serde(default)]
    pub timer_duration_minutes: Option<u32>,
}

pub fn default_db() -> Db {
    Db {
        version: 1,
        meta: Meta {
            next_habit_number: 1,
            next_log_number: 1,
            next_alarm_number: 1,
        },
        habits: Vec::new(),
        logs: Vec::new(),
        alarms: Vec::new(),
    }
}
