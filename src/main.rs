use clap::{Args, Parser, Subcommand, ValueEnum};
use habit_progress::alarms::{
    add_alarm, list_alarms, prefill_from_alarm, remove_alarm, select_alarm_index, NewAlarm,
};
use habit_progress::date::{
    parse_date, parse_instant, parse_utc_offset, system_now_ms, Calendar, WeekStart, Zone,
};
use habit_progress::db::{read_db, resolve_db_path, update_db};
use habit_progress::error::CliError;
use habit_progress::export::{history_csv, log_export_rows, logs_csv, write_export};
use habit_progress::goal::{GoalType, MAX_DAILY_MINUTES};
use habit_progress::habits::{
    apply_goal_update, delete_habit, ensure_unique_name, goal_summary, habit_name_or_unknown,
    list_habits, make_habit, next_habit_id, select_habit_index, validate_habit_name, GoalUpdate,
};
use habit_progress::history::build_history_records;
use habit_progress::logs::{delete_log, format_duration, is_handled_on, list_logs, record_log, NewLog};
use habit_progress::model::{Alarm, Habit, HabitLog};
use habit_progress::output::{
    format_minutes, print_json, render_progress_bar, render_simple_table,
    stable_to_string_pretty, Styler,
};
use habit_progress::period::Period;
use habit_progress::progress::{
    annual_summary, available_years, build_progress, log_counts, minutes_by_habit, LogCounts,
};
use habit_progress::resolve::Unit;
use tracing_subscriber::EnvFilter;

const BAR_WIDTH: usize = 10;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Format {
    Table,
    Json,
    Csv,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum PeriodArg {
    Day,
    Week,
    Month,
    Year,
}

impl From<PeriodArg> for Period {
    fn from(p: PeriodArg) -> Self {
        match p {
            PeriodArg::Day => Period::Day,
            PeriodArg::Week => Period::Week,
            PeriodArg::Month => Period::Month,
            PeriodArg::Year => Period::Year,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum GoalTypeArg {
    /// Minutes per day
    Time,
    /// Days per week
    Days,
}

impl From<GoalTypeArg> for GoalType {
    fn from(t: GoalTypeArg) -> Self {
        match t {
            GoalTypeArg::Time => GoalType::Time,
            GoalTypeArg::Days => GoalType::Days,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum WeekStartArg {
    Sunday,
    Monday,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum ExportKind {
    History,
    Logs,
}

#[derive(Parser, Debug)]
#[command(name = "habit", version, about = "Local habit tracking with time and frequency goals")]
struct Cli {
    /// Overrides the DB path for this invocation.
    #[arg(long, global = true)]
    db: Option<String>,

    /// Overrides the reference instant (RFC3339 with offset) for deterministic output/testing.
    #[arg(long, global = true)]
    now: Option<String>,

    /// Fixed UTC offset (e.g. +09:00) used for local dates instead of the system zone.
    #[arg(long, global = true)]
    utc_offset: Option<String>,

    #[arg(long, global = true, value_enum)]
    week_start: Option<WeekStartArg>,

    /// Output format. Every command supports table/json. `export` supports json/csv.
    #[arg(long, global = true, value_enum, default_value = "table")]
    format: Format,

    /// Disables ANSI color output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Add(AddArgs),
    List,
    Show(SelectorArgs),
    /// Changes a habit's goal or name.
    Goal(GoalArgs),
    /// Deletes a habit. Its logs are kept.
    Delete(SelectorArgs),
    /// Records a completion (or a skip).
    Log(LogArgs),
    /// Deletes a single log by id.
    Unlog(UnlogArgs),
    Logs(LogsArgs),
    Alarm(AlarmArgs),
    /// Which habits were handled today.
    Today,
    /// Goal vs actual per habit for a day, week, month or year.
    Progress(ProgressArgs),
    /// Yearly minutes against daily goal x 365.
    Summary(YearArgs),
    /// Per-log rows with running day/week/month/year totals.
    History,
    Export(ExportArgs),
}

#[derive(Args, Debug)]
struct AddArgs {
    name: String,

    #[arg(long = "type", value_enum, default_value = "time")]
    goal_type: GoalTypeArg,

    /// 1-7
    #[arg(long, default_value_t = 7)]
    days_per_week: u32,

    /// Minutes per active day, 1-1440
    #[arg(long, default_value_t = 30)]
    minutes: u32,
}

#[derive(Args, Debug)]
struct SelectorArgs {
    /// Habit selector: exact id (h0001), exact name or unique name prefix (case-insensitive)
    habit: String,
}

#[derive(Args, Debug)]
struct GoalArgs {
    /// Habit selector: exact id (h0001), exact name or unique name prefix (case-insensitive)
    habit: String,

    #[arg(long = "type", value_enum)]
    goal_type: Option<GoalTypeArg>,

    #[arg(long)]
    days_per_week: Option<u32>,

    #[arg(long)]
    minutes: Option<u32>,

    #[arg(long)]
    rename: Option<String>,
}

#[derive(Args, Debug)]
struct LogArgs {
    /// Habit selector; optional when --alarm names a habit
    habit: Option<String>,

    /// Log from an alarm: pre-fills habit, alarm time, start time and minutes
    #[arg(long)]
    alarm: Option<String>,

    #[arg(long)]
    minutes: Option<u32>,

    #[arg(long)]
    note: Option<String>,

    /// Marks the habit as handled without counting toward goals
    #[arg(long)]
    skip: bool,

    /// When the habit was started (RFC3339 with offset)
    #[arg(long)]
    start: Option<String>,

    /// Local date (YYYY-MM-DD) the log belongs to
    #[arg(long)]
    date: Option<String>,
}

#[derive(Args, Debug)]
struct UnlogArgs {
    log_id: String,
}

#[derive(Args, Debug)]
struct LogsArgs {
    /// Optional habit selector
    habit: Option<String>,
}

#[derive(Args, Debug)]
struct AlarmArgs {
    #[command(subcommand)]
    command: AlarmCommand,
}

#[derive(Subcommand, Debug)]
enum AlarmCommand {
    Add(AlarmAddArgs),
    List,
    Remove(AlarmRemoveArgs),
}

#[derive(Args, Debug)]
struct AlarmAddArgs {
    /// 24h "HH:MM"
    time: String,

    #[arg(long)]
    habit: Option<String>,

    /// Default minutes for logs created from this alarm
    #[arg(long)]
    timer: Option<u32>,

    #[arg(long)]
    label: Option<String>,
}

#[derive(Args, Debug)]
struct AlarmRemoveArgs {
    alarm_id: String,
}

#[derive(Args, Debug)]
struct ProgressArgs {
    #[arg(long, value_enum, default_value = "week")]
    period: PeriodArg,

    /// Selected year (defaults to the current one)
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Args, Debug)]
struct YearArgs {
    /// Selected year (defaults to the current one)
    #[arg(long)]
    year: Option<i32>,
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[arg(long, value_enum, default_value = "history")]
    kind: ExportKind,

    /// Output file (stdout when omitted)
    #[arg(long)]
    out: Option<String>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(c) => c,
        Err(e) => {
            let _ = e.print();
            std::process::exit(if e.use_stderr() { 2 } else { 0 });
        }
    };

    init_tracing();

    let exit = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e);
            e.exit_code
        }
    };

    std::process::exit(exit);
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("HABIT_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_line(s: &str) {
    println!("{}", s);
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn resolve_now(cli_now: Option<&str>) -> Result<i64, CliError> {
    if let Some(t) = cli_now {
        return parse_instant(t, "now");
    }
    if let Some(t) = env_value("HABIT_NOW") {
        return parse_instant(&t, "now");
    }
    Ok(system_now_ms())
}

fn resolve_calendar(
    cli_offset: Option<&str>,
    cli_week_start: Option<WeekStartArg>,
) -> Result<Calendar, CliError> {
    let zone = match cli_offset.map(str::to_string).or_else(|| env_value("HABIT_UTC_OFFSET")) {
        Some(o) => Zone::Fixed(parse_utc_offset(&o)?),
        None => Zone::Local,
    };

    let week_start = match cli_week_start {
        Some(WeekStartArg::Sunday) => WeekStart::Sunday,
        Some(WeekStartArg::Monday) => WeekStart::Monday,
        None => match env_value("HABIT_WEEK_START") {
            None => WeekStart::default(),
            Some(v) => match v.to_lowercase().as_str() {
                "sunday" => WeekStart::Sunday,
                "monday" => WeekStart::Monday,
                _ => return Err(CliError::usage(format!("Invalid week start: {}", v))),
            },
        },
    };

    Ok(Calendar::new(zone, week_start))
}

fn resolve_color_enabled(no_color_flag: bool) -> bool {
    if no_color_flag {
        return false;
    }
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    true
}

fn ensure_format_supported(format: Format, allow_csv: bool) -> Result<(), CliError> {
    if format == Format::Csv && !allow_csv {
        return Err(CliError::usage(
            "--format csv is only supported by `habit export`",
        ));
    }
    Ok(())
}

fn resolve_year(year: Option<i32>, now: i64, cal: &Calendar) -> Result<i32, CliError> {
    match year {
        None => Ok(cal.local_year(now)),
        Some(y) if (1..=9999).contains(&y) => Ok(y),
        Some(y) => Err(CliError::usage(format!("Invalid year: {}", y))),
    }
}

fn check_minutes(minutes: Option<u32>, label: &str) -> Result<(), CliError> {
    match minutes {
        Some(m) if m > MAX_DAILY_MINUTES => Err(CliError::usage(format!(
            "Invalid {}: {} (max {})",
            label, m, MAX_DAILY_MINUTES
        ))),
        _ => Ok(()),
    }
}

fn check_days_per_week(days: Option<u32>) -> Result<(), CliError> {
    match days {
        Some(d) if !(1..=7).contains(&d) => Err(CliError::usage(format!(
            "Invalid days per week: {} (expected 1-7)",
            d
        ))),
        _ => Ok(()),
    }
}

fn fmt_amount(value: u32, unit: Unit) -> String {
    match unit {
        Unit::Minutes => format_minutes(value),
        Unit::Days if value == 1 => "1 day".to_string(),
        Unit::Days => format!("{} days", value),
    }
}

fn fmt_counts(c: &LogCounts) -> String {
    format!(
        "today {} / week {} / month {} / year {}",
        c.today, c.week, c.month, c.year
    )
}

fn habit_row(h: &Habit) -> Vec<String> {
    vec![
        h.id.clone(),
        h.name.clone(),
        h.goal.goal_type().as_str().to_string(),
        goal_summary(h),
        format_minutes(h.goal.weekly_goal_minutes()),
    ]
}

const HABIT_HEADERS: [&str; 5] = ["id", "name", "type", "goal", "weekly"];

fn alarm_row(a: &Alarm, habits: &[Habit]) -> Vec<String> {
    vec![
        a.id.clone(),
        a.time.clone(),
        a.habit_id
            .as_deref()
            .map(|id| habit_name_or_unknown(habits, id).to_string())
            .unwrap_or_else(|| "-".to_string()),
        a.timer_duration_minutes
            .map(format_minutes)
            .unwrap_or_else(|| "-".to_string()),
        a.label.clone().unwrap_or_default(),
    ]
}

fn log_row(l: &HabitLog, habits: &[Habit], cal: &Calendar) -> Vec<String> {
    let at = cal.local_datetime(l.end_time);
    vec![
        l.id.clone(),
        l.date.clone().unwrap_or_else(|| at.format("%Y-%m-%d").to_string()),
        at.format("%H:%M").to_string(),
        habit_name_or_unknown(habits, &l.habit_id).to_string(),
        if l.skipped {
            "skipped".to_string()
        } else {
            l.actual_duration_minutes
                .map(format_minutes)
                .unwrap_or_else(|| "-".to_string())
        },
        format_duration(l.elapsed_ms()),
        l.note.clone().unwrap_or_default(),
    ]
}

fn run(cli: Cli) -> Result<(), CliError> {
    let db_path = resolve_db_path(cli.db.as_deref())?;
    let now = resolve_now(cli.now.as_deref())?;
    let cal = resolve_calendar(cli.utc_offset.as_deref(), cli.week_start)?;

    let styler = Styler::new(resolve_color_enabled(cli.no_color));

    match cli.command {
        Command::Add(args) => {
            ensure_format_supported(cli.format, false)?;
            check_days_per_week(Some(args.days_per_week))?;
            check_minutes(Some(args.minutes), "minutes")?;
            if args.minutes == 0 {
                return Err(CliError::usage("Invalid minutes: 0"));
            }

            let created = update_db(&db_path, |db| {
                let name = validate_habit_name(&args.name)?;
                ensure_unique_name(db, &name, None)?;
                let id = next_habit_id(db);
                let mut habit = make_habit(id, &name)?;
                apply_goal_update(
                    &mut habit,
                    GoalUpdate {
                        goal_type: Some(args.goal_type.into()),
                        days_per_week: Some(args.days_per_week),
                        daily_minutes: Some(args.minutes),
                    },
                );
                db.habits.push(habit.clone());
                tracing::info!(habit_id = %habit.id, "habit added");
                Ok(habit)
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                }
                print_json(&Out { habit: created })?;
            } else {
                print_line(&render_simple_table(&HABIT_HEADERS, &[habit_row(&created)]));
            }

            Ok(())
        }

        Command::List => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let habits = list_habits(&db);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habits: Vec<Habit>,
                }
                print_json(&Out { habits })?;
            } else {
                let rows: Vec<Vec<String>> = habits.iter().map(habit_row).collect();
                print_line(&render_simple_table(&HABIT_HEADERS, &rows));
            }

            Ok(())
        }

        Command::Show(args) => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let idx = select_habit_index(&db, &args.habit)?;
            let habit = db.habits[idx].clone();
            let counts = log_counts(&db.logs, &habit.id, now, &cal);
            let handled_today = is_handled_on(&db.logs, &habit.id, cal.local_date(now), &cal);
            let logs = list_logs(&db, Some(&habit.id));
            let alarms: Vec<Alarm> = list_alarms(&db)
                .into_iter()
                .filter(|a| a.habit_id.as_deref() == Some(habit.id.as_str()))
                .collect();

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                    handled_today: bool,
                    counts: LogCounts,
                    alarms: Vec<Alarm>,
                    logs: Vec<HabitLog>,
                }
                print_json(&Out {
                    habit,
                    handled_today,
                    counts,
                    alarms,
                    logs,
                })?;
            } else {
                let g = &habit.goal;
                print_line(&format!("{} ({})", habit.name, habit.id));
                print_line(&format!("goal: {} ({})", goal_summary(&habit), g.goal_type().as_str()));
                print_line(&format!(
                    "targets: weekly {} / monthly {} / yearly {}",
                    format_minutes(g.weekly_goal_minutes()),
                    format_minutes(g.monthly_goal_minutes()),
                    format_minutes(g.yearly_goal_minutes())
                ));
                print_line(&format!("logs: {}", fmt_counts(&counts)));
                print_line(&format!(
                    "handled today: {}",
                    if handled_today {
                        styler.green("yes")
                    } else {
                        "no".to_string()
                    }
                ));
                if !alarms.is_empty() {
                    print_line("alarms:");
                    for a in alarms.iter() {
                        print_line(&format!("- {} {}", a.id, a.time));
                    }
                }
                if !logs.is_empty() {
                    print_line("recent:");
                    for l in logs.iter().rev().take(5) {
                        let row = log_row(l, &db.habits, &cal);
                        print_line(&format!("- {} {} {} {}", row[0], row[1], row[2], row[4]));
                    }
                }
            }

            Ok(())
        }

        Command::Goal(args) => {
            ensure_format_supported(cli.format, false)?;
            check_days_per_week(args.days_per_week)?;
            check_minutes(args.minutes, "minutes")?;

            let update = GoalUpdate {
                goal_type: args.goal_type.map(GoalType::from),
                days_per_week: args.days_per_week,
                daily_minutes: args.minutes,
            };
            if update.is_empty() && args.rename.is_none() {
                return Err(CliError::usage(
                    "Nothing to change: pass --type, --days-per-week, --minutes or --rename",
                ));
            }

            let updated = update_db(&db_path, |db| {
                let idx = select_habit_index(db, &args.habit)?;
                if let Some(new_name) = args.rename.as_deref() {
                    let name = validate_habit_name(new_name)?;
                    let id = db.habits[idx].id.clone();
                    ensure_unique_name(db, &name, Some(&id))?;
                    db.habits[idx].name = name;
                }
                let habit = &mut db.habits[idx];
                apply_goal_update(habit, update);
                tracing::info!(habit_id = %habit.id, "habit goal updated");
                Ok(habit.clone())
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                }
                print_json(&Out { habit: updated })?;
            } else {
                print_line(&render_simple_table(&HABIT_HEADERS, &[habit_row(&updated)]));
            }

            Ok(())
        }

        Command::Delete(args) => {
            ensure_format_supported(cli.format, false)?;

            let (removed, kept_logs) = update_db(&db_path, |db| {
                let idx = select_habit_index(db, &args.habit)?;
                let removed = delete_habit(db, idx);
                let kept = db.logs.iter().filter(|l| l.habit_id == removed.id).count();
                Ok((removed, kept))
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    habit: Habit,
                    kept_logs: usize,
                }
                print_json(&Out {
                    habit: removed,
                    kept_logs,
                })?;
            } else {
                print_line(&format!(
                    "Deleted: {} ({}), {} log(s) kept",
                    removed.name, removed.id, kept_logs
                ));
            }

            Ok(())
        }

        Command::Log(args) => {
            ensure_format_supported(cli.format, false)?;
            check_minutes(args.minutes, "minutes")?;

            let start = args
                .start
                .as_deref()
                .map(|s| parse_instant(s, "start"))
                .transpose()?;
            let date = args
                .date
                .as_deref()
                .map(|d| parse_date(d, "date"))
                .transpose()?;

            let (log, habit_name, counts) = update_db(&db_path, |db| {
                let prefill = match args.alarm.as_deref() {
                    Some(alarm_id) => {
                        let idx = select_alarm_index(db, alarm_id)?;
                        Some(prefill_from_alarm(&db.alarms[idx], now, &cal)?)
                    }
                    None => None,
                };

                let habit_idx = match (
                    args.habit.as_deref(),
                    prefill.as_ref().and_then(|p| p.habit_id.as_deref()),
                ) {
                    (Some(selector), _) => select_habit_index(db, selector)?,
                    (None, Some(id)) => db
                        .habits
                        .iter()
                        .position(|h| h.id == id)
                        .ok_or_else(|| CliError::not_found(format!("Habit not found: {}", id)))?,
                    (None, None) => return Err(CliError::usage("Habit selector is required")),
                };
                let habit = db.habits[habit_idx].clone();

                let new = NewLog {
                    habit_id: habit.id.clone(),
                    note: args.note.clone(),
                    start_time: start
                        .or_else(|| prefill.as_ref().map(|p| p.start_time))
                        .unwrap_or(now),
                    end_time: now,
                    actual_duration_minutes: args
                        .minutes
                        .or_else(|| prefill.as_ref().and_then(|p| p.minutes)),
                    alarm_time: prefill.as_ref().map(|p| p.alarm_time.clone()),
                    date,
                    skipped: args.skip,
                };
                let log = record_log(db, new, &cal);
                let counts = log_counts(&db.logs, &habit.id, now, &cal);
                Ok((log, habit.name, counts))
            })?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    log: HabitLog,
                    counts: LogCounts,
                }
                print_json(&Out { log, counts })?;
            } else {
                let what = if log.skipped {
                    "Skipped".to_string()
                } else {
                    match log.actual_duration_minutes {
                        Some(m) => format!("Logged {}", format_minutes(m)),
                        None => "Logged".to_string(),
                    }
                };
                print_line(&format!(
                    "{}: {} ({}) on {}",
                    what,
                    habit_name,
                    log.id,
                    log.date.clone().unwrap_or_default()
                ));
                print_line(&styler.gray(&fmt_counts(&counts)));
            }

            Ok(())
        }

        Command::Unlog(args) => {
            ensure_format_supported(cli.format, false)?;

            let removed = update_db(&db_path, |db| delete_log(db, &args.log_id))?;

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    log: HabitLog,
                }
                print_json(&Out { log: removed })?;
            } else {
                print_line(&format!("Deleted log: {}", removed.id));
            }

            Ok(())
        }

        Command::Logs(args) => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let habit_id = match args.habit.as_deref() {
                Some(sel) => Some(db.habits[select_habit_index(&db, sel)?].id.clone()),
                None => None,
            };
            let logs = list_logs(&db, habit_id.as_deref());

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    logs: Vec<HabitLog>,
                }
                print_json(&Out { logs })?;
            } else {
                let rows: Vec<Vec<String>> =
                    logs.iter().map(|l| log_row(l, &db.habits, &cal)).collect();
                print_line(&render_simple_table(
                    &["id", "date", "time", "habit", "minutes", "elapsed", "note"],
                    &rows,
                ));
            }

            Ok(())
        }

        Command::Alarm(args) => {
            ensure_format_supported(cli.format, false)?;

            match args.command {
                AlarmCommand::Add(a) => {
                    let (alarm, habits) = update_db(&db_path, |db| {
                        let habit_id = match a.habit.as_deref() {
                            Some(sel) => Some(db.habits[select_habit_index(db, sel)?].id.clone()),
                            None => None,
                        };
                        let alarm = add_alarm(
                            db,
                            NewAlarm {
                                time: a.time.clone(),
                                label: a.label.clone(),
                                habit_id,
                                timer_duration_minutes: a.timer,
                            },
                        )?;
                        Ok((alarm, db.habits.clone()))
                    })?;

                    if cli.format == Format::Json {
                        #[derive(serde::Serialize)]
                        struct Out {
                            alarm: Alarm,
                        }
                        print_json(&Out { alarm })?;
                    } else {
                        print_line(&render_simple_table(
                            &["id", "time", "habit", "timer", "label"],
                            &[alarm_row(&alarm, &habits)],
                        ));
                    }
                }

                AlarmCommand::List => {
                    let db = read_db(&db_path)?;
                    let alarms = list_alarms(&db);

                    if cli.format == Format::Json {
                        #[derive(serde::Serialize)]
                        struct Out {
                            alarms: Vec<Alarm>,
                        }
                        print_json(&Out { alarms })?;
                    } else {
                        let rows: Vec<Vec<String>> =
                            alarms.iter().map(|a| alarm_row(a, &db.habits)).collect();
                        print_line(&render_simple_table(
                            &["id", "time", "habit", "timer", "label"],
                            &rows,
                        ));
                    }
                }

                AlarmCommand::Remove(a) => {
                    let removed = update_db(&db_path, |db| remove_alarm(db, &a.alarm_id))?;

                    if cli.format == Format::Json {
                        #[derive(serde::Serialize)]
                        struct Out {
                            alarm: Alarm,
                        }
                        print_json(&Out { alarm: removed })?;
                    } else {
                        print_line(&format!("Removed alarm: {} ({})", removed.id, removed.time));
                    }
                }
            }

            Ok(())
        }

        Command::Today => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let habits = list_habits(&db);
            let today = cal.local_date(now);
            let rows = build_progress(
                &habits,
                &db.logs,
                Period::Day,
                now,
                cal.local_year(now),
                &cal,
            );

            #[derive(serde::Serialize)]
            struct TodayRow {
                habit_id: String,
                name: String,
                handled: bool,
                goal: u32,
                actual: u32,
                unit: Unit,
                percent: u32,
            }

            let today_rows: Vec<TodayRow> = rows
                .into_iter()
                .map(|r| TodayRow {
                    handled: is_handled_on(&db.logs, &r.habit_id, today, &cal),
                    habit_id: r.habit_id,
                    name: r.name,
                    goal: r.goal,
                    actual: r.actual,
                    unit: r.unit,
                    percent: r.percent,
                })
                .collect();

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    date: String,
                    habits: Vec<TodayRow>,
                }
                print_json(&Out {
                    date: today.format("%Y-%m-%d").to_string(),
                    habits: today_rows,
                })?;
            } else {
                let table_rows: Vec<Vec<String>> = today_rows
                    .iter()
                    .map(|r| {
                        vec![
                            r.habit_id.clone(),
                            r.name.clone(),
                            if r.handled {
                                styler.green("done")
                            } else {
                                "-".to_string()
                            },
                            format!("{}/{}", fmt_amount(r.actual, r.unit), fmt_amount(r.goal, r.unit)),
                            styler.percent(r.percent, &format!("{}%", r.percent)),
                        ]
                    })
                    .collect();
                print_line(&format!("Today: {}", today.format("%Y-%m-%d")));
                print_line(&render_simple_table(
                    &["id", "name", "handled", "progress", "percent"],
                    &table_rows,
                ));
            }

            Ok(())
        }

        Command::Progress(args) => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let year = resolve_year(args.year, now, &cal)?;
            let period = Period::from(args.period);
            let habits = list_habits(&db);
            let rows = build_progress(&habits, &db.logs, period, now, year, &cal);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    period: Period,
                    year: i32,
                    habits: Vec<habit_progress::progress::ProgressRow>,
                }
                print_json(&Out {
                    period,
                    year,
                    habits: rows,
                })?;
            } else {
                let table_rows: Vec<Vec<String>> = rows
                    .iter()
                    .map(|r| {
                        vec![
                            r.habit_id.clone(),
                            r.name.clone(),
                            fmt_amount(r.actual, r.unit),
                            fmt_amount(r.goal, r.unit),
                            styler.percent(r.percent, &render_progress_bar(r.percent, BAR_WIDTH)),
                            format!("{}%", r.percent),
                        ]
                    })
                    .collect();
                print_line(&format!("Progress: {} ({})", period.as_str(), year));
                print_line(&render_simple_table(
                    &["id", "name", "actual", "goal", "progress", "percent"],
                    &table_rows,
                ));
            }

            Ok(())
        }

        Command::Summary(args) => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let year = resolve_year(args.year, now, &cal)?;
            let habits = list_habits(&db);
            let annual = annual_summary(&habits, &db.logs, year, &cal);
            let by_habit = minutes_by_habit(&habits, &db.logs, year, &cal);
            let years = available_years(&db.logs, now, &cal);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    year: i32,
                    available_years: Vec<i32>,
                    habits: Vec<habit_progress::progress::AnnualRow>,
                    minutes_by_habit: Vec<habit_progress::progress::HabitMinutes>,
                }
                print_json(&Out {
                    year,
                    available_years: years,
                    habits: annual,
                    minutes_by_habit: by_habit,
                })?;
            } else {
                let total: u32 = by_habit.iter().map(|m| m.minutes).sum();
                let share = |habit_id: &str| {
                    by_habit
                        .iter()
                        .find(|m| m.habit_id == habit_id)
                        .map(|m| {
                            let pct = (m.minutes as f64 / total.max(1) as f64 * 100.0).round();
                            format!("{}%", pct as u32)
                        })
                        .unwrap_or_else(|| "-".to_string())
                };
                let table_rows: Vec<Vec<String>> = annual
                    .iter()
                    .map(|r| {
                        vec![
                            r.habit_id.clone(),
                            r.name.clone(),
                            format_minutes(r.actual_minutes),
                            format_minutes(r.goal_minutes),
                            styler.percent(r.percent, &render_progress_bar(r.percent, BAR_WIDTH)),
                            format!("{}%", r.percent),
                            share(&r.habit_id),
                        ]
                    })
                    .collect();
                print_line(&format!("Summary: {}", year));
                print_line(&render_simple_table(
                    &["id", "name", "actual", "goal", "progress", "percent", "share"],
                    &table_rows,
                ));
                let years_line = years
                    .iter()
                    .map(|y| y.to_string())
                    .collect::<Vec<String>>()
                    .join(", ");
                print_line(&styler.gray(&format!("years: {}", years_line)));
            }

            Ok(())
        }

        Command::History => {
            ensure_format_supported(cli.format, false)?;

            let db = read_db(&db_path)?;
            let records = build_history_records(&db.logs, &db.habits, &cal);

            if cli.format == Format::Json {
                #[derive(serde::Serialize)]
                struct Out {
                    records: Vec<habit_progress::history::HistoryRecord>,
                }
                print_json(&Out { records })?;
            } else {
                let rows: Vec<Vec<String>> = records
                    .iter()
                    .map(|r| {
                        vec![
                            r.date.clone(),
                            r.alarm_time.clone(),
                            r.habit_name.clone(),
                            r.actual_duration.to_string(),
                            format!("{}/{}", r.daily_actual, r.daily_goal),
                            format!("{}/{}", r.weekly_actual, r.weekly_goal),
                            format!("{}/{}", r.monthly_actual, r.monthly_goal),
                            format!("{}/{}", r.yearly_actual, r.yearly_goal),
                        ]
                    })
                    .collect();
                print_line(&render_simple_table(
                    &["date", "alarm", "habit", "minutes", "day", "week", "month", "year"],
                    &rows,
                ));
            }

            Ok(())
        }

        Command::Export(args) => {
            if cli.format == Format::Table {
                return Err(CliError::usage("export requires --format csv or --format json"));
            }

            let db = read_db(&db_path)?;
            let content = match (args.kind, cli.format) {
                (ExportKind::History, fmt) => {
                    let records = build_history_records(&db.logs, &db.habits, &cal);
                    if fmt == Format::Csv {
                        history_csv(&records)
                    } else {
                        #[derive(serde::Serialize)]
                        struct Out {
                            records: Vec<habit_progress::history::HistoryRecord>,
                        }
                        stable_to_string_pretty(&Out { records })
                            .map_err(|_| CliError::io("JSON encode error"))?
                            + "\n"
                    }
                }
                (ExportKind::Logs, fmt) => {
                    let rows = log_export_rows(&list_logs(&db, None), &db.habits, &cal);
                    if fmt == Format::Csv {
                        logs_csv(&rows)
                    } else {
                        #[derive(serde::Serialize)]
                        struct Out {
                            logs: Vec<habit_progress::export::LogExportRow>,
                        }
                        stable_to_string_pretty(&Out { logs: rows })
                            .map_err(|_| CliError::io("JSON encode error"))?
                            + "\n"
                    }
                }
            };

            write_export(args.out.as_deref(), &content)?;
            if let Some(out) = args.out.as_deref() {
                eprintln!("Exported to {}", out);
            }

            Ok(())
        }
    }
}
