//! Habit tracking with time and frequency goals.
//!
//! The engine (`goal`, `resolve`, `aggregate`, `progress`, `history`) is pure
//! and takes the reference instant and [`date::Calendar`] explicitly; `db`,
//! `habits`, `logs`, `alarms` and `export` are the edges the `habit` binary
//! drives.

pub mod aggregate;
pub mod alarms;
pub mod date;
pub mod db;
pub mod error;
pub mod export;
pub mod goal;
pub mod habits;
pub mod history;
pub mod logs;
pub mod model;
pub mod output;
pub mod period;
pub mod progress;
pub mod resolve;
