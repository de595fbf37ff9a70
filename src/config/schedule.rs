//! Refresh schedule expressions.
//!
//! Accepted forms:
//! - `@every <duration>` (e.g. `@every 30s`, `@every 1h 30m`)
//! - a bare duration (`500ms`, `30s`, `5m`, `2h`, `1m30s`)
//! - `@hourly`, `@daily`, `@weekly` (fixed intervals, not wall-clock aligned)
//! - a 6 or 7 field cron expression with seconds (`0 */5 * * * *`),
//!   evaluated in UTC

use chrono::{DateTime, Utc};
use cron::Schedule;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::config::ConfigError;

/// When the refresh loop fires.
#[derive(Debug, Clone)]
pub enum RefreshSchedule {
    /// Fixed period, first tick one period after start.
    Every(Duration),
    /// Wall-clock cron schedule.
    Cron { expr: String, schedule: Box<Schedule> },
}

impl RefreshSchedule {
    /// Time from now until the next refresh. `None` once a cron schedule
    /// has no future fire times left.
    pub fn next_delay(&self) -> Option<Duration> {
        self.next_fire(None).map(|(_, delay)| delay)
    }

    /// Next cron fire time strictly after both now and `last_fire`, with the
    /// delay until it. Fixed periods have no fire time and report the period.
    pub fn next_fire(&self, last_fire: Option<DateTime<Utc>>) -> Option<(Option<DateTime<Utc>>, Duration)> {
        match self {
            RefreshSchedule::Every(period) => Some((None, *period)),
            RefreshSchedule::Cron { schedule, .. } => {
                let now = Utc::now();
                let from = last_fire.map_or(now, |last| last.max(now));
                schedule
                    .after(&from)
                    .next()
                    .map(|at| (Some(at), (at - now).to_std().unwrap_or(Duration::ZERO)))
            }
        }
    }

    /// The fixed period, if this is not a cron schedule.
    pub fn period(&self) -> Option<Duration> {
        match self {
            RefreshSchedule::Every(period) => Some(*period),
            RefreshSchedule::Cron { .. } => None,
        }
    }
}

impl From<Duration> for RefreshSchedule {
    fn from(period: Duration) -> Self {
        RefreshSchedule::Every(period)
    }
}

impl fmt::Display for RefreshSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshSchedule::Every(period) => write!(f, "@every {}", humantime::format_duration(*period)),
            RefreshSchedule::Cron { expr, .. } => f.write_str(expr),
        }
    }
}

/// Parse a schedule expression.
pub fn parse_schedule(expr: &str) -> Result<RefreshSchedule, ConfigError> {
    let expr = expr.trim();

    let period = match expr {
        "@hourly" => Duration::from_secs(60 * 60),
        "@daily" | "@midnight" => Duration::from_secs(24 * 60 * 60),
        "@weekly" => Duration::from_secs(7 * 24 * 60 * 60),
        _ => {
            if let Some(rest) = expr.strip_prefix("@every") {
                parse_duration(rest.trim())?
            } else if expr.split_whitespace().count() > 1 {
                return parse_cron(expr);
            } else {
                parse_duration(expr)?
            }
        }
    };

    if period.is_zero() {
        return Err(ConfigError::InvalidSchedule(format!("schedule {expr:?} has a zero interval")));
    }
    Ok(RefreshSchedule::Every(period))
}

/// Parse a human-readable duration such as `30s` or `1h 30m`.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(input)
        .map_err(|e| ConfigError::InvalidSchedule(format!("invalid duration {input:?}: {e}")))
}

fn parse_cron(expr: &str) -> Result<RefreshSchedule, ConfigError> {
    let schedule = Schedule::from_str(expr)
        .map_err(|e| ConfigError::InvalidSchedule(format!("invalid cron expression {expr:?}: {e}")))?;

    if schedule.upcoming(Utc).next().is_none() {
        return Err(ConfigError::InvalidSchedule(format!("cron expression {expr:?} never fires")));
    }

    Ok(RefreshSchedule::Cron {
        expr: expr.to_string(),
        schedule: Box::new(schedule),
    })
}
