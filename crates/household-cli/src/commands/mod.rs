//! Subcommands and the parsing helpers they share.

pub mod chore;
pub mod config;
pub mod next_due;
pub mod person;
pub mod stats;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use clap::Args;
use household_core::chore::day_start;
use household_core::{FrequencyRecord, RecurrencePolicy};
use serde::Serialize;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> CmdResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Recurrence flags shared by `chore add` and `chore update`.
#[derive(Args, Debug, Default)]
pub struct PolicyArgs {
    /// Recurrence kind: daily, weekly, biweekly, monthly or custom
    #[arg(long)]
    pub every: Option<String>,
    /// Weekdays for weekly chores, e.g. "1,3,5" or "mon,wed,fri" (0 = Sunday)
    #[arg(long)]
    pub days: Option<String>,
    /// Interval in days for custom chores
    #[arg(long, allow_hyphen_values = true)]
    pub interval: Option<i64>,
    /// Full policy as JSON, e.g. '{"type":"weekly","daysOfWeek":[1,3]}'
    #[arg(long, conflicts_with_all = ["every", "days", "interval"])]
    pub policy: Option<String>,
}

impl PolicyArgs {
    /// The policy described by the flags, or `None` if none were given.
    pub fn to_policy(&self) -> Result<Option<RecurrencePolicy>, Box<dyn std::error::Error>> {
        if let Some(json) = &self.policy {
            return Ok(Some(json.parse()?));
        }
        let kind = match (&self.every, &self.days, &self.interval) {
            (Some(kind), _, _) => kind.trim().to_ascii_lowercase(),
            (None, Some(_), _) => "weekly".to_string(),
            (None, None, Some(_)) => "custom".to_string(),
            (None, None, None) => return Ok(None),
        };
        let record = FrequencyRecord {
            kind,
            days_of_week: self.days.as_deref().map(parse_weekdays).transpose()?,
            custom_days: self.interval,
        };
        Ok(Some(RecurrencePolicy::try_from(record)?))
    }
}

/// Weekday list as numbers (0 = Sunday) or names.
pub fn parse_weekdays(s: &str) -> Result<Vec<i64>, String> {
    split_list(s)
        .iter()
        .map(|part| {
            part.parse::<i64>().or_else(|_| {
                part.parse::<Weekday>()
                    .map(|d| i64::from(d.num_days_from_sunday()))
                    .map_err(|_| format!("invalid weekday: {part}"))
            })
        })
        .collect()
}

/// Comma-separated values, trimmed, empties dropped.
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

pub fn parse_date(s: &str, use_utc: bool) -> Result<NaiveDate, String> {
    match s.trim() {
        "today" => Ok(today(use_utc)),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d")
            .map_err(|e| format!("invalid date '{other}': {e}")),
    }
}

pub fn today(use_utc: bool) -> NaiveDate {
    if use_utc {
        Utc::now().date_naive()
    } else {
        Local::now().date_naive()
    }
}

/// Parse `now`, `today`, RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` or `YYYY-MM-DD`.
///
/// Times without an offset, and bare dates (taken as midnight), are read in
/// the configured zone.
pub fn parse_instant(s: &str, use_utc: bool) -> Result<DateTime<Utc>, String> {
    let s = s.trim();
    if s == "now" {
        return Ok(Utc::now());
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return local_to_utc(naive, use_utc);
        }
    }
    let date = parse_date(s, use_utc).map_err(|_| format!("invalid date/time '{s}'"))?;
    Ok(start_of(date, use_utc))
}

fn local_to_utc(naive: NaiveDateTime, use_utc: bool) -> Result<DateTime<Utc>, String> {
    if use_utc {
        return Ok(naive.and_utc());
    }
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| format!("{naive} does not exist in the local time zone"))
}

/// Midnight of `date` in the configured zone.
pub fn start_of(date: NaiveDate, use_utc: bool) -> DateTime<Utc> {
    if use_utc {
        day_start(&Utc, date)
    } else {
        day_start(&Local, date)
    }
}
