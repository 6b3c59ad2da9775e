use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, TimeDelta, Timelike, Utc};

/// Wire format of `due_date_utc`, e.g. `Fri 16 May 2025 23:59:59 +0000`
pub const DUE_FORMAT: &str = "%a %d %b %Y %H:%M:%S %z";

/// Tasks further out than this many days are never shown
pub const HORIZON_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 86_400_000;

const UNKNOWN_LABEL: &str = "Unknown";

/// The date filter a view was requested with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    Tomorrow,
}

impl FromStr for DateFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(DateFilter::Today),
            "tomorrow" => Ok(DateFilter::Tomorrow),
            _ => Err(format!(
                "unknown date filter '{}' (expected: today, tomorrow)",
                s
            )),
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateFilter::Today => write!(f, "today"),
            DateFilter::Tomorrow => write!(f, "tomorrow"),
        }
    }
}

/// Outcome of classifying one task's due date
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Skip,
    Keep {
        label: String,
        sort_date: DateTime<FixedOffset>,
    },
}

pub fn parse_due(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_str(raw, DUE_FORMAT)
}

/// Whole days from `now` to the end (23:59:59) of the due day, floored.
///
/// Measuring to the end of the day means anything due today is 0, even when
/// its time has passed.
pub fn delta_days(due: DateTime<FixedOffset>, now: DateTime<Utc>) -> i64 {
    let to_end_of_day = 86_399 - i64::from(due.num_seconds_from_midnight());
    let end_of_day = due + TimeDelta::seconds(to_end_of_day);
    (end_of_day.with_timezone(&Utc) - now)
        .num_milliseconds()
        .div_euclid(MILLIS_PER_DAY)
}

pub fn is_skipped(delta: i64, filter: Option<DateFilter>) -> bool {
    match filter {
        Some(DateFilter::Today) if delta > 0 => true,
        Some(DateFilter::Tomorrow) if delta != 1 => true,
        _ => delta > HORIZON_DAYS,
    }
}

/// "Today", "Tomorrow", or the weekday name, plus " H:MM" when the due
/// carries a time of day (a plain date is stored at hour 23).
pub fn due_label(delta: i64, due: DateTime<FixedOffset>) -> String {
    let mut label = match delta {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => due.format("%A").to_string(),
    };
    if due.hour() != 23 {
        label.push_str(&format!(" {}:{:02}", due.hour(), due.minute()));
    }
    label
}

/// Decide whether a task with this due date is shown under `filter`.
/// Tasks without a due date are always shown, sorted as if due now.
pub fn classify(
    due: Option<DateTime<FixedOffset>>,
    now: DateTime<Utc>,
    filter: Option<DateFilter>,
) -> Decision {
    let Some(due) = due else {
        return Decision::Keep {
            label: UNKNOWN_LABEL.to_string(),
            sort_date: now.fixed_offset(),
        };
    };
    let delta = delta_days(due, now);
    if is_skipped(delta, filter) {
        return Decision::Skip;
    }
    Decision::Keep {
        label: due_label(delta, due),
        sort_date: due,
    }
}
