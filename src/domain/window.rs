// Time window selection and history filtering
use crate::domain::telemetry::TelemetryRecord;
use chrono::{Days, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("Please select a valid date range")]
    IncompleteRange,
    #[error("unknown window selection: {0}")]
    Unrecognized(String),
}

/// Rolling window lengths offered to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingDays {
    Seven,
    Thirty,
    Sixty,
}

impl RollingDays {
    pub fn days(self) -> u64 {
        match self {
            RollingDays::Seven => 7,
            RollingDays::Thirty => 30,
            RollingDays::Sixty => 60,
        }
    }

    pub fn from_days(days: u64) -> Option<Self> {
        match days {
            7 => Some(RollingDays::Seven),
            30 => Some(RollingDays::Thirty),
            60 => Some(RollingDays::Sixty),
            _ => None,
        }
    }
}

/// What the user picked. Exactly one kind is active at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WindowSelection {
    Today,
    LastDays(RollingDays),
    Range {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
}

impl WindowSelection {
    /// Label shown next to the selector, given the day "today" resolves to.
    pub fn label(&self, today: NaiveDate) -> String {
        match self {
            WindowSelection::Today => today.format("%Y-%m-%d").to_string(),
            WindowSelection::LastDays(days) => format!("Last {} Days", days.days()),
            WindowSelection::Range {
                start: Some(start),
                end,
            } => format!(
                "{} - {}",
                start.format("%Y-%m-%d"),
                end.map(|e| e.format("%Y-%m-%d").to_string())
                    .unwrap_or_default()
            ),
            WindowSelection::Range { start: None, .. } => "No date selected".to_string(),
        }
    }
}

impl FromStr for WindowSelection {
    type Err = WindowError;

    /// Accepts `today`, `last7`, `last30`, `last60` and `YYYY-MM-DD..YYYY-MM-DD`
    /// (either side of the range may be left empty).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("today") {
            return Ok(WindowSelection::Today);
        }
        if let Some(days) = s.strip_prefix("last") {
            return days
                .parse::<u64>()
                .ok()
                .and_then(RollingDays::from_days)
                .map(WindowSelection::LastDays)
                .ok_or_else(|| WindowError::Unrecognized(s.to_string()));
        }
        if let Some((start, end)) = s.split_once("..") {
            let parse = |part: &str| -> Result<Option<NaiveDate>, WindowError> {
                let part = part.trim();
                if part.is_empty() {
                    return Ok(None);
                }
                NaiveDate::parse_from_str(part, "%Y-%m-%d")
                    .map(Some)
                    .map_err(|_| WindowError::Unrecognized(s.to_string()))
            };
            return Ok(WindowSelection::Range {
                start: parse(start)?,
                end: parse(end)?,
            });
        }
        Err(WindowError::Unrecognized(s.to_string()))
    }
}

/// A resolved filter window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    /// One calendar day.
    Day(NaiveDate),
    /// Everything on or after `start`.
    Since(NaiveDateTime),
    /// Both ends inclusive.
    Between(NaiveDateTime, NaiveDateTime),
}

impl TimeWindow {
    pub fn resolve(selection: &WindowSelection, now: NaiveDateTime) -> Result<Self, WindowError> {
        match selection {
            WindowSelection::Today => Ok(TimeWindow::Day(now.date())),
            WindowSelection::LastDays(days) => {
                let start = now
                    .date()
                    .checked_sub_days(Days::new(days.days()))
                    .unwrap_or(NaiveDate::MIN);
                Ok(TimeWindow::Since(start_of_day(start)))
            }
            WindowSelection::Range {
                start: Some(start),
                end: Some(end),
            } => Ok(TimeWindow::Between(start_of_day(*start), start_of_day(*end))),
            WindowSelection::Range { .. } => Err(WindowError::IncompleteRange),
        }
    }

    pub fn contains(&self, time: NaiveDateTime) -> bool {
        match *self {
            TimeWindow::Day(day) => time.date() == day,
            TimeWindow::Since(start) => time >= start,
            TimeWindow::Between(start, end) => start <= time && time <= end,
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeWindow::Day(day) => write!(f, "{day}"),
            TimeWindow::Since(start) => write!(f, "since {start}"),
            TimeWindow::Between(start, end) => write!(f, "{start} to {end}"),
        }
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(chrono::NaiveTime::MIN)
}

/// Records of `history` that fall in `window`, in input order.
pub fn filter(history: &[TelemetryRecord], window: &TimeWindow) -> Vec<TelemetryRecord> {
    history
        .iter()
        .filter(|record| window.contains(record.record_time))
        .cloned()
        .collect()
}
