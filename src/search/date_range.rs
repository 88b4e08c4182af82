use std::fmt;
use std::str::FromStr;

use chrono::{Duration, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::models::{Task, TaskStatus};

/// Due-date window a task must fall into.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    #[default]
    All,
    Today,
    /// The next seven days, today included. Not the calendar week.
    Week,
    /// From today up to the same day next month.
    Month,
    Overdue,
}

impl DateRange {
    pub const ALL: [DateRange; 5] = [
        DateRange::All,
        DateRange::Today,
        DateRange::Week,
        DateRange::Month,
        DateRange::Overdue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Week => "week",
            DateRange::Month => "month",
            DateRange::Overdue => "overdue",
        }
    }

    pub fn is_all(&self) -> bool {
        *self == DateRange::All
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DateRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(DateRange::All),
            "today" => Ok(DateRange::Today),
            "week" => Ok(DateRange::Week),
            "month" => Ok(DateRange::Month),
            "overdue" => Ok(DateRange::Overdue),
            _ => Err(ParseError::new("date range", s)),
        }
    }
}

fn start_of(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}

/// Returns whether `task` falls into `range`, relative to the calendar day of `now`.
///
/// Tasks without a due date only match [`DateRange::All`]. Window bounds are
/// midnights, so `week` and `month` include their last day only up to 00:00.
pub fn matches_date_range(task: &Task, range: DateRange, now: NaiveDateTime) -> bool {
    if range.is_all() {
        return true;
    }
    let Some(due) = task.due_date else {
        return false;
    };

    let today = now.date();
    let today_start = start_of(today);
    match range {
        DateRange::All => true,
        DateRange::Today => due.date() == today,
        DateRange::Week => {
            let week_end = today_start + Duration::days(7);
            due >= today_start && due <= week_end
        }
        DateRange::Month => {
            // checked_add_months clamps to the last day of a shorter month
            let month_end = today
                .checked_add_months(Months::new(1))
                .map(start_of)
                .unwrap_or(NaiveDateTime::MAX);
            due >= today_start && due <= month_end
        }
        DateRange::Overdue => due < today_start && task.status != TaskStatus::Done,
    }
}
