use crate::model::Task;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::{Duration, OffsetDateTime, Time, Weekday};

/// Half-open `[start, end)` range over task creation times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "time::serde::rfc3339")]
    pub start: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end: OffsetDateTime,
}

impl DateRange {
    pub fn contains(&self, instant: OffsetDateTime) -> bool {
        self.start <= instant && instant < self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Window {
    Daily,
    Weekly,
    Overall,
}

impl Window {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Overall => "overall",
        }
    }

    /// Bounds of the window containing `now`, in `now`'s offset.
    ///
    /// The offset is fixed for the whole window, so a day is always 24 hours.
    /// Across a daylight-saving change the bounds can be off from wall-clock
    /// midnight by the size of the shift.
    ///
    /// `Overall` is unbounded and yields `None`.
    pub fn range(self, now: OffsetDateTime, week_start: Weekday) -> Option<DateRange> {
        match self {
            Self::Daily => Some(day_range(now)),
            Self::Weekly => Some(week_range(now, week_start)),
            Self::Overall => None,
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn day_range(now: OffsetDateTime) -> DateRange {
    let start = now.replace_time(Time::MIDNIGHT);
    DateRange {
        start,
        end: start + Duration::days(1),
    }
}

fn week_range(now: OffsetDateTime, week_start: Weekday) -> DateRange {
    let days_back = days_since(now.weekday(), week_start);
    let start = now.replace_time(Time::MIDNIGHT) - Duration::days(i64::from(days_back));
    DateRange {
        start,
        end: start + Duration::days(7),
    }
}

fn days_since(day: Weekday, week_start: Weekday) -> u8 {
    (day.number_days_from_monday() + 7 - week_start.number_days_from_monday()) % 7
}

/// Keep the tasks created inside `range`; `None` keeps everything.
pub fn select(tasks: &[Task], range: Option<&DateRange>) -> Vec<Task> {
    match range {
        Some(range) => tasks
            .iter()
            .filter(|task| range.contains(task.created_at))
            .cloned()
            .collect(),
        None => tasks.to_vec(),
    }
}

pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "sunday" | "sun" => Some(Weekday::Sunday),
        "monday" | "mon" => Some(Weekday::Monday),
        "tuesday" | "tue" => Some(Weekday::Tuesday),
        "wednesday" | "wed" => Some(Weekday::Wednesday),
        "thursday" | "thu" => Some(Weekday::Thursday),
        "friday" | "fri" => Some(Weekday::Friday),
        "saturday" | "sat" => Some(Weekday::Saturday),
        _ => None,
    }
}
