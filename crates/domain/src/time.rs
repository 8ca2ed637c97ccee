//! Time and timestamp helpers.

use chrono::{DateTime, Local, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// UTC timestamp used for `created_at`, `last_run`, run start times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Wall-clock time as the user would say it, e.g. `"3:07 PM"`.
#[must_use]
pub fn spoken_time(at: &DateTime<Local>) -> String {
    at.format("%-I:%M %p").to_string()
}

/// Calendar date as the user would say it, e.g. `"Monday, October 19, 2026"`.
#[must_use]
pub fn spoken_date(at: &DateTime<Local>) -> String {
    at.format("%A, %B %-d, %Y").to_string()
}

/// A minute of the day (`HH:MM`, 24-hour) at which a scheduled routine runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleTime(NaiveTime);

impl ScheduleTime {
    /// Parse an `HH:MM` string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidScheduleTime`] for anything else.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        NaiveTime::parse_from_str(value.trim(), "%H:%M")
            .map(Self)
            .map_err(|_| ValidationError::InvalidScheduleTime {
                value: value.to_string(),
            })
    }

    /// Whether `at` falls in this minute.
    #[must_use]
    pub fn matches(&self, at: NaiveTime) -> bool {
        self.0.hour() == at.hour() && self.0.minute() == at.minute()
    }
}

impl From<NaiveTime> for ScheduleTime {
    fn from(value: NaiveTime) -> Self {
        Self(value)
    }
}

impl TryFrom<String> for ScheduleTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ScheduleTime> for String {
    fn from(value: ScheduleTime) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for ScheduleTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}
