//! Recurrence cadences and the calendar arithmetic that advances them.

use std::{fmt, str::FromStr};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// Enumerates the cadences a recurring template may follow.
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub const ALL: [Frequency; 4] = [
        Frequency::Daily,
        Frequency::Weekly,
        Frequency::Monthly,
        Frequency::Yearly,
    ];

    /// Wire representation used by the store (`"daily"`, `"weekly"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }

    /// Calculates the occurrence date that follows `current`.
    ///
    /// `anchor_day` is only consulted for monthly stepping, where it pins the
    /// result to that day-of-month. Months shorter than the requested day clamp
    /// to their last day. Yearly steps keep month and day, so Feb 29 lands on
    /// Feb 28 in common years.
    ///
    /// Returns `None` only when the result falls outside the representable
    /// calendar, which callers treat as the end of the series.
    pub fn step(self, current: NaiveDate, anchor_day: Option<u32>) -> Option<NaiveDate> {
        match self {
            Frequency::Daily => current.checked_add_signed(Duration::days(1)),
            Frequency::Weekly => current.checked_add_signed(Duration::weeks(1)),
            Frequency::Monthly => {
                let (year, month) = if current.month() == 12 {
                    (current.year().checked_add(1)?, 1)
                } else {
                    (current.year(), current.month() + 1)
                };
                let day = anchor_day.unwrap_or_else(|| current.day());
                clamped_date(year, month, day)
            }
            Frequency::Yearly => {
                clamped_date(current.year().checked_add(1)?, current.month(), current.day())
            }
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(ParseFrequencyError(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raised when a stored frequency is not one of the supported cadences.
pub struct ParseFrequencyError(pub String);

impl fmt::Display for ParseFrequencyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized frequency `{}`", self.0)
    }
}

impl std::error::Error for ParseFrequencyError {}

/// Returns the last calendar day of `month` in `year`.
///
/// Computed as the first day of the following month minus one day, so leap
/// years need no special casing.
pub fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let next = if month == 12 {
        year.checked_add(1).map(|next_year| (next_year, 1))
    } else {
        Some((year, month + 1))
    };
    match next.and_then(|(next_year, next_month)| NaiveDate::from_ymd_opt(next_year, next_month, 1))
    {
        Some(first_next) => first_next.pred_opt(),
        // December of the last representable year.
        None => NaiveDate::from_ymd_opt(year, month, 31),
    }
}

fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    if day >= last.day() {
        Some(last)
    } else {
        NaiveDate::from_ymd_opt(year, month, day)
    }
}
