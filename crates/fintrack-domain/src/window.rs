//! Inclusive date windows and template expansion across them.

use std::{fmt, iter::FusedIterator};

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{frequency::Frequency, template::RecurringTemplate};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Date range over which generation is requested. Both ends are inclusive.
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, DateWindowError> {
        if end < start {
            return Err(DateWindowError::InvalidRange);
        }
        Ok(Self { start, end })
    }

    /// Window covering `start` and the following `days` days.
    pub fn starting(start: NaiveDate, days: u32) -> Result<Self, DateWindowError> {
        let end = start
            .checked_add_signed(Duration::days(i64::from(days)))
            .ok_or(DateWindowError::OutOfRange)?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when constructing [`DateWindow`] values.
pub enum DateWindowError {
    InvalidRange,
    OutOfRange,
}

impl fmt::Display for DateWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DateWindowError::InvalidRange => f.write_str("window end must be on or after start"),
            DateWindowError::OutOfRange => f.write_str("window end is outside the calendar"),
        }
    }
}

impl std::error::Error for DateWindowError {}

/// Produces the candidate dates `template` may occupy inside `window`.
///
/// The first candidate is the later of the window start and the template's
/// activation date; later candidates follow the template's cadence until the
/// window end or the expiration date is passed. Ineligible templates (see
/// [`RecurringTemplate::eligibility`]) and templates whose bounds miss the
/// window yield nothing.
pub fn expand(template: &RecurringTemplate, window: DateWindow) -> Expansion {
    let Ok(frequency) = template.eligibility() else {
        return Expansion { cursor: None };
    };
    let first = template
        .activation_date
        .map_or(window.start, |activation| activation.max(window.start));
    let last = template
        .expiration_date
        .map_or(window.end, |expiration| expiration.min(window.end));
    let cursor = (first <= last).then_some(Cursor {
        next: first,
        last,
        frequency,
        anchor_day: template.anchor(),
    });
    Expansion { cursor }
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    next: NaiveDate,
    last: NaiveDate,
    frequency: Frequency,
    anchor_day: Option<u32>,
}

#[derive(Debug, Clone)]
/// Lazy, strictly increasing sequence of candidate dates returned by [`expand`].
pub struct Expansion {
    cursor: Option<Cursor>,
}

impl Iterator for Expansion {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let cursor = self.cursor.take()?;
        let current = cursor.next;
        self.cursor = cursor
            .frequency
            .step(current, cursor.anchor_day)
            .filter(|following| *following <= cursor.last)
            .map(|next| Cursor { next, ..cursor });
        Some(current)
    }
}

impl FusedIterator for Expansion {}
