//! Recurring transaction templates as read from the store.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{frequency::Frequency, occurrence::NewOccurrence};

/// Highest day-of-month an anchor may request; shorter months clamp.
pub const MAX_ANCHOR_DAY: u32 = 31;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
/// Store-owned identifier of a recurring template row.
pub struct TemplateId(pub i64);

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A recurring-transaction definition from which dated occurrences are expanded.
///
/// `frequency` keeps the raw stored value so malformed rows can still be loaded
/// and reported; see [`RecurringTemplate::eligibility`].
pub struct RecurringTemplate {
    pub id: TemplateId,
    pub category: String,
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: String,
    pub frequency: String,
    #[serde(default)]
    pub activation_date: Option<NaiveDate>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    #[serde(default)]
    pub anchor_day: Option<u32>,
}

impl RecurringTemplate {
    pub fn new(
        id: TemplateId,
        category: impl Into<String>,
        amount: Option<f64>,
        frequency: Frequency,
    ) -> Self {
        Self {
            id,
            category: category.into(),
            amount,
            description: String::new(),
            frequency: frequency.as_str().to_string(),
            activation_date: None,
            expiration_date: None,
            anchor_day: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn active_from(mut self, date: NaiveDate) -> Self {
        self.activation_date = Some(date);
        self
    }

    pub fn expires_on(mut self, date: NaiveDate) -> Self {
        self.expiration_date = Some(date);
        self
    }

    pub fn anchored_to(mut self, day: u32) -> Self {
        self.anchor_day = Some(day);
        self
    }

    /// Validates the fields expansion depends on and returns the parsed cadence.
    ///
    /// The anchor day only matters for monthly templates; other cadences ignore it.
    pub fn eligibility(&self) -> Result<Frequency, TemplateIssue> {
        let frequency = self
            .frequency
            .parse::<Frequency>()
            .map_err(|_| TemplateIssue::UnknownFrequency(self.frequency.clone()))?;
        if frequency == Frequency::Monthly {
            if let Some(day) = self.anchor() {
                if day > MAX_ANCHOR_DAY {
                    return Err(TemplateIssue::AnchorOutOfRange(day));
                }
            }
        }
        Ok(frequency)
    }

    /// Stored anchor day, with 0 read as "no anchor".
    pub fn anchor(&self) -> Option<u32> {
        self.anchor_day.filter(|day| *day != 0)
    }

    /// Builds the occurrence this template materializes on `date`.
    pub fn occurrence_on(&self, date: NaiveDate) -> NewOccurrence {
        NewOccurrence {
            parent_template_id: self.id,
            date,
            category: self.category.clone(),
            amount: self.amount,
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Template data problems that make a template ineligible for generation.
pub enum TemplateIssue {
    UnknownFrequency(String),
    AnchorOutOfRange(u32),
}

impl fmt::Display for TemplateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateIssue::UnknownFrequency(raw) => write!(f, "unrecognized frequency `{raw}`"),
            TemplateIssue::AnchorOutOfRange(day) => {
                write!(f, "anchor day {day} is outside 1..={MAX_ANCHOR_DAY}")
            }
        }
    }
}

impl std::error::Error for TemplateIssue {}

#[cfg(test)]
mod tests {
    use super::*;

    fn rent() -> RecurringTemplate {
        RecurringTemplate::new(TemplateId(1), "Housing", Some(1800.0), Frequency::Monthly)
            .with_description("Rent")
    }

    #[test]
    fn eligibility_parses_frequency() {
        assert_eq!(rent().eligibility(), Ok(Frequency::Monthly));
    }

    #[test]
    fn eligibility_rejects_unknown_frequency() {
        let mut template = rent();
        template.frequency = "biweekly".into();
        assert_eq!(
            template.eligibility(),
            Err(TemplateIssue::UnknownFrequency("biweekly".into()))
        );
    }

    #[test]
    fn zero_anchor_means_no_anchor() {
        let template = rent().anchored_to(0);
        assert_eq!(template.eligibility(), Ok(Frequency::Monthly));
        assert_eq!(template.anchor(), None);
        assert_eq!(rent().anchored_to(15).anchor(), Some(15));
    }

    #[test]
    fn anchor_ignored_for_non_monthly_cadences() {
        let mut gym = rent().anchored_to(40);
        gym.frequency = "weekly".into();
        assert_eq!(gym.eligibility(), Ok(Frequency::Weekly));
    }

    #[test]
    fn eligibility_rejects_anchor_out_of_range() {
        assert_eq!(
            rent().anchored_to(32).eligibility(),
            Err(TemplateIssue::AnchorOutOfRange(32))
        );
        assert!(rent().anchored_to(31).eligibility().is_ok());
    }

    #[test]
    fn occurrence_copies_payload() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let draft = rent().occurrence_on(date);
        assert_eq!(draft.parent_template_id, TemplateId(1));
        assert_eq!(draft.date, date);
        assert_eq!(draft.category, "Housing");
        assert_eq!(draft.amount, Some(1800.0));
        assert_eq!(draft.description, "Rent");
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let json = r#"{"id":7,"category":"Gym","amount":null,"frequency":"weekly"}"#;
        let template: RecurringTemplate = serde_json::from_str(json).unwrap();
        assert_eq!(template.id, TemplateId(7));
        assert_eq!(template.amount, None);
        assert!(template.description.is_empty());
        assert!(template.activation_date.is_none());
    }
}
