//! Materialized occurrences produced from recurring templates.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::template::TemplateId;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
/// Store-owned identifier of a generated occurrence row.
pub struct OccurrenceId(pub i64);

impl fmt::Display for OccurrenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// An occurrence that has not been persisted yet.
pub struct NewOccurrence {
    pub parent_template_id: TemplateId,
    pub date: NaiveDate,
    pub category: String,
    pub amount: Option<f64>,
    pub description: String,
}

impl NewOccurrence {
    pub fn into_occurrence(self, id: OccurrenceId) -> Occurrence {
        Occurrence {
            id,
            parent_template_id: self.parent_template_id,
            date: self.date,
            category: self.category,
            amount: self.amount,
            description: self.description,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// A single dated transaction generated from a template. Never itself recurring.
pub struct Occurrence {
    pub id: OccurrenceId,
    pub parent_template_id: TemplateId,
    pub date: NaiveDate,
    pub category: String,
    pub amount: Option<f64>,
    pub description: String,
}

impl Occurrence {
    /// The (template, date) pair that must stay unique across the store.
    pub fn key(&self) -> (TemplateId, NaiveDate) {
        (self.parent_template_id, self.date)
    }

    pub fn is_recurring(&self) -> bool {
        false
    }
}
