//! Contract between the generator and whatever persists templates and occurrences.

use chrono::NaiveDate;
use fintrack_domain::{NewOccurrence, Occurrence, RecurringTemplate, TemplateId};

use crate::StoreError;

/// Outcome of [`TemplateStore::create_if_absent`].
#[derive(Debug, Clone, PartialEq)]
pub enum Insertion {
    Created(Occurrence),
    AlreadyPresent,
}

/// Abstraction over backends that persist recurring templates and their occurrences.
///
/// Handles are long-lived and shared; the generator receives one by construction.
pub trait TemplateStore: Send + Sync {
    /// Every row flagged as recurring, regardless of frequency or bounds.
    fn list_recurring_templates(&self) -> Result<Vec<RecurringTemplate>, StoreError>;

    fn occurrence_exists(&self, template_id: TemplateId, date: NaiveDate)
        -> Result<bool, StoreError>;

    fn create_occurrence(&self, draft: NewOccurrence) -> Result<Occurrence, StoreError>;

    /// Occurrences generated from `template_id`, ordered by date.
    fn occurrences_for(&self, template_id: TemplateId) -> Result<Vec<Occurrence>, StoreError>;

    /// Inserts `draft` unless an occurrence already exists for its (template, date) pair.
    ///
    /// The default composes [`occurrence_exists`](Self::occurrence_exists) and
    /// [`create_occurrence`](Self::create_occurrence) and is not atomic: two
    /// overlapping callers may both insert. Backends that can check and insert
    /// under one lock or constraint should override it.
    fn create_if_absent(&self, draft: NewOccurrence) -> Result<Insertion, StoreError> {
        if self.occurrence_exists(draft.parent_template_id, draft.date)? {
            return Ok(Insertion::AlreadyPresent);
        }
        self.create_occurrence(draft).map(Insertion::Created)
    }
}
