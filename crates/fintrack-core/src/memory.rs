//! Process-local [`TemplateStore`] used by tests, demos, and dry runs.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;
use fintrack_domain::{NewOccurrence, Occurrence, OccurrenceId, RecurringTemplate, TemplateId};

use crate::{
    store::{Insertion, TemplateStore},
    StoreError,
};

#[derive(Debug, Default)]
struct MemoryState {
    templates: Vec<RecurringTemplate>,
    occurrences: Vec<Occurrence>,
    next_id: i64,
}

impl MemoryState {
    fn contains(&self, template_id: TemplateId, date: NaiveDate) -> bool {
        self.occurrences
            .iter()
            .any(|occurrence| occurrence.key() == (template_id, date))
    }

    fn insert(&mut self, draft: NewOccurrence) -> Occurrence {
        self.next_id += 1;
        let occurrence = draft.into_occurrence(OccurrenceId(self.next_id));
        self.occurrences.push(occurrence.clone());
        occurrence
    }
}

/// Keeps templates and occurrences in memory behind a single mutex, so
/// `create_if_absent` is atomic within the process.
#[derive(Debug, Default)]
pub struct InMemoryTemplateStore {
    state: Mutex<MemoryState>,
}

impl InMemoryTemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: impl IntoIterator<Item = RecurringTemplate>) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.state.lock() {
            state.templates.extend(templates);
        }
        store
    }

    /// Snapshot of every stored occurrence in insertion order.
    pub fn occurrences(&self) -> Result<Vec<Occurrence>, StoreError> {
        Ok(self.lock()?.occurrences.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".into()))
    }
}

impl TemplateStore for InMemoryTemplateStore {
    fn list_recurring_templates(&self) -> Result<Vec<RecurringTemplate>, StoreError> {
        Ok(self.lock()?.templates.clone())
    }

    fn occurrence_exists(
        &self,
        template_id: TemplateId,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(self.lock()?.contains(template_id, date))
    }

    fn create_occurrence(&self, draft: NewOccurrence) -> Result<Occurrence, StoreError> {
        Ok(self.lock()?.insert(draft))
    }

    fn occurrences_for(&self, template_id: TemplateId) -> Result<Vec<Occurrence>, StoreError> {
        let state = self.lock()?;
        let mut rows: Vec<_> = state
            .occurrences
            .iter()
            .filter(|occurrence| occurrence.parent_template_id == template_id)
            .cloned()
            .collect();
        rows.sort_by_key(|occurrence| occurrence.date);
        Ok(rows)
    }

    fn create_if_absent(&self, draft: NewOccurrence) -> Result<Insertion, StoreError> {
        let mut state = self.lock()?;
        if state.contains(draft.parent_template_id, draft.date) {
            return Ok(Insertion::AlreadyPresent);
        }
        Ok(Insertion::Created(state.insert(draft)))
    }
}
