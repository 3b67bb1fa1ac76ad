//! fintrack-storage-json
//!
//! File-backed [`TemplateStore`] holding a JSON snapshot of the
//! `spending_transactions` table: recurring template rows and the occurrence
//! rows generated from them live side by side, linked by `parent_transaction_id`.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use fintrack_core::{Insertion, StoreError, TemplateStore};
use fintrack_domain::{NewOccurrence, Occurrence, OccurrenceId, RecurringTemplate, TemplateId};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const TABLE_FILE: &str = "spending_transactions.json";
const TMP_SUFFIX: &str = "tmp";

/// One row of the transactions table, as persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRow {
    #[serde(default)]
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub recurrence_frequency: Option<String>,
    #[serde(default)]
    pub recurrence_day: Option<i64>,
    #[serde(default)]
    pub recurrence_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurrence_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub parent_transaction_id: Option<i64>,
}

impl TransactionRow {
    /// Plain one-off transaction row; set the recurrence fields to make it a template.
    pub fn new(date: NaiveDate, category: impl Into<String>, amount: Option<f64>) -> Self {
        Self {
            id: 0,
            date,
            category: category.into(),
            amount,
            description: None,
            is_recurring: false,
            recurrence_frequency: None,
            recurrence_day: None,
            recurrence_start_date: None,
            recurrence_end_date: None,
            parent_transaction_id: None,
        }
    }

    /// Interprets the row as a recurring template, if it is flagged as one.
    pub fn to_template(&self) -> Option<RecurringTemplate> {
        if !self.is_recurring {
            return None;
        }
        Some(RecurringTemplate {
            id: TemplateId(self.id),
            category: self.category.clone(),
            amount: self.amount,
            description: self.description.clone().unwrap_or_default(),
            frequency: self.recurrence_frequency.clone().unwrap_or_default(),
            activation_date: self.recurrence_start_date,
            expiration_date: self.recurrence_end_date,
            // Negative days saturate above the valid range so monthly eligibility rejects them.
            anchor_day: self
                .recurrence_day
                .map(|day| u32::try_from(day).unwrap_or(u32::MAX)),
        })
    }

    /// Interprets the row as a generated occurrence, if it has a parent.
    pub fn to_occurrence(&self) -> Option<Occurrence> {
        let parent = self.parent_transaction_id?;
        Some(Occurrence {
            id: OccurrenceId(self.id),
            parent_template_id: TemplateId(parent),
            date: self.date,
            category: self.category.clone(),
            amount: self.amount,
            description: self.description.clone().unwrap_or_default(),
        })
    }

    fn from_draft(id: i64, draft: &NewOccurrence) -> Self {
        Self {
            id,
            description: Some(draft.description.clone()),
            parent_transaction_id: Some(draft.parent_template_id.0),
            ..Self::new(draft.date, draft.category.clone(), draft.amount)
        }
    }

    fn is_occurrence_of(&self, template_id: TemplateId, date: NaiveDate) -> bool {
        self.parent_transaction_id == Some(template_id.0) && self.date == date
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableSnapshot {
    #[serde(default)]
    next_id: i64,
    #[serde(default)]
    transactions: Vec<TransactionRow>,
}

impl TableSnapshot {
    fn allocate_id(&mut self) -> i64 {
        let highest = self.transactions.iter().map(|row| row.id).max().unwrap_or(0);
        self.next_id = self.next_id.max(highest) + 1;
        self.next_id
    }
}

/// Filesystem-backed JSON persistence for templates and occurrences.
///
/// Every mutation rewrites the table atomically (temp file, then rename) while
/// holding an in-process lock, so `create_if_absent` cannot race with itself
/// inside one process. Separate processes sharing a file are not coordinated.
#[derive(Debug)]
pub struct JsonTemplateStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonTemplateStore {
    /// Opens (or prepares) the table file inside `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(data_dir)?;
        Ok(Self::at_path(data_dir.join(TABLE_FILE)))
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `row` with a freshly assigned id and returns the stored row.
    pub fn insert_row(&self, mut row: TransactionRow) -> Result<TransactionRow, StoreError> {
        let _guard = self.guard()?;
        let mut table = self.read()?;
        row.id = table.allocate_id();
        table.transactions.push(row.clone());
        self.write(&table)?;
        Ok(row)
    }

    /// Every row in the table, templates and occurrences alike.
    pub fn rows(&self) -> Result<Vec<TransactionRow>, StoreError> {
        let _guard = self.guard()?;
        Ok(self.read()?.transactions)
    }

    fn guard(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.lock
            .lock()
            .map_err(|_| StoreError::Unavailable("json store lock poisoned".into()))
    }

    fn read(&self) -> Result<TableSnapshot, StoreError> {
        if !self.path.exists() {
            return Ok(TableSnapshot::default());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(TableSnapshot::default());
        }
        serde_json::from_str(&data)
            .map_err(|err| StoreError::Serde(format!("{}: {}", self.path.display(), err)))
    }

    fn write(&self, table: &TableSnapshot) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(table)
            .map_err(|err| StoreError::Serde(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn insert_locked(
        &self,
        table: &mut TableSnapshot,
        draft: NewOccurrence,
    ) -> Result<Occurrence, StoreError> {
        let id = table.allocate_id();
        table.transactions.push(TransactionRow::from_draft(id, &draft));
        self.write(table)?;
        debug!(
            id,
            template_id = %draft.parent_template_id,
            date = %draft.date,
            "persisted occurrence row"
        );
        Ok(draft.into_occurrence(OccurrenceId(id)))
    }
}

impl TemplateStore for JsonTemplateStore {
    fn list_recurring_templates(&self) -> Result<Vec<RecurringTemplate>, StoreError> {
        Ok(self
            .rows()?
            .iter()
            .filter_map(TransactionRow::to_template)
            .collect())
    }

    fn occurrence_exists(
        &self,
        template_id: TemplateId,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(self
            .rows()?
            .iter()
            .any(|row| row.is_occurrence_of(template_id, date)))
    }

    fn create_occurrence(&self, draft: NewOccurrence) -> Result<Occurrence, StoreError> {
        let _guard = self.guard()?;
        let mut table = self.read()?;
        self.insert_locked(&mut table, draft)
    }

    fn occurrences_for(&self, template_id: TemplateId) -> Result<Vec<Occurrence>, StoreError> {
        let mut rows: Vec<_> = self
            .rows()?
            .iter()
            .filter(|row| row.parent_transaction_id == Some(template_id.0))
            .filter_map(TransactionRow::to_occurrence)
            .collect();
        rows.sort_by_key(|occurrence| occurrence.date);
        Ok(rows)
    }

    fn create_if_absent(&self, draft: NewOccurrence) -> Result<Insertion, StoreError> {
        let _guard = self.guard()?;
        let mut table = self.read()?;
        if table
            .transactions
            .iter()
            .any(|row| row.is_occurrence_of(draft.parent_template_id, draft.date))
        {
            return Ok(Insertion::AlreadyPresent);
        }
        self.insert_locked(&mut table, draft).map(Insertion::Created)
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
