#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use chrono::NaiveDate;
use fintrack::storage::{JsonTemplateStore, TransactionRow};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates an isolated base directory that outlives the calling test.
pub fn temp_base() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Recurring template row with the given cadence and bounds.
pub fn template_row(
    category: &str,
    amount: f64,
    frequency: &str,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    day: Option<i64>,
) -> TransactionRow {
    let mut row = TransactionRow::new(start.unwrap_or(date(2024, 1, 1)), category, Some(amount));
    row.is_recurring = true;
    row.recurrence_frequency = Some(frequency.to_string());
    row.recurrence_start_date = start;
    row.recurrence_end_date = end;
    row.recurrence_day = day;
    row
}

/// Opens the JSON table under `data_dir` and inserts `rows`.
pub fn seed(data_dir: &std::path::Path, rows: Vec<TransactionRow>) -> JsonTemplateStore {
    let store = JsonTemplateStore::open(data_dir).expect("open json store");
    for row in rows {
        store.insert_row(row).expect("seed row");
    }
    store
}
