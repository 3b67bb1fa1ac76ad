use std::{fs, sync::Arc};

use chrono::NaiveDate;
use fintrack_core::{Insertion, OccurrenceGenerator, StoreError, TemplateStore};
use fintrack_domain::{DateWindow, TemplateId};
use fintrack_storage_json::{JsonTemplateStore, TransactionRow, TABLE_FILE};
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn recurring_row(frequency: &str, start: NaiveDate) -> TransactionRow {
    TransactionRow {
        description: Some("Rent".into()),
        is_recurring: true,
        recurrence_frequency: Some(frequency.into()),
        recurrence_start_date: Some(start),
        ..TransactionRow::new(start, "Housing", Some(1800.0))
    }
}

#[test]
fn missing_table_reads_as_empty() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTemplateStore::open(dir.path()).expect("open store");

    assert!(store.list_recurring_templates().unwrap().is_empty());
    assert!(!store.path().exists());
    assert_eq!(store.path(), dir.path().join(TABLE_FILE).as_path());
}

#[test]
fn lists_only_recurring_rows_as_templates() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTemplateStore::open(dir.path()).expect("open store");
    store
        .insert_row(TransactionRow::new(date(2024, 1, 2), "Food", Some(12.5)))
        .unwrap();
    let rent = store
        .insert_row(recurring_row("monthly", date(2024, 1, 15)))
        .unwrap();

    let templates = store.list_recurring_templates().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].id, TemplateId(rent.id));
    assert_eq!(templates[0].frequency, "monthly");
    assert_eq!(templates[0].description, "Rent");
    assert_eq!(templates[0].activation_date, Some(date(2024, 1, 15)));
}

#[test]
fn negative_recurrence_day_makes_template_ineligible() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTemplateStore::open(dir.path()).expect("open store");
    let mut row = recurring_row("monthly", date(2024, 1, 15));
    row.recurrence_day = Some(-3);
    store.insert_row(row).unwrap();

    let templates = store.list_recurring_templates().unwrap();
    assert!(templates[0].eligibility().is_err());
}

#[test]
fn zero_recurrence_day_on_weekly_row_still_generates() {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(JsonTemplateStore::open(dir.path()).expect("open store"));
    let mut row = recurring_row("weekly", date(2024, 1, 1));
    row.recurrence_day = Some(0);
    store.insert_row(row).unwrap();

    let range = DateWindow::new(date(2024, 1, 1), date(2024, 1, 21)).unwrap();
    let summary = OccurrenceGenerator::new(store.clone()).generate(range).unwrap();
    assert_eq!(summary.created_count(), 3);
    assert!(summary.skipped_templates.is_empty());
}

#[test]
fn create_if_absent_persists_once() {
    let dir = tempdir().expect("tempdir");
    let store = JsonTemplateStore::open(dir.path()).expect("open store");
    let rent = store
        .insert_row(recurring_row("monthly", date(2024, 1, 15)))
        .unwrap();
    let template = store.list_recurring_templates().unwrap().remove(0);
    let draft = template.occurrence_on(date(2024, 2, 15));

    let created = store.create_if_absent(draft.clone()).unwrap();
    let Insertion::Created(row) = created else {
        panic!("expected a created row");
    };
    assert!(row.id.0 > rent.id);
    assert_eq!(store.create_if_absent(draft).unwrap(), Insertion::AlreadyPresent);

    let reopened = JsonTemplateStore::open(dir.path()).expect("reopen store");
    assert!(reopened
        .occurrence_exists(TemplateId(rent.id), date(2024, 2, 15))
        .unwrap());
    let stored = reopened.occurrences_for(TemplateId(rent.id)).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].description, "Rent");

    let persisted: Vec<_> = reopened
        .rows()
        .unwrap()
        .into_iter()
        .filter(|row| row.parent_transaction_id == Some(rent.id))
        .collect();
    assert_eq!(persisted.len(), 1);
    assert!(!persisted[0].is_recurring);
}

#[test]
fn generator_is_idempotent_against_json_table() {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(JsonTemplateStore::open(dir.path()).expect("open store"));
    store
        .insert_row(recurring_row("weekly", date(2024, 3, 1)))
        .unwrap();
    store
        .insert_row(recurring_row("biweekly", date(2024, 3, 1)))
        .unwrap();
    let generator = OccurrenceGenerator::new(store.clone());
    let window = DateWindow::new(date(2024, 3, 1), date(2024, 3, 31)).unwrap();

    let first = generator.generate(window).unwrap();
    assert_eq!(first.created_count(), 5);
    assert_eq!(first.skipped_templates.len(), 1);

    let second = generator.generate(window).unwrap();
    assert_eq!(second.created_count(), 0);
    assert_eq!(store.rows().unwrap().len(), 2 + 5);
}

#[test]
fn corrupt_table_reports_serialization_error() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join(TABLE_FILE), "{ not json").unwrap();
    let store = JsonTemplateStore::open(dir.path()).expect("open store");

    let err = store.list_recurring_templates().unwrap_err();
    assert!(matches!(err, StoreError::Serde(_)), "unexpected error: {err:?}");
}
