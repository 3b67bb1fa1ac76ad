mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{date, seed, template_row, temp_base};
use fintrack::api::{GenerateEndpoint, STATUS_BAD_GATEWAY, STATUS_BAD_REQUEST, STATUS_CREATED};
use fintrack::core::{
    FixedClock, GeneratorOptions, OccurrenceGenerator, StoreError, TemplateStore,
};
use fintrack::domain::{NewOccurrence, Occurrence, RecurringTemplate, TemplateId};
use serde_json::json;

fn endpoint_over(store: Arc<dyn TemplateStore>, today: NaiveDate) -> GenerateEndpoint {
    GenerateEndpoint::new(
        OccurrenceGenerator::new(store),
        Arc::new(FixedClock::on(today)),
        30,
    )
}

struct OfflineStore;

impl TemplateStore for OfflineStore {
    fn list_recurring_templates(&self) -> Result<Vec<RecurringTemplate>, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn occurrence_exists(&self, _: TemplateId, _: NaiveDate) -> Result<bool, StoreError> {
        Ok(false)
    }

    fn create_occurrence(&self, _: NewOccurrence) -> Result<Occurrence, StoreError> {
        Err(StoreError::Unavailable("connection refused".into()))
    }

    fn occurrences_for(&self, _: TemplateId) -> Result<Vec<Occurrence>, StoreError> {
        Ok(Vec::new())
    }
}

#[test]
fn generate_returns_created_rows_with_parent_links() {
    let data_dir = temp_base().join("data");
    let store = seed(
        &data_dir,
        vec![template_row(
            "Gym",
            35.0,
            "weekly",
            Some(date(2024, 1, 1)),
            None,
            None,
        )],
    );
    let endpoint = endpoint_over(Arc::new(store), date(2024, 6, 1));

    let response = endpoint.handle(r#"{"startDate": "2024-01-01", "endDate": "2024-01-31"}"#);
    assert_eq!(response.status, STATUS_CREATED);
    assert_eq!(response.body["generated"], 5);
    let first = &response.body["transactions"][0];
    assert_eq!(first["date"], "2024-01-01");
    assert_eq!(first["category"], "Gym");
    assert_eq!(first["amount"], 35.0);
    assert_eq!(first["parentTransactionId"], 1);

    let again = endpoint.handle(r#"{"startDate": "2024-01-01", "endDate": "2024-01-31"}"#);
    assert_eq!(again.status, STATUS_CREATED);
    assert_eq!(again.body, json!({ "generated": 0, "transactions": [] }));
}

#[test]
fn empty_body_uses_today_and_default_window() {
    let data_dir = temp_base().join("data");
    let store = seed(
        &data_dir,
        vec![template_row("Coffee", 3.5, "daily", None, None, None)],
    );
    let endpoint = endpoint_over(Arc::new(store), date(2024, 2, 1));

    let response = endpoint.handle("");
    assert_eq!(response.status, STATUS_CREATED);
    // 2024-02-01 through 2024-03-02 inclusive.
    assert_eq!(response.body["generated"], 31);
    assert_eq!(response.body["transactions"][30]["date"], "2024-03-02");
}

#[test]
fn invalid_dates_are_rejected_before_touching_the_store() {
    let endpoint = endpoint_over(Arc::new(OfflineStore), date(2024, 1, 1));

    let response = endpoint.handle(r#"{"startDate": "01/02/2024"}"#);
    assert_eq!(response.status, STATUS_BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Invalid date for startDate" }));

    let response = endpoint.handle(r#"{"startDate": "2024-03-01", "endDate": "2024-02-01"}"#);
    assert_eq!(response.status, STATUS_BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "error": "Invalid date range: endDate must be on or after startDate" })
    );
}

#[test]
fn listing_failure_maps_to_bad_gateway() {
    let endpoint = endpoint_over(Arc::new(OfflineStore), date(2024, 1, 1));
    let response = endpoint.handle("{}");
    assert_eq!(response.status, STATUS_BAD_GATEWAY);
    assert_eq!(
        response.body,
        json!({ "error": "Store unavailable: connection refused" })
    );
}

#[test]
fn capped_run_reports_deferred_templates() {
    let data_dir = temp_base().join("data");
    let store = seed(
        &data_dir,
        vec![template_row("Coffee", 3.5, "daily", None, None, None)],
    );
    let generator = OccurrenceGenerator::with_options(
        Arc::new(store),
        GeneratorOptions {
            max_per_template: 3,
        },
    );
    let endpoint = GenerateEndpoint::new(
        generator,
        Arc::new(FixedClock::on(date(2024, 1, 1))),
        30,
    );
    let body = r#"{"startDate": "2024-01-01", "endDate": "2024-01-05"}"#;

    let first = endpoint.handle(body);
    assert_eq!(first.status, STATUS_CREATED);
    assert_eq!(first.body["generated"], 3);
    assert_eq!(
        first.body["deferred"],
        json!([{ "parentTransactionId": 1, "nextDate": "2024-01-04" }])
    );

    let second = endpoint.handle(body);
    assert_eq!(second.body["generated"], 2);
    assert!(second.body.get("deferred").is_none());
}
