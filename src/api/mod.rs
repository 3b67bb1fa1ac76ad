//! Request and response contract of `POST /recurring/generate`.
//!
//! Transport is left to the embedding server: it hands the raw body to
//! [`GenerateEndpoint::handle`] and writes back the returned status and JSON.

use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use fintrack_core::{Clock, CoreError, DeferredTemplate, GenerationSummary, OccurrenceGenerator};
use fintrack_domain::{DateWindow, Occurrence};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

pub const GENERATE_PATH: &str = "/recurring/generate";
pub const STATUS_CREATED: u16 = 201;
pub const STATUS_BAD_REQUEST: u16 = 400;
pub const STATUS_INTERNAL_ERROR: u16 = 500;
pub const STATUS_BAD_GATEWAY: u16 = 502;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid date for {field}")]
    InvalidDate { field: &'static str },
    #[error("Invalid date range: endDate must be on or after startDate")]
    InvalidRange,
    #[error("{0}")]
    Upstream(String),
}

impl ApiError {
    pub fn status(&self) -> u16 {
        match self {
            ApiError::InvalidDate { .. } | ApiError::InvalidRange => STATUS_BAD_REQUEST,
            ApiError::Upstream(_) => STATUS_BAD_GATEWAY,
        }
    }

    pub fn body(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Store(store) => ApiError::Upstream(store.to_string()),
            CoreError::InvalidWindow(_) => ApiError::InvalidRange,
        }
    }
}

/// Parsed request body. Absent, null, and empty-string dates are all `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl GenerateRequest {
    /// Parses a raw JSON body. Bodies that are not JSON objects count as `{}`.
    pub fn from_body(body: &str) -> Result<Self, ApiError> {
        let payload: Value = serde_json::from_str(body).unwrap_or(Value::Null);
        Ok(Self {
            start_date: date_field(&payload, "startDate")?,
            end_date: date_field(&payload, "endDate")?,
        })
    }

    /// Builds a request from loose string inputs, such as CLI flags.
    pub fn from_parts(start: Option<&str>, end: Option<&str>) -> Result<Self, ApiError> {
        Ok(Self {
            start_date: parse_date(start, "startDate")?,
            end_date: parse_date(end, "endDate")?,
        })
    }

    /// Fills in defaults: start is `today`, end is start plus `default_days`.
    pub fn resolve_window(
        &self,
        today: NaiveDate,
        default_days: u32,
    ) -> Result<DateWindow, ApiError> {
        let start = self.start_date.unwrap_or(today);
        let end = match self.end_date {
            Some(end) => end,
            None => start
                .checked_add_signed(Duration::days(i64::from(default_days)))
                .ok_or(ApiError::InvalidDate { field: "endDate" })?,
        };
        DateWindow::new(start, end).map_err(|_| ApiError::InvalidRange)
    }
}

fn date_field(payload: &Value, field: &'static str) -> Result<Option<NaiveDate>, ApiError> {
    match payload.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse_date(Some(raw), field),
        Some(_) => Err(ApiError::InvalidDate { field }),
    }
}

fn parse_date(raw: Option<&str>, field: &'static str) -> Result<Option<NaiveDate>, ApiError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<NaiveDate>()
            .map(Some)
            .map_err(|_| ApiError::InvalidDate { field }),
    }
}

/// Wire shape of one generated occurrence.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceView {
    pub id: i64,
    pub date: NaiveDate,
    pub category: String,
    pub amount: Option<f64>,
    pub description: String,
    pub parent_transaction_id: i64,
}

impl From<&Occurrence> for OccurrenceView {
    fn from(occurrence: &Occurrence) -> Self {
        Self {
            id: occurrence.id.0,
            date: occurrence.date,
            category: occurrence.category.clone(),
            amount: occurrence.amount,
            description: occurrence.description.clone(),
            parent_transaction_id: occurrence.parent_template_id.0,
        }
    }
}

/// Template whose remaining dates need another call to be generated.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeferredView {
    pub parent_transaction_id: i64,
    pub next_date: NaiveDate,
}

impl From<&DeferredTemplate> for DeferredView {
    fn from(deferred: &DeferredTemplate) -> Self {
        Self {
            parent_transaction_id: deferred.template_id.0,
            next_date: deferred.next_date,
        }
    }
}

/// Success body. `deferred` only appears when the per-template limit cut the run short.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateResponse {
    pub generated: usize,
    pub transactions: Vec<OccurrenceView>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deferred: Vec<DeferredView>,
}

impl From<&GenerationSummary> for GenerateResponse {
    fn from(summary: &GenerationSummary) -> Self {
        Self {
            generated: summary.created_count(),
            transactions: summary.created.iter().map(OccurrenceView::from).collect(),
            deferred: summary.deferred.iter().map(DeferredView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

/// Long-lived handler for the generate route. The generator (and through it the
/// store handle) and the clock are injected once at startup.
pub struct GenerateEndpoint {
    generator: OccurrenceGenerator,
    clock: Arc<dyn Clock>,
    default_window_days: u32,
}

impl GenerateEndpoint {
    pub fn new(
        generator: OccurrenceGenerator,
        clock: Arc<dyn Clock>,
        default_window_days: u32,
    ) -> Self {
        Self {
            generator,
            clock,
            default_window_days,
        }
    }

    /// Runs generation for `request` and returns the summary behind the response.
    pub fn execute(&self, request: &GenerateRequest) -> Result<GenerationSummary, ApiError> {
        let window = request.resolve_window(self.clock.today(), self.default_window_days)?;
        Ok(self.generator.generate(window)?)
    }

    pub fn handle(&self, body: &str) -> ApiResponse {
        let outcome = GenerateRequest::from_body(body).and_then(|request| self.execute(&request));
        match outcome {
            Ok(summary) => match serde_json::to_value(GenerateResponse::from(&summary)) {
                Ok(body) => ApiResponse {
                    status: STATUS_CREATED,
                    body,
                },
                Err(err) => ApiResponse {
                    status: STATUS_INTERNAL_ERROR,
                    body: json!({ "error": err.to_string() }),
                },
            },
            Err(err) => {
                warn!(path = GENERATE_PATH, status = err.status(), error = %err, "generate request rejected");
                ApiResponse {
                    status: err.status(),
                    body: err.body(),
                }
            }
        }
    }
}
