//! Materializes occurrences of every recurring template over a date window.

use std::sync::Arc;

use chrono::NaiveDate;
use fintrack_domain::{expand, DateWindow, Occurrence, TemplateId, TemplateIssue};
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    cancel::{CancelToken, Interruption},
    store::{Insertion, TemplateStore},
    CoreError,
};

/// Upper bound on rows created for one template in a single run.
pub const DEFAULT_MAX_PER_TEMPLATE: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub max_per_template: usize,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            max_per_template: DEFAULT_MAX_PER_TEMPLATE,
        }
    }
}

/// A template left out of the run because its data cannot be expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedTemplate {
    pub template_id: TemplateId,
    pub issue: TemplateIssue,
}

/// A candidate date whose insert failed at the store.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedOccurrence {
    pub template_id: TemplateId,
    pub date: NaiveDate,
    pub reason: String,
}

/// A template whose remaining dates were left for a later run by the per-template limit.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredTemplate {
    pub template_id: TemplateId,
    /// First candidate date that was not attempted.
    pub next_date: NaiveDate,
}

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub run_id: Uuid,
    pub window: DateWindow,
    /// Rows created by this run; dates that already had an occurrence are omitted.
    pub created: Vec<Occurrence>,
    pub skipped_templates: Vec<SkippedTemplate>,
    pub failed: Vec<FailedOccurrence>,
    pub deferred: Vec<DeferredTemplate>,
    pub interrupted: Option<Interruption>,
}

impl GenerationSummary {
    fn new(run_id: Uuid, window: DateWindow) -> Self {
        Self {
            run_id,
            window,
            created: Vec::new(),
            skipped_templates: Vec::new(),
            failed: Vec::new(),
            deferred: Vec::new(),
            interrupted: None,
        }
    }

    pub fn created_count(&self) -> usize {
        self.created.len()
    }

    /// True when every candidate in the window was attempted.
    pub fn is_complete(&self) -> bool {
        self.interrupted.is_none() && self.deferred.is_empty()
    }
}

/// Expands recurring templates into occurrences and persists the missing ones.
///
/// Stateless between runs: whether a date was already generated is answered by
/// the store, so repeated runs over the same window create nothing new.
/// Templates and candidates are processed sequentially. Callers must not run
/// overlapping generations against a store that keeps the default,
/// non-atomic [`TemplateStore::create_if_absent`].
pub struct OccurrenceGenerator {
    store: Arc<dyn TemplateStore>,
    options: GeneratorOptions,
}

impl OccurrenceGenerator {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self::with_options(store, GeneratorOptions::default())
    }

    pub fn with_options(store: Arc<dyn TemplateStore>, options: GeneratorOptions) -> Self {
        Self { store, options }
    }

    pub fn generate(&self, window: DateWindow) -> Result<GenerationSummary, CoreError> {
        self.generate_with(window, &CancelToken::new())
    }

    /// Runs generation, stopping early once `cancel` reports an interruption.
    ///
    /// Only a failure to list templates aborts the call. Failed inserts are
    /// logged, recorded in [`GenerationSummary::failed`], and skipped.
    pub fn generate_with(
        &self,
        window: DateWindow,
        cancel: &CancelToken,
    ) -> Result<GenerationSummary, CoreError> {
        let run_id = Uuid::new_v4();
        let span = info_span!("generate", %run_id, %window);
        let _entered = span.enter();

        let templates = self.store.list_recurring_templates()?;
        let mut summary = GenerationSummary::new(run_id, window);

        'templates: for template in &templates {
            if let Err(issue) = template.eligibility() {
                warn!(template_id = %template.id, %issue, "skipping ineligible template");
                summary.skipped_templates.push(SkippedTemplate {
                    template_id: template.id,
                    issue,
                });
                continue;
            }

            let mut created_for_template = 0usize;
            for date in expand(template, window) {
                if let Some(reason) = cancel.check() {
                    warn!(%reason, created = summary.created.len(), "generation interrupted");
                    summary.interrupted = Some(reason);
                    break 'templates;
                }
                if created_for_template >= self.options.max_per_template {
                    warn!(
                        template_id = %template.id,
                        limit = self.options.max_per_template,
                        %date,
                        "per-template limit reached, deferring remaining dates"
                    );
                    summary.deferred.push(DeferredTemplate {
                        template_id: template.id,
                        next_date: date,
                    });
                    break;
                }
                match self.store.create_if_absent(template.occurrence_on(date)) {
                    Ok(Insertion::Created(occurrence)) => {
                        debug!(template_id = %template.id, %date, id = %occurrence.id, "created occurrence");
                        created_for_template += 1;
                        summary.created.push(occurrence);
                    }
                    Ok(Insertion::AlreadyPresent) => {
                        debug!(template_id = %template.id, %date, "occurrence already present");
                    }
                    Err(err) => {
                        error!(template_id = %template.id, %date, error = %err, "failed to create occurrence");
                        summary.failed.push(FailedOccurrence {
                            template_id: template.id,
                            date,
                            reason: err.to_string(),
                        });
                    }
                }
            }
        }

        info!(
            templates = templates.len(),
            created = summary.created_count(),
            skipped = summary.skipped_templates.len(),
            failed = summary.failed.len(),
            deferred = summary.deferred.len(),
            "recurring generation finished"
        );
        Ok(summary)
    }
}
