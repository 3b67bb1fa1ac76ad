//! fintrack-core
//!
//! Recurring-occurrence generation and the store contract it runs against.
//! Depends on fintrack-domain. No CLI, no transport, no concrete persistence
//! beyond the in-memory store.

pub mod cancel;
pub mod error;
pub mod generator;
pub mod memory;
pub mod store;
pub mod time;

pub use cancel::{CancelToken, Interruption};
pub use error::{CoreError, StoreError};
pub use generator::{
    DeferredTemplate, FailedOccurrence, GenerationSummary, GeneratorOptions, OccurrenceGenerator,
    SkippedTemplate, DEFAULT_MAX_PER_TEMPLATE,
};
pub use memory::InMemoryTemplateStore;
pub use store::{Insertion, TemplateStore};
pub use time::{Clock, FixedClock, SystemClock};
