#![doc(test(attr(deny(warnings))))]

//! fintrack expands recurring transaction templates into dated occurrences,
//! exposing the `POST /recurring/generate` contract and a small CLI on top of
//! the workspace crates.

pub mod api;
pub mod cli;
pub mod utils;

pub use fintrack_config as config;
pub use fintrack_core as core;
pub use fintrack_domain as domain;
pub use fintrack_storage_json as storage;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing with the default directive and emits a startup info log.
pub fn init() {
    init_with_filter(&fintrack_config::Config::default_log_filter_value());
}

/// Initializes global tracing, layering `directive` on top of `RUST_LOG`.
pub fn init_with_filter(directive: &str) {
    INIT_TRACING.call_once(|| {
        utils::init_tracing(directive);
        tracing::info!("fintrack tracing initialized.");
    });
}
