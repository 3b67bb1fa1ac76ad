//! fintrack-domain
//!
//! Pure domain models for recurring transactions (templates, occurrences, windows)
//! and the calendar logic that steps through them. No I/O, no storage.

pub mod frequency;
pub mod occurrence;
pub mod template;
pub mod window;

pub use frequency::*;
pub use occurrence::*;
pub use template::*;
pub use window::*;
