//! Error handling and check statistics.
//!
//! This module provides:
//! - Hard error types returned to callers (`InputError`, `ConfigError`,
//!   `InitializationError`, `ValidationError`)
//! - Categories for destination-check failures, extraction gaps and notable events
//! - Thread-safe statistics for those categories
//! - Retry strategy configuration
//!
//! Validation mismatches are not errors; they surface as FAIL verdicts in the
//! report. Only unusable input aborts a request.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    categorize_reqwest_error, categorize_status, get_retry_strategy, is_retriable_status,
};
pub use stats::CheckStats;
pub use types::{
    ConfigError, ErrorType, InfoType, InitializationError, InputError, ValidationError,
    WarningType,
};
