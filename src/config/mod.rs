//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, retry backoff, product markers)
//! - The library `Config` and the enums shared with the CLI
//! - Per-domain destination settings loaded from JSON

mod constants;
mod domains;
mod types;

// Re-export all constants
pub use constants::*;
pub use domains::{DomainEntry, DomainSettings, GlobalSettings};
pub use types::{BrowserBackend, BrowserMode, Config, FailOn, LogFormat, LogLevel};
