//! Shared helpers for compiling static selectors and regular expressions.
//!
//! Both helpers are meant for `LazyLock` statics whose input is a
//! compile-time constant, so a failure is a programming error.

mod selector;

use regex::Regex;

pub use selector::{parse_selector_unsafe, parse_selector_with_fallback};

/// Compiles a static regex pattern, panicking with context on failure.
pub fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}
