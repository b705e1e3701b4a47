//! Configuration types and CLI value enums.
//!
//! This module defines the library configuration struct together with the
//! enums shared with the command-line interface.

use std::time::Duration;

use clap::ValueEnum;
use url::Url;

use crate::config::constants::{
    DEFAULT_BROWSER_TIMEOUT_SECS, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_RETRIES,
    DEFAULT_PHASE2_DEADLINE_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Exit code policy applied by the binary after a report is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum FailOn {
    /// Always exit 0 when a report was produced
    Never,
    /// Exit 2 when any verdict is FAIL
    AnyFailure,
    /// Exit 2 when any verdict is FAIL or WARN
    Warnings,
}

/// Browser backend selector as it appears on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BrowserMode {
    /// No product-listing detection
    Disabled,
    /// Fetch the page directly and inspect the static HTML
    Static,
    /// Ask a remote rendering service for the page HTML
    Remote,
}

/// Backend used to answer "does this page show a product listing".
///
/// Chosen once when the checker is built instead of flipping a global
/// dev/prod switch at runtime.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum BrowserBackend {
    /// Product detection is not performed
    Disabled,
    /// Direct HTTP fetch of the destination page
    #[default]
    Static,
    /// Rendering service reached at `endpoint` and authenticated with `api_key`
    Remote {
        /// Service endpoint, queried with `url` and `api_key` parameters
        endpoint: String,
        /// Service API key
        api_key: String,
    },
}

/// Library configuration (no CLI dependencies).
///
/// # Examples
///
/// ```no_run
/// use email_qa::Config;
///
/// let config = Config {
///     check_links: true,
///     max_concurrency: 4,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Per-request timeout in seconds
    pub timeout_seconds: u64,

    /// Retries after the first reachability attempt
    pub max_retries: usize,

    /// Maximum destination URLs checked concurrently
    pub max_concurrency: usize,

    /// HTTP User-Agent header value
    pub user_agent: String,

    /// Base URL for resolving relative links
    pub base_url: Option<Url>,

    /// Run phase 1 (reachability) destination checks
    pub check_links: bool,

    /// Run phase 2 (product-listing) destination checks
    pub check_products: bool,

    /// Product detection backend
    pub browser: BrowserBackend,

    /// Timeout handed to the browser capability per page, in seconds
    pub browser_timeout_seconds: u64,

    /// Wall-clock cap for the whole product-detection phase, in seconds
    pub deadline_seconds: u64,
}

impl Config {
    /// Per-request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Browser capability timeout as a `Duration`.
    pub fn browser_timeout(&self) -> Duration {
        Duration::from_secs(self.browser_timeout_seconds)
    }

    /// Phase-2 deadline as a `Duration`.
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            base_url: None,
            check_links: true,
            check_products: false,
            browser: BrowserBackend::Static,
            browser_timeout_seconds: DEFAULT_BROWSER_TIMEOUT_SECS,
            deadline_seconds: DEFAULT_PHASE2_DEADLINE_SECS,
        }
    }
}
