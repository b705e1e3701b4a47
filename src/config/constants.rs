//! Configuration constants.
//!
//! This module defines the defaults used throughout the validator: network
//! timeouts, retry backoff, concurrency limits and the product-listing
//! markers searched for on destination pages.

use std::time::Duration;

/// Per-request timeout in seconds for reachability probes
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// Retries after the first attempt for a reachability probe
pub const DEFAULT_MAX_RETRIES: usize = 2;
/// Maximum number of destination URLs checked at the same time
pub const DEFAULT_MAX_CONCURRENCY: usize = 10;
/// Timeout handed to the browser capability for a single page
pub const DEFAULT_BROWSER_TIMEOUT_SECS: u64 = 30;
/// Wall-clock cap for the whole product-detection phase
pub const DEFAULT_PHASE2_DEADLINE_SECS: u64 = 120;

/// Slack added on top of the request timeout before a probe task is abandoned.
///
/// The per-request timeout already bounds each attempt; this guard covers the
/// retry backoff sleeps so one URL can never stall the rest of the run.
pub const PROBE_TASK_GRACE: Duration = Duration::from_secs(5);

/// Maximum number of redirect hops followed by the probe client
pub const MAX_REDIRECT_HOPS: usize = 10;

/// Maximum destination page body inspected for product markers (2MB)
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;

// Retry strategy
/// Base of the exponential backoff in milliseconds (delays: base^n * factor)
pub const RETRY_BASE_MS: u64 = 2;
/// Multiplier applied to each backoff step (2 * 100 = 200ms, then 400ms, 800ms...)
pub const RETRY_FACTOR: u64 = 100;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 5;

pub const HTTP_STATUS_FORBIDDEN: u16 = 403;
pub const HTTP_STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Default User-Agent string for destination requests.
///
/// Mimics a current desktop Chrome; many retail sites refuse obvious bots
/// outright, which would turn every product check into a WARN.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Product-listing markers used when a domain does not configure its own.
pub const DEFAULT_PRODUCT_MARKERS: &[&str] = &["product-table", "productListContainer"];

/// Generic markers tried after the domain's expected markers.
pub const COMMON_PRODUCT_MARKERS: &[&str] = &[
    "product-list",
    "product-grid",
    "product-container",
    "product-row",
    "products-grid",
];

/// Marker name reported when only a generic `product` class was found.
pub const GENERIC_PRODUCT_MARKER: &str = "product-related-element";

/// Page fragments that identify an automated-traffic challenge page.
pub const BOT_PROTECTION_MARKERS: &[&str] = &[
    "captcha",
    "cf-browser-verification",
    "challenge-platform",
    "just a moment...",
    "attention required",
    "access denied",
];

/// Default language for documents that do not declare one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Remote rendering service used by the `remote` browser backend.
pub const DEFAULT_REMOTE_ENDPOINT: &str = "https://app.scrapingbee.com/api/v1/";

/// Environment variable holding the remote rendering service key.
pub const REMOTE_API_KEY_ENV: &str = "SCRAPING_API_KEY";
