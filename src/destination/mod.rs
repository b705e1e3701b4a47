//! Destination checks for link targets.
//!
//! Two independent phases run per distinct URL:
//! 1. Reachability: HTTP probe with retries (fast, every web link)
//! 2. Product detection: browser capability query (slow, only for hosts
//!    configured with `product_table_check`)
//!
//! Each URL runs in its own task under a shared semaphore with a per-task
//! timeout, so one hanging site cannot stall the rest. Phase 2 is also capped
//! by a wall-clock deadline; URLs still pending at the deadline get a WARN.

mod browser;
mod headers;
mod reachability;

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::config::{BrowserBackend, Config, DomainSettings, PROBE_TASK_GRACE};
use crate::error_handling::{
    get_retry_strategy, CheckStats, ErrorType, InfoType, InitializationError,
};
use crate::initialization::{init_client, init_semaphore};
use crate::matcher::host_key;

// Re-export public API
pub use browser::{
    detect_product_markers, BrowserCapability, BrowserCheck, ProductDetection, RemoteBrowser,
    StaticBrowser,
};
pub use reachability::ReachabilityResult;

/// Runs reachability and product-detection checks.
///
/// The browser backend is fixed at construction (see [`BrowserBackend`]).
#[derive(Clone)]
pub struct DestinationChecker {
    client: Arc<reqwest::Client>,
    browser: Option<Arc<dyn BrowserCapability>>,
    domains: Arc<DomainSettings>,
    stats: Arc<CheckStats>,
    max_retries: usize,
    max_concurrency: usize,
    request_timeout: Duration,
    browser_timeout: Duration,
    deadline: Duration,
}

impl DestinationChecker {
    /// Builds a checker and its HTTP client from the library configuration.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the client cannot be built.
    pub fn new(
        config: &Config,
        domains: Arc<DomainSettings>,
        stats: Arc<CheckStats>,
    ) -> Result<Self, InitializationError> {
        let client = init_client(config)?;
        let browser: Option<Arc<dyn BrowserCapability>> = match &config.browser {
            BrowserBackend::Disabled => None,
            BrowserBackend::Static => Some(Arc::new(StaticBrowser::new(Arc::clone(&client)))),
            BrowserBackend::Remote { endpoint, api_key } => Some(Arc::new(RemoteBrowser::new(
                Arc::clone(&client),
                endpoint.clone(),
                api_key.clone(),
            ))),
        };
        Ok(Self {
            client,
            browser,
            domains,
            stats,
            max_retries: config.max_retries,
            max_concurrency: config.max_concurrency,
            request_timeout: config.request_timeout(),
            browser_timeout: config.browser_timeout(),
            deadline: config.deadline(),
        })
    }

    /// Replaces the browser capability (e.g. with a headless-browser adapter).
    pub fn with_browser(mut self, browser: Arc<dyn BrowserCapability>) -> Self {
        self.browser = Some(browser);
        self
    }

    pub fn stats(&self) -> &CheckStats {
        &self.stats
    }

    pub fn domains(&self) -> &DomainSettings {
        &self.domains
    }

    /// Whether a browser capability is configured.
    pub fn has_browser(&self) -> bool {
        self.browser.is_some()
    }

    /// Whether `url`'s host is configured for product-listing verification.
    pub fn requires_product_check(&self, url: &Url) -> bool {
        host_key(url).is_some_and(|host| self.domains.requires_product_check(&host))
    }

    /// Upper bound for one URL's probe: every attempt may time out twice
    /// (HEAD then GET), plus the backoff sleeps and a grace period.
    fn probe_task_timeout(&self) -> Duration {
        let attempts = u32::try_from(self.max_retries + 1).unwrap_or(u32::MAX);
        let backoff: Duration = get_retry_strategy(self.max_retries).sum();
        self.request_timeout
            .saturating_mul(2)
            .saturating_mul(attempts)
            .saturating_add(backoff)
            .saturating_add(PROBE_TASK_GRACE)
    }

    /// Phase 1: probes every distinct URL concurrently.
    ///
    /// Returns one result per distinct URL, keyed by the URL string. Results
    /// are never cached; every call re-queries the network.
    pub async fn check_reachability(&self, urls: &[Url]) -> HashMap<String, ReachabilityResult> {
        let unique: BTreeSet<&Url> = urls.iter().collect();
        if unique.is_empty() {
            return HashMap::new();
        }
        log::info!("Checking reachability of {} URLs", unique.len());

        let semaphore = init_semaphore(self.max_concurrency);
        let task_timeout = self.probe_task_timeout();
        let mut tasks = FuturesUnordered::new();

        for url in &unique {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    log::warn!("Semaphore closed, skipping URL: {}", url);
                    continue;
                }
            };
            let client = Arc::clone(&self.client);
            let stats = Arc::clone(&self.stats);
            let max_retries = self.max_retries;
            let url = (*url).clone();
            tasks.push(tokio::spawn(async move {
                let _permit = permit;
                let result = tokio::time::timeout(
                    task_timeout,
                    reachability::probe_url(&client, &url, max_retries, &stats),
                )
                .await;
                let result = result.unwrap_or_else(|_| {
                    stats.increment_error(ErrorType::ProbeTaskTimeout);
                    log::warn!("Timeout probing URL {}", url);
                    ReachabilityResult::inconclusive(ErrorType::ProbeTaskTimeout.as_str())
                });
                (url.to_string(), result)
            }));
        }

        let mut results = HashMap::with_capacity(unique.len());
        while let Some(task_result) = tasks.next().await {
            match task_result {
                Ok((key, result)) => {
                    results.insert(key, result);
                }
                Err(join_error) => {
                    self.stats.increment_error(ErrorType::ProbeTaskPanicked);
                    log::warn!("Probe task panicked: {:?}", join_error);
                }
            }
        }

        for url in unique {
            results.entry(url.to_string()).or_insert_with(|| {
                ReachabilityResult::inconclusive(ErrorType::ProbeTaskPanicked.as_str())
            });
        }
        results
    }

    /// Phase 2: queries the browser capability for every distinct URL.
    ///
    /// Callers choose the URLs (typically those whose host requires a product
    /// check and whose phase-1 result was not FAIL). When no capability is
    /// configured every URL gets an inconclusive WARN. URLs still pending when
    /// the deadline expires are cancelled and reported as WARN.
    pub async fn check_products(&self, urls: &[Url]) -> HashMap<String, ProductDetection> {
        let unique: BTreeSet<&Url> = urls.iter().collect();
        let Some(browser) = self.browser.as_ref() else {
            return unique
                .into_iter()
                .map(|url| {
                    (
                        url.to_string(),
                        ProductDetection::inconclusive("no browser capability configured"),
                    )
                })
                .collect();
        };
        if unique.is_empty() {
            return HashMap::new();
        }
        log::info!(
            "Checking product listings on {} URLs (deadline {:?})",
            unique.len(),
            self.deadline
        );

        let semaphore = init_semaphore(self.max_concurrency);
        let cancel = CancellationToken::new();
        let deadline = tokio::time::Instant::now() + self.deadline;
        let task_timeout = self.browser_timeout.saturating_add(PROBE_TASK_GRACE);
        let mut tasks = FuturesUnordered::new();

        for url in &unique {
            let url = (*url).clone();
            let markers = host_key(&url)
                .map(|host| self.domains.expected_markers(&host))
                .unwrap_or_default();
            let browser = Arc::clone(browser);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.child_token();
            let stats = Arc::clone(&self.stats);
            let browser_timeout = self.browser_timeout;
            tasks.push(tokio::spawn(async move {
                let detection = tokio::select! {
                    _ = cancel.cancelled() => None,
                    detection = async {
                        let _permit = semaphore.acquire_owned().await.ok()?;
                        let check = tokio::time::timeout(
                            task_timeout,
                            browser.check(&url, &markers, browser_timeout),
                        )
                        .await;
                        Some(match check {
                            Ok(check) => {
                                if check.blocked {
                                    stats.increment_info(InfoType::BotProtection);
                                } else if check.error.is_some() {
                                    stats.increment_error(ErrorType::BrowserCheckError);
                                }
                                ProductDetection::from(check)
                            }
                            Err(_) => {
                                stats.increment_error(ErrorType::ProbeTaskTimeout);
                                ProductDetection::inconclusive("browser check timed out")
                            }
                        })
                    } => detection,
                };
                (url.to_string(), detection)
            }));
        }

        let mut results = HashMap::with_capacity(unique.len());
        let mut deadline_expired = false;
        loop {
            tokio::select! {
                next = tasks.next() => match next {
                    Some(Ok((key, Some(detection)))) => {
                        results.insert(key, detection);
                    }
                    Some(Ok((_, None))) => {}
                    Some(Err(join_error)) => {
                        self.stats.increment_error(ErrorType::ProbeTaskPanicked);
                        log::warn!("Product check task panicked: {:?}", join_error);
                    }
                    None => break,
                },
                _ = tokio::time::sleep_until(deadline) => {
                    log::warn!(
                        "Product-check deadline of {:?} expired with {} URLs pending",
                        self.deadline,
                        unique.len().saturating_sub(results.len())
                    );
                    cancel.cancel();
                    deadline_expired = true;
                    break;
                }
            }
        }

        // Without an expired deadline, a missing URL means its task panicked.
        for url in unique {
            results.entry(url.to_string()).or_insert_with(|| {
                if deadline_expired {
                    self.stats.increment_info(InfoType::DeadlineExceeded);
                    ProductDetection::inconclusive("product check did not finish before the deadline")
                } else {
                    ProductDetection::inconclusive(ErrorType::ProbeTaskPanicked.as_str())
                }
            });
        }
        results
    }
}
