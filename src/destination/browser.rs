//! Phase 2: product-listing detection through a browser capability.
//!
//! The capability answers one question for one page: is a product-listing
//! marker present? Two backends ship with the crate:
//! - [`StaticBrowser`] fetches the page directly and inspects the HTML
//! - [`RemoteBrowser`] asks a rendering service for the JavaScript-rendered HTML
//!
//! Anything else (a local headless browser, a test fake) implements
//! [`BrowserCapability`] directly.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use scraper::Html;
use serde::Serialize;
use url::Url;

use super::headers::{has_bot_signature, RequestHeaders};
use crate::config::{
    BOT_PROTECTION_MARKERS, COMMON_PRODUCT_MARKERS, GENERIC_PRODUCT_MARKER,
    HTTP_STATUS_FORBIDDEN, HTTP_STATUS_TOO_MANY_REQUESTS, MAX_RESPONSE_BODY_SIZE,
};
use crate::report::VerdictStatus;
use crate::utils::parse_selector_with_fallback;

/// Raw answer from a browser capability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrowserCheck {
    /// `Some(true)` when a marker was found, `None` when the page was not inspected
    pub found: Option<bool>,
    /// The marker that matched
    pub marker_name: Option<String>,
    /// The site answered with a bot-protection challenge
    pub blocked: bool,
    /// The check could not be completed
    pub error: Option<String>,
}

impl BrowserCheck {
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self {
            blocked: true,
            error: Some(reason.into()),
            ..Default::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

/// Product-listing verdict merged into a link record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDetection {
    pub status: VerdictStatus,
    pub found: Option<bool>,
    pub marker_name: Option<String>,
    pub blocked: bool,
    pub details: Option<String>,
}

impl ProductDetection {
    /// A WARN detection for a check that never produced an answer.
    pub fn inconclusive(details: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Warn,
            found: None,
            marker_name: None,
            blocked: false,
            details: Some(details.into()),
        }
    }
}

impl From<BrowserCheck> for ProductDetection {
    /// Blocked and errored checks are WARN whatever `found` says; otherwise
    /// found is PASS and not-found is FAIL.
    fn from(check: BrowserCheck) -> Self {
        let (status, details) = if check.blocked {
            (
                VerdictStatus::Warn,
                Some(format!(
                    "bot protection blocked the check{}",
                    check.error.as_deref().map(|e| format!(": {}", e)).unwrap_or_default()
                )),
            )
        } else if let Some(error) = &check.error {
            (VerdictStatus::Warn, Some(error.clone()))
        } else {
            match check.found {
                Some(true) => (
                    VerdictStatus::Pass,
                    check.marker_name.as_ref().map(|m| format!("found marker {}", m)),
                ),
                Some(false) => (
                    VerdictStatus::Fail,
                    Some("no product-listing marker on page".to_string()),
                ),
                None => (VerdictStatus::Warn, Some("detection inconclusive".to_string())),
            }
        };
        Self {
            status,
            found: check.found,
            marker_name: check.marker_name,
            blocked: check.blocked,
            details,
        }
    }
}

/// Answers "does this page show a product listing".
///
/// `markers` are the class-name markers expected for the page's domain, in
/// priority order. Implementations must honor `timeout` and report problems
/// in the returned [`BrowserCheck`] instead of panicking.
pub trait BrowserCapability: Send + Sync {
    fn check<'a>(
        &'a self,
        url: &'a Url,
        markers: &'a [String],
        timeout: Duration,
    ) -> BoxFuture<'a, BrowserCheck>;
}

/// Fetches the destination page directly.
pub struct StaticBrowser {
    client: Arc<reqwest::Client>,
}

impl StaticBrowser {
    pub fn new(client: Arc<reqwest::Client>) -> Self {
        Self { client }
    }
}

impl BrowserCapability for StaticBrowser {
    fn check<'a>(
        &'a self,
        url: &'a Url,
        markers: &'a [String],
        timeout: Duration,
    ) -> BoxFuture<'a, BrowserCheck> {
        Box::pin(async move {
            let builder = RequestHeaders::apply_to_request_builder(self.client.get(url.clone()))
                .timeout(timeout);
            fetch_and_detect(builder, markers, true).await
        })
    }
}

/// Fetches rendered HTML from a remote rendering service.
///
/// The service is called as `GET {endpoint}?api_key=..&url=..&render_js=true`.
pub struct RemoteBrowser {
    client: Arc<reqwest::Client>,
    endpoint: String,
    api_key: String,
}

impl RemoteBrowser {
    pub fn new(client: Arc<reqwest::Client>, endpoint: String, api_key: String) -> Self {
        Self {
            client,
            endpoint,
            api_key,
        }
    }
}

impl BrowserCapability for RemoteBrowser {
    fn check<'a>(
        &'a self,
        url: &'a Url,
        markers: &'a [String],
        timeout: Duration,
    ) -> BoxFuture<'a, BrowserCheck> {
        Box::pin(async move {
            let builder = self
                .client
                .get(&self.endpoint)
                .query(&[
                    ("api_key", self.api_key.as_str()),
                    ("url", url.as_str()),
                    ("render_js", "true"),
                ])
                .timeout(timeout);
            fetch_and_detect(builder, markers, false).await
        })
    }
}

/// Sends the request and searches the returned HTML.
///
/// `direct` is true when the response comes from the destination itself, so
/// its status codes speak for the site rather than for a rendering service.
async fn fetch_and_detect(
    builder: reqwest::RequestBuilder,
    markers: &[String],
    direct: bool,
) -> BrowserCheck {
    let mut response = match builder.send().await {
        Ok(response) => response,
        Err(e) => return BrowserCheck::failed(format!("request failed: {}", e)),
    };

    let status = response.status().as_u16();
    if direct
        && (status == HTTP_STATUS_FORBIDDEN
            || status == HTTP_STATUS_TOO_MANY_REQUESTS
            || (status == 503 && has_bot_signature(response.headers())))
    {
        return BrowserCheck::blocked(format!("HTTP {}", status));
    }
    if !response.status().is_success() {
        let source = if direct { "page" } else { "rendering service" };
        return BrowserCheck::failed(format!("{} returned HTTP {}", source, status));
    }

    let mut body = Vec::new();
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let room = MAX_RESPONSE_BODY_SIZE.saturating_sub(body.len());
                body.extend_from_slice(&chunk[..chunk.len().min(room)]);
                if body.len() >= MAX_RESPONSE_BODY_SIZE {
                    log::debug!("Page body truncated at {} bytes", MAX_RESPONSE_BODY_SIZE);
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => return BrowserCheck::failed(format!("failed to read page: {}", e)),
        }
    }

    detect_product_markers(&String::from_utf8_lossy(&body), markers)
}

/// Searches element class lists for a product-listing marker.
///
/// Markers are tried in order: the domain's `expected` markers, the common
/// markers, then any class containing `product`. A page with no marker that
/// looks like a bot challenge is reported as blocked.
pub fn detect_product_markers(html: &str, expected: &[String]) -> BrowserCheck {
    let document = Html::parse_document(html);
    let candidates = expected
        .iter()
        .map(|m| (m.as_str(), m.as_str()))
        .chain(COMMON_PRODUCT_MARKERS.iter().map(|m| (*m, *m)))
        .chain(std::iter::once(("product", GENERIC_PRODUCT_MARKER)));

    for (needle, reported) in candidates {
        let selector =
            parse_selector_with_fallback(&format!("[class*=\"{}\"]", needle), "product marker lookup");
        if document.select(&selector).next().is_some() {
            log::debug!("Product marker {} found", reported);
            return BrowserCheck {
                found: Some(true),
                marker_name: Some(reported.to_string()),
                ..Default::default()
            };
        }
    }

    let lower = html.to_ascii_lowercase();
    if let Some(marker) = BOT_PROTECTION_MARKERS.iter().find(|m| lower.contains(*m)) {
        return BrowserCheck::blocked(format!("challenge page ({})", marker));
    }

    BrowserCheck {
        found: Some(false),
        ..Default::default()
    }
}
