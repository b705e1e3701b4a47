//! Phase 1: reachability probes.
//!
//! A probe sends HEAD (falling back to GET when the server rejects HEAD),
//! retries transient failures with exponential backoff, and classifies the
//! final outcome into a verdict.

use std::sync::atomic::{AtomicU32, Ordering};

use reqwest::{Method, StatusCode};
use serde::Serialize;
use tokio_retry::RetryIf;
use url::Url;

use super::headers::{has_bot_signature, RequestHeaders};
use crate::config::{HTTP_STATUS_FORBIDDEN, HTTP_STATUS_TOO_MANY_REQUESTS};
use crate::error_handling::{
    categorize_reqwest_error, categorize_status, get_retry_strategy, is_retriable_status,
    CheckStats, ErrorType, InfoType,
};
use crate::report::VerdictStatus;

/// Outcome of a reachability probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReachabilityResult {
    pub status: VerdictStatus,
    /// Final HTTP status, when a response was received
    pub http_status: Option<u16>,
    /// URL after redirects, when it differs from the probed URL
    pub final_url: Option<String>,
    /// Requests made, including retries
    pub attempts: u32,
    pub details: Option<String>,
}

impl ReachabilityResult {
    /// A WARN result with no HTTP exchange behind it.
    pub fn inconclusive(details: impl Into<String>) -> Self {
        Self {
            status: VerdictStatus::Warn,
            http_status: None,
            final_url: None,
            attempts: 0,
            details: Some(details.into()),
        }
    }
}

#[derive(Debug)]
struct ProbeResponse {
    status: u16,
    final_url: Url,
    bot_signature: bool,
}

#[derive(Debug, thiserror::Error)]
enum ProbeError {
    #[error("retriable HTTP status {}", .0.status)]
    Status(ProbeResponse),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

impl ProbeError {
    fn is_retriable(&self) -> bool {
        match self {
            ProbeError::Status(_) => true,
            ProbeError::Request(e) => e.is_timeout() || e.is_connect(),
        }
    }
}

/// Probes one URL, retrying up to `max_retries` times.
pub(crate) async fn probe_url(
    client: &reqwest::Client,
    url: &Url,
    max_retries: usize,
    stats: &CheckStats,
) -> ReachabilityResult {
    let attempts = AtomicU32::new(0);
    let result = RetryIf::spawn(
        get_retry_strategy(max_retries),
        || {
            attempts.fetch_add(1, Ordering::SeqCst);
            send_probe(client, url, stats)
        },
        ProbeError::is_retriable,
    )
    .await;

    let attempts = attempts.load(Ordering::SeqCst);
    if attempts > 1 {
        stats.increment_info(InfoType::RetriedProbe);
    }

    match result {
        Ok(response) | Err(ProbeError::Status(response)) => {
            classify_response(url, response, attempts, stats)
        }
        Err(ProbeError::Request(e)) => classify_request_error(url, &e, attempts, stats),
    }
}

async fn send_probe(
    client: &reqwest::Client,
    url: &Url,
    stats: &CheckStats,
) -> Result<ProbeResponse, ProbeError> {
    let mut response = request(client, Method::HEAD, url).send().await?;
    if matches!(
        response.status(),
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
    ) {
        log::debug!("HEAD rejected by {}, retrying with GET", url);
        stats.increment_info(InfoType::HeadFallbackToGet);
        response = request(client, Method::GET, url).send().await?;
    }

    let probe = ProbeResponse {
        status: response.status().as_u16(),
        final_url: response.url().clone(),
        bot_signature: has_bot_signature(response.headers()),
    };
    if is_retriable_status(probe.status) && !probe.bot_signature {
        return Err(ProbeError::Status(probe));
    }
    Ok(probe)
}

fn request(client: &reqwest::Client, method: Method, url: &Url) -> reqwest::RequestBuilder {
    RequestHeaders::apply_to_request_builder(client.request(method, url.clone()))
}

fn classify_response(
    url: &Url,
    response: ProbeResponse,
    attempts: u32,
    stats: &CheckStats,
) -> ReachabilityResult {
    let code = response.status;
    let final_url = (response.final_url != *url).then(|| response.final_url.to_string());
    if final_url.is_some() {
        stats.increment_info(InfoType::HttpRedirect);
    }

    let (status, details) = match code {
        200..=399 => (VerdictStatus::Pass, None),
        HTTP_STATUS_FORBIDDEN | HTTP_STATUS_TOO_MANY_REQUESTS => {
            stats.increment_info(InfoType::BotProtection);
            (
                VerdictStatus::Warn,
                Some(format!("HTTP {}: likely bot protection or rate limiting", code)),
            )
        }
        503 if response.bot_signature => {
            stats.increment_info(InfoType::BotProtection);
            (
                VerdictStatus::Warn,
                Some("HTTP 503 with bot-protection challenge".to_string()),
            )
        }
        _ => {
            let error_type = categorize_status(code).unwrap_or(ErrorType::HttpRequestOtherError);
            stats.increment_error(error_type);
            (VerdictStatus::Fail, Some(format!("HTTP {}: {}", code, error_type)))
        }
    };

    if status != VerdictStatus::Pass {
        log::warn!("{} -> HTTP {} ({}) after {} attempt(s)", url, code, status, attempts);
    } else {
        log::debug!("{} -> HTTP {}", url, code);
    }

    ReachabilityResult {
        status,
        http_status: Some(code),
        final_url,
        attempts,
        details,
    }
}

fn classify_request_error(
    url: &Url,
    error: &reqwest::Error,
    attempts: u32,
    stats: &CheckStats,
) -> ReachabilityResult {
    let error_type = categorize_reqwest_error(error);
    stats.increment_error(error_type);
    let status = if error_type == ErrorType::HttpRequestTimeoutError {
        VerdictStatus::Warn
    } else {
        VerdictStatus::Fail
    };
    log::warn!("{} -> {} after {} attempt(s): {}", url, error_type, attempts, error);
    ReachabilityResult {
        status,
        http_status: error.status().map(|s| s.as_u16()),
        final_url: None,
        attempts,
        details: Some(error_type.to_string()),
    }
}
