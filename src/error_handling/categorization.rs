//! Error categorization and retry strategy.
//!
//! This module maps HTTP statuses and `reqwest` errors onto `ErrorType` and
//! configures the exponential backoff used by reachability probes.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use super::types::ErrorType;
use crate::config::{RETRY_BASE_MS, RETRY_FACTOR, RETRY_MAX_DELAY_SECS};

/// Creates an exponential backoff retry strategy.
///
/// Delays follow `RETRY_BASE_MS^n * RETRY_FACTOR` (200ms, 400ms, 800ms...),
/// capped at `RETRY_MAX_DELAY_SECS`, and the iterator yields exactly
/// `max_retries` delays so the total attempt count is `max_retries + 1`.
pub fn get_retry_strategy(max_retries: usize) -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(RETRY_BASE_MS)
        .factor(RETRY_FACTOR)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .take(max_retries)
}

/// Categorizes an HTTP error status.
///
/// Returns `None` for statuses that are not errors (1xx-3xx).
pub fn categorize_status(status: u16) -> Option<ErrorType> {
    let error_type = match status {
        400 => ErrorType::HttpRequestBadRequest,
        401 => ErrorType::HttpRequestUnauthorized,
        403 => ErrorType::HttpRequestBotDetectionError,
        404 => ErrorType::HttpRequestNotFound,
        410 => ErrorType::HttpRequestGone,
        429 => ErrorType::HttpRequestTooManyRequests,
        500 => ErrorType::HttpRequestInternalServerError,
        502 => ErrorType::HttpRequestBadGateway,
        503 => ErrorType::HttpRequestServiceUnavailable,
        504 => ErrorType::HttpRequestGatewayTimeout,
        400..=599 => ErrorType::HttpRequestOtherError,
        _ => return None,
    };
    Some(error_type)
}

/// Categorizes a `reqwest::Error` into an `ErrorType`.
pub fn categorize_reqwest_error(error: &reqwest::Error) -> ErrorType {
    if let Some(error_type) = error.status().and_then(|s| categorize_status(s.as_u16())) {
        return error_type;
    }

    if error.is_builder() {
        ErrorType::HttpRequestBuilderError
    } else if error.is_redirect() {
        ErrorType::HttpRequestRedirectError
    } else if error.is_timeout() {
        ErrorType::HttpRequestTimeoutError
    } else if error.is_connect() {
        ErrorType::HttpRequestConnectError
    } else if error.is_body() {
        ErrorType::HttpRequestBodyError
    } else if error.is_decode() {
        ErrorType::HttpRequestDecodeError
    } else {
        ErrorType::HttpRequestOtherError
    }
}

/// Whether a response status is worth another attempt.
///
/// 5xx and 429 are transient; every other status is final.
pub fn is_retriable_status(status: u16) -> bool {
    status == crate::config::HTTP_STATUS_TOO_MANY_REQUESTS || (500..600).contains(&status)
}
