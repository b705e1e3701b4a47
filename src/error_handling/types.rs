//! Error type definitions.
//!
//! This module defines the hard errors returned to callers and the error,
//! warning, and info categories counted while checking a document.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Errors in the caller's input. These abort the request; they are never
/// folded into a report.
#[derive(Error, Debug)]
pub enum InputError {
    /// The email document was empty or whitespace only.
    #[error("Email document is empty")]
    EmptyDocument,

    /// The email document contains no markup at all.
    #[error("Email document is not HTML (no elements found)")]
    NotHtml,

    /// The requirements document is not valid JSON.
    #[error("Requirements document is not valid JSON: {0}")]
    InvalidRequirementsJson(#[from] serde_json::Error),

    /// The requirements document parsed, but its top level is not an object.
    #[error("Requirements document must be a JSON object, found {0}")]
    RequirementsNotAnObject(&'static str),

    /// A locale code outside the supported table was requested.
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// An input file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors loading the domain configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read domain configuration {path}: {source}")]
    Read {
        /// Path that failed to read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for the expected shape.
    #[error("Invalid domain configuration: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The remote browser backend was selected without an API key.
    #[error("Remote browser backend needs an API key in ${0}")]
    MissingApiKey(&'static str),
}

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Errors from the one-shot [`validate_email`](crate::validate_email) entry point.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Initialization(#[from] InitializationError),
}

/// Categories of destination-check failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorType {
    // HTTP/Network errors
    HttpRequestBuilderError,
    HttpRequestRedirectError,
    HttpRequestTimeoutError,
    HttpRequestConnectError,
    HttpRequestBodyError,
    HttpRequestDecodeError,
    HttpRequestOtherError,
    // Specific HTTP status code errors
    HttpRequestTooManyRequests,     // 429 Too Many Requests
    HttpRequestBotDetectionError,   // 403 Forbidden - typically bot detection
    HttpRequestBadRequest,          // 400 Bad Request
    HttpRequestUnauthorized,        // 401 Unauthorized
    HttpRequestNotFound,            // 404 Not Found
    HttpRequestGone,                // 410 Gone
    HttpRequestInternalServerError, // 500 Internal Server Error
    HttpRequestBadGateway,          // 502 Bad Gateway
    HttpRequestServiceUnavailable,  // 503 Service Unavailable
    HttpRequestGatewayTimeout,      // 504 Gateway Timeout
    // Check-level failures
    ProbeTaskTimeout,
    ProbeTaskPanicked,
    BrowserCheckError,
}

/// Extraction gaps: data the document was expected to carry but did not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
#[allow(clippy::enum_variant_names)] // All variants start with "Missing" by design
pub enum WarningType {
    MissingSender,
    MissingSubject,
    MissingPreheader,
    MissingFooterCampaignCode,
    MissingCopyright,
    MissingAltText,
}

/// Notable events that are neither failures nor gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum InfoType {
    HttpRedirect,
    HeadFallbackToGet,
    RetriedProbe,
    BotProtection,
    NonHttpLinkSkipped,
    UnresolvedRelativeLink,
    TrackingPixel,
    DeadlineExceeded,
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::HttpRequestBuilderError => "HTTP request builder error",
            ErrorType::HttpRequestRedirectError => "HTTP request redirect error",
            ErrorType::HttpRequestTimeoutError => "HTTP request timeout error",
            ErrorType::HttpRequestConnectError => "HTTP request connect error",
            ErrorType::HttpRequestBodyError => "HTTP request body error",
            ErrorType::HttpRequestDecodeError => "HTTP request decode error",
            ErrorType::HttpRequestOtherError => "HTTP request other error",
            ErrorType::HttpRequestTooManyRequests => "Too many requests (429)",
            ErrorType::HttpRequestBotDetectionError => "Bot detection (403 Forbidden)",
            ErrorType::HttpRequestBadRequest => "Bad Request (400)",
            ErrorType::HttpRequestUnauthorized => "Unauthorized (401)",
            ErrorType::HttpRequestNotFound => "Not Found (404)",
            ErrorType::HttpRequestGone => "Gone (410)",
            ErrorType::HttpRequestInternalServerError => "Internal Server Error (500)",
            ErrorType::HttpRequestBadGateway => "Bad Gateway (502)",
            ErrorType::HttpRequestServiceUnavailable => "Service Unavailable (503)",
            ErrorType::HttpRequestGatewayTimeout => "Gateway Timeout (504)",
            ErrorType::ProbeTaskTimeout => "Destination check timed out",
            ErrorType::ProbeTaskPanicked => "Destination check panicked",
            ErrorType::BrowserCheckError => "Browser check error",
        }
    }
}

impl WarningType {
    /// Returns a human-readable string representation of the warning type.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningType::MissingSender => "Missing sender",
            WarningType::MissingSubject => "Missing subject",
            WarningType::MissingPreheader => "Missing preheader",
            WarningType::MissingFooterCampaignCode => "Missing footer campaign code",
            WarningType::MissingCopyright => "Missing copyright year",
            WarningType::MissingAltText => "Missing image alt text",
        }
    }
}

impl InfoType {
    /// Returns a human-readable string representation of the info type.
    pub fn as_str(&self) -> &'static str {
        match self {
            InfoType::HttpRedirect => "HTTP redirect",
            InfoType::HeadFallbackToGet => "HEAD rejected, retried with GET",
            InfoType::RetriedProbe => "Probe retried",
            InfoType::BotProtection => "Bot protection detected",
            InfoType::NonHttpLinkSkipped => "Non-HTTP link skipped",
            InfoType::UnresolvedRelativeLink => "Unresolved relative link",
            InfoType::TrackingPixel => "Tracking pixel",
            InfoType::DeadlineExceeded => "Phase-2 deadline exceeded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_error_type_as_str() {
        assert_eq!(
            ErrorType::HttpRequestTimeoutError.as_str(),
            "HTTP request timeout error"
        );
        assert_eq!(
            ErrorType::HttpRequestBotDetectionError.as_str(),
            "Bot detection (403 Forbidden)"
        );
        assert_eq!(ErrorType::HttpRequestNotFound.to_string(), "Not Found (404)");
    }

    #[test]
    fn test_all_types_have_string_representation() {
        for error_type in ErrorType::iter() {
            assert!(!error_type.as_str().is_empty(), "{:?}", error_type);
        }
        for warning_type in WarningType::iter() {
            assert!(!warning_type.as_str().is_empty(), "{:?}", warning_type);
        }
        for info_type in InfoType::iter() {
            assert!(!info_type.as_str().is_empty(), "{:?}", info_type);
        }
    }

    #[test]
    fn test_input_error_messages() {
        assert_eq!(InputError::EmptyDocument.to_string(), "Email document is empty");
        assert_eq!(
            InputError::RequirementsNotAnObject("array").to_string(),
            "Requirements document must be a JSON object, found array"
        );
        assert_eq!(
            InputError::UnsupportedLocale("xx_YY".into()).to_string(),
            "Unsupported locale: xx_YY"
        );
        let json_err = serde_json::from_str::<serde_json::Value>("{").expect_err("invalid");
        assert!(InputError::from(json_err)
            .to_string()
            .starts_with("Requirements document is not valid JSON"));
    }
}
