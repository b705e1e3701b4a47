//! Browser-like request headers.

/// Request headers that mimic a desktop Chrome navigation.
///
/// Retail sites commonly reject requests that look automated. `Accept-Encoding`
/// is left to `reqwest` so compressed bodies are decoded transparently.
pub(crate) struct RequestHeaders;

impl RequestHeaders {
    const ACCEPT: &'static str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";
    const ACCEPT_LANGUAGE: &'static str = "en-US,en;q=0.9";

    /// Applies the standard request headers to a `reqwest::RequestBuilder`.
    pub(crate) fn apply_to_request_builder(
        builder: reqwest::RequestBuilder,
    ) -> reqwest::RequestBuilder {
        builder
            .header(reqwest::header::ACCEPT, Self::ACCEPT)
            .header(reqwest::header::ACCEPT_LANGUAGE, Self::ACCEPT_LANGUAGE)
            .header(reqwest::header::REFERER, "https://mail.google.com/")
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-dest"),
                "document",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-mode"),
                "navigate",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-site"),
                "cross-site",
            )
            .header(
                reqwest::header::HeaderName::from_static("sec-fetch-user"),
                "?1",
            )
            .header(reqwest::header::UPGRADE_INSECURE_REQUESTS, "1")
    }
}

/// Whether response headers carry a bot-protection signature.
///
/// Cloudflare marks challenge responses with `cf-mitigated`; a `server:
/// cloudflare` header on a 403/503 is treated the same way.
pub(crate) fn has_bot_signature(headers: &reqwest::header::HeaderMap) -> bool {
    headers.contains_key("cf-mitigated")
        || headers
            .get(reqwest::header::SERVER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|server| server.to_ascii_lowercase().contains("cloudflare"))
}
