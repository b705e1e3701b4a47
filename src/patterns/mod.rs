//! Ordered pattern matchers for free-text facts.
//!
//! Each matcher owns an ordered list of compiled regular expressions and
//! returns the captures of the FIRST pattern in the list that matches
//! anywhere in the input. Pattern order, not text position, decides which
//! candidate wins when several forms appear in one document.
//!
//! Copyright year patterns, in order:
//! 1. `©2025` / `© 2025`
//! 2. `@2025`
//! 3. `&copy; 2025` (raw HTML entity)
//! 4. `&#169; 2025` / `&#xA9; 2025` (numeric entities)
//! 5. `(c) 2025`
//! 6. `Copyright 2025` (optionally followed by a glyph)
//!
//! Footer campaign code patterns, in order:
//! 1. labeled: `Campaign Code: 123_ABC2505 - US`, also `Code`, `Ref`,
//!    `Reference`, `Campaign`, `Código de campaña`, `Campaña`
//! 2. delimited: `| ABC2505 - US |` or `• ABC2505-US` at end of text
//! 3. bare, spaced dash: `ABC2505 - US`
//! 4. bare, compact dash: `ABC2505-US`
//!
//! Patterns 2 to 4 only accept an upper-case code and country after the
//! optional `prefix_` chain, so ordinary prose ("e-mail", "opt-in") is not
//! mistaken for a campaign code. The prefix itself may be any case.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::normalize::campaign_suffix;
use crate::utils::compile_regex_unsafe;

const COPYRIGHT_PATTERNS: &[&str] = &[
    r"©\s*(\d{4})\b",
    r"@(\d{4})\b",
    r"(?i)&copy;\s*(\d{4})\b",
    r"(?i)&#(?:169|x0*a9);\s*(\d{4})\b",
    r"(?i)\(c\)\s*(\d{4})\b",
    r"(?i)\bcopyright\s*(?:©|\(c\)|&copy;)?\s*(\d{4})\b",
];

// Indices of the `&copy;` and numeric entity forms above.
const ENTITY_PATTERNS: std::ops::Range<usize> = 2..4;

// A code is an optional chain of `PREFIX_` segments followed by 2-12
// alphanumerics; the country is two letters.
const FOOTER_CODE_PATTERNS: &[&str] = &[
    r"(?i)\b(?:campaign\s*code|código\s+de\s+campaña|campaign|campaña|reference|code|ref)\s*[:#]?\s*((?:[A-Z0-9]+_)*[A-Z0-9]{2,12})\s*-\s*([A-Z]{2})\b",
    r"[|•]\s*((?:[A-Za-z0-9]+_)*[A-Z0-9]{2,12})\s*-\s*([A-Z]{2})\s*(?:[|•]|$)",
    r"\b((?:[A-Za-z0-9]+_)*[A-Z0-9]{2,12})\s+-\s+([A-Z]{2})\b",
    r"\b((?:[A-Za-z0-9]+_)*[A-Z0-9]{2,12})-([A-Z]{2})\b",
];

static COPYRIGHT_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    COPYRIGHT_PATTERNS
        .iter()
        .map(|p| compile_regex_unsafe(p, "COPYRIGHT_PATTERNS"))
        .collect()
});

static FOOTER_CODE_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    FOOTER_CODE_PATTERNS
        .iter()
        .map(|p| compile_regex_unsafe(p, "FOOTER_CODE_PATTERNS"))
        .collect()
});

/// Campaign code and country found in footer text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterCode {
    /// Campaign code with its tracking prefix removed, as written
    pub code: String,
    /// Two-letter country code, upper-cased
    pub country: String,
    /// The text the pattern matched, as it appears in the document
    pub matched: String,
}

/// Extracts a four-digit copyright year.
///
/// Returns `None` for empty input or when no pattern matches.
///
/// ```
/// use email_qa::patterns::extract_copyright_year;
///
/// assert_eq!(extract_copyright_year("©2025 Shop Inc."), Some("2025".to_string()));
/// assert_eq!(extract_copyright_year("All rights reserved"), None);
/// ```
pub fn extract_copyright_year(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    COPYRIGHT_RES.iter().enumerate().find_map(|(idx, re)| {
        let year = re.captures(text)?.get(1)?.as_str().to_string();
        log::debug!("Copyright year {} matched by pattern #{}", year, idx + 1);
        Some(year)
    })
}

/// Extracts a copyright year written as an HTML entity (`&copy; 2025`,
/// `&#169; 2025`).
///
/// Only the entity patterns run, so it is safe on raw markup where `@2024`
/// may be part of an attribute value.
pub fn extract_copyright_entity_year(html: &str) -> Option<String> {
    COPYRIGHT_RES[ENTITY_PATTERNS]
        .iter()
        .find_map(|re| Some(re.captures(html)?.get(1)?.as_str().to_string()))
}

/// Extracts the campaign code from a raw value such as `123_ABC2505`.
///
/// Applies the last-underscore rule from [`campaign_suffix`].
pub fn extract_campaign_code(raw: &str) -> Option<String> {
    let code = campaign_suffix(raw);
    (!code.is_empty()).then(|| code.to_string())
}

/// Extracts a `CODE - COUNTRY` pair from footer text.
///
/// ```
/// use email_qa::patterns::extract_footer_code;
///
/// let found = extract_footer_code("Campaign Code: 123_ABC2505 - US").unwrap();
/// assert_eq!(found.code, "ABC2505");
/// assert_eq!(found.country, "US");
/// ```
pub fn extract_footer_code(text: &str) -> Option<FooterCode> {
    if text.trim().is_empty() {
        return None;
    }
    FOOTER_CODE_RES.iter().enumerate().find_map(|(idx, re)| {
        let caps = re.captures(text)?;
        let raw_code = caps.get(1)?.as_str();
        let country = caps.get(2)?.as_str();
        let found = FooterCode {
            code: campaign_suffix(raw_code).to_string(),
            country: country.to_ascii_uppercase(),
            matched: caps.get(0)?.as_str().trim().to_string(),
        };
        log::debug!(
            "Footer campaign code {} - {} matched by pattern #{}",
            found.code,
            found.country,
            idx + 1
        );
        Some(found)
    })
}

/// Extracts only the country portion of a footer campaign code.
pub fn extract_country_code(text: &str) -> Option<String> {
    extract_footer_code(text).map(|found| found.country)
}
