//! Metadata extraction.
//!
//! Reads the sender/subject/preheader fields from `<meta>` tags (with the
//! legacy `<from>`, `<from-name>`, `<reply-to>` and `<title>` elements as
//! fallbacks) and locates the footer text carrying the copyright year and
//! the campaign code.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::error_handling::{CheckStats, WarningType};
use crate::normalize::{collapse_whitespace, is_invisible_spacing, non_blank, truncate_at_invisible};
use crate::patterns::{
    extract_copyright_entity_year, extract_copyright_year, extract_footer_code, FooterCode,
};
use crate::utils::parse_selector_unsafe;

const SENDER_META_NAMES: &[&str] = &["sender", "sender_address", "sender-address"];
const SENDER_NAME_META_NAMES: &[&str] = &["sender-name", "sender_name"];
const REPLY_TO_META_NAMES: &[&str] = &["reply-to", "reply_to", "reply_address", "reply-address"];
const SUBJECT_META_NAMES: &[&str] = &["subject"];

/// Preheader container classes, in priority order.
const PREHEADER_CLASSES: &[&str] = &["preheader", "preview-text", "preview", "hidden-preheader"];
/// Characters kept when a preheader has no visible text before its padding.
const PREHEADER_FALLBACK_CHARS: usize = 100;
/// Number of trailing tables treated as footer candidates.
const FOOTER_TRAILING_TABLES: usize = 2;

static META_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("meta[name]", "META_SELECTOR"));
static FROM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("from", "FROM_SELECTOR"));
static FROM_NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("from-name", "FROM_NAME_SELECTOR"));
static REPLY_TO_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("reply-to", "REPLY_TO_SELECTOR"));
static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("title", "TITLE_SELECTOR"));
static PREHEADER_CANDIDATE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("div[class], span[class]", "PREHEADER_CANDIDATE_SELECTOR"));
static FOOTER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("footer", "FOOTER_SELECTOR"));
static CLASS_OR_ID_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("[class], [id]", "CLASS_OR_ID_SELECTOR"));
static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("table", "TABLE_SELECTOR"));
static BODY_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("body", "BODY_SELECTOR"));

/// Facts extracted from the email's head and footer.
///
/// Every field is `None` when the document does not carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub sender: Option<String>,
    pub sender_name: Option<String>,
    pub reply_to: Option<String>,
    pub subject: Option<String>,
    pub preheader: Option<String>,
    pub copyright_year: Option<String>,
    pub footer_code: Option<FooterCode>,
}

/// Extracts the metadata record from a parsed document.
///
/// `raw_html` is consulted last, and only for copyright entities (`&copy;`)
/// that survive escaped in the source text.
pub fn extract_metadata(document: &Html, raw_html: &str, stats: &CheckStats) -> Metadata {
    let sender = meta_content(document, SENDER_META_NAMES)
        .or_else(|| first_text(document, &FROM_SELECTOR));
    let sender_name = meta_content(document, SENDER_NAME_META_NAMES)
        .or_else(|| first_text(document, &FROM_NAME_SELECTOR));
    let reply_to = meta_content(document, REPLY_TO_META_NAMES)
        .or_else(|| first_text(document, &REPLY_TO_SELECTOR));
    let subject = meta_content(document, SUBJECT_META_NAMES)
        .or_else(|| first_text(document, &TITLE_SELECTOR));
    let preheader = extract_preheader(document);

    let (copyright_year, footer_code) = extract_footer_facts(document, raw_html);

    if sender.is_none() {
        stats.increment_warning(WarningType::MissingSender);
    }
    if subject.is_none() {
        stats.increment_warning(WarningType::MissingSubject);
    }
    if preheader.is_none() {
        stats.increment_warning(WarningType::MissingPreheader);
    }
    if copyright_year.is_none() {
        stats.increment_warning(WarningType::MissingCopyright);
    }
    if footer_code.is_none() {
        stats.increment_warning(WarningType::MissingFooterCampaignCode);
    }

    Metadata {
        sender,
        sender_name,
        reply_to,
        subject,
        preheader,
        copyright_year,
        footer_code,
    }
}

/// Content of the first `<meta>` whose name is in `names`, by name priority.
fn meta_content(document: &Html, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        document
            .select(&META_SELECTOR)
            .filter(|meta| {
                meta.value()
                    .attr("name")
                    .is_some_and(|n| n.trim().eq_ignore_ascii_case(name))
            })
            .find_map(|meta| meta.value().attr("content").and_then(non_blank))
            .map(collapse_whitespace)
    })
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .map(element_text)
        .find(|text| !text.is_empty())
}

/// Element text with whitespace collapsed; adjacent nodes are space-separated.
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

fn extract_preheader(document: &Html) -> Option<String> {
    PREHEADER_CLASSES.iter().find_map(|class| {
        document
            .select(&PREHEADER_CANDIDATE_SELECTOR)
            .filter(|el| el.value().classes().any(|c| c.eq_ignore_ascii_case(class)))
            .find_map(|el| preheader_text(&el.text().collect::<String>()))
    })
}

/// Visible preheader text: everything before the invisible padding, or the
/// first characters of the cleaned text when the padding comes first.
fn preheader_text(raw: &str) -> Option<String> {
    let visible = collapse_whitespace(truncate_at_invisible(raw));
    if !visible.is_empty() {
        return Some(visible);
    }
    let cleaned: String = raw.chars().filter(|c| !is_invisible_spacing(*c)).collect();
    let fallback: String = collapse_whitespace(&cleaned)
        .chars()
        .take(PREHEADER_FALLBACK_CHARS)
        .collect();
    (!fallback.is_empty()).then_some(fallback)
}

/// Footer candidate texts, most specific first.
fn footer_candidates(document: &Html) -> Vec<String> {
    let mut candidates: Vec<String> = document.select(&FOOTER_SELECTOR).map(element_text).collect();

    candidates.extend(
        document
            .select(&CLASS_OR_ID_SELECTOR)
            .filter(|el| {
                let value = el.value();
                ["class", "id"].iter().any(|attr| {
                    value
                        .attr(attr)
                        .is_some_and(|v| v.to_ascii_lowercase().contains("footer"))
                })
            })
            .map(element_text),
    );

    let tables: Vec<ElementRef<'_>> = document.select(&TABLE_SELECTOR).collect();
    let skip = tables.len().saturating_sub(FOOTER_TRAILING_TABLES);
    candidates.extend(tables.into_iter().skip(skip).map(element_text));

    candidates.retain(|text| !text.is_empty());
    candidates
}

fn extract_footer_facts(document: &Html, raw_html: &str) -> (Option<String>, Option<FooterCode>) {
    let candidates = footer_candidates(document);
    let body_text = document
        .select(&BODY_SELECTOR)
        .next()
        .map(element_text)
        .unwrap_or_default();

    let searched = candidates.iter().map(String::as_str).chain(std::iter::once(body_text.as_str()));

    let mut copyright_year = None;
    let mut footer_code = None;
    for text in searched {
        if copyright_year.is_none() {
            copyright_year = extract_copyright_year(text);
        }
        if footer_code.is_none() {
            footer_code = extract_footer_code(text);
        }
        if copyright_year.is_some() && footer_code.is_some() {
            break;
        }
    }

    if copyright_year.is_none() {
        copyright_year = extract_copyright_entity_year(raw_html);
    }
    log::debug!(
        "Footer search over {} candidates: copyright={:?}, campaign={:?}",
        candidates.len(),
        copyright_year,
        footer_code.as_ref().map(|f| (&f.code, &f.country))
    );
    (copyright_year, footer_code)
}
