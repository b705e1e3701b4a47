//! Link and image extraction.
//!
//! Every `<a href>` becomes a [`Link`] in document order. Every `<img>`
//! becomes an [`Image`]; images wrapped in a link are flagged
//! `is_inside_link` and are judged in that link's record, not as standalone
//! images.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use url::Url;

use super::metadata::element_text;
use crate::error_handling::{CheckStats, InfoType, WarningType};
use crate::normalize::non_blank;
use crate::utils::parse_selector_unsafe;

/// Maximum href length accepted for resolution (matches common browser limits).
const MAX_URL_LENGTH: usize = 2048;
/// Label used for an image link with neither alt text nor a file name.
const IMAGE_LINK_LABEL: &str = "Image link";

static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("a[href]", "ANCHOR_SELECTOR"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe("img", "IMG_SELECTOR"));

/// How a link's href resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    /// Absolute (or resolved) `http`/`https` URL; checked for reachability
    Http,
    /// `mailto:`, `tel:`, `#fragment` and other non-web targets; never probed
    NonHttp,
    /// Relative href with no base URL to resolve against, or a malformed URL
    Unresolved,
}

/// A hyperlink found in the email.
///
/// Links are never standalone images: an image wrapped in a link is reported
/// through `is_image_link` and `image_alt` on this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Zero-based position among the document's links
    pub index: usize,
    /// Rendered text, or the wrapped image's alt text / file name
    pub visible_text: String,
    /// The `href` attribute as written
    pub href: String,
    /// Absolute target, when the href resolved to an `http(s)` URL
    pub url: Option<Url>,
    pub kind: LinkKind,
    /// Query parameters of the target; a repeated key keeps its last value
    pub query: BTreeMap<String, String>,
    /// Whether the link wraps an `<img>`
    pub is_image_link: bool,
    /// The wrapped image's `alt` attribute (`None` when absent)
    pub image_alt: Option<String>,
}

impl Link {
    /// Key used to deduplicate destination checks.
    pub fn target_key(&self) -> Option<&str> {
        self.url.as_ref().map(Url::as_str)
    }
}

/// An image found in the email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Image {
    /// Zero-based position among the document's images
    pub index: usize,
    pub src: String,
    /// The `alt` attribute (`None` when absent, `Some("")` when blank)
    pub alt: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub is_inside_link: bool,
}

impl Image {
    /// A 1×1 image, almost always an open-tracking pixel.
    pub fn is_tracking_pixel(&self) -> bool {
        self.width == Some(1) && self.height == Some(1)
    }
}

/// Extracts every hyperlink in document order.
pub fn extract_links(document: &Html, base_url: Option<&Url>, stats: &CheckStats) -> Vec<Link> {
    document
        .select(&ANCHOR_SELECTOR)
        .enumerate()
        .map(|(index, anchor)| {
            let href = anchor.value().attr("href").unwrap_or_default().trim().to_string();
            let (kind, url) = resolve_href(&href, base_url);
            match kind {
                LinkKind::NonHttp => stats.increment_info(InfoType::NonHttpLinkSkipped),
                LinkKind::Unresolved => stats.increment_info(InfoType::UnresolvedRelativeLink),
                LinkKind::Http => {}
            }

            let image = anchor.select(&IMG_SELECTOR).next();
            let image_alt = image.and_then(|img| img.value().attr("alt")).map(str::to_string);
            let mut visible_text = element_text(anchor);
            if visible_text.is_empty() {
                if let Some(img) = image {
                    visible_text = image_label(img);
                }
            }

            let query = match &url {
                Some(url) => url.query_pairs().into_owned().collect(),
                None => query_from_href(&href),
            };

            Link {
                index,
                visible_text,
                href,
                url,
                kind,
                query,
                is_image_link: image.is_some(),
                image_alt,
            }
        })
        .collect()
}

/// Extracts every image in document order, flagging those inside links.
pub fn extract_images(document: &Html, stats: &CheckStats) -> Vec<Image> {
    document
        .select(&IMG_SELECTOR)
        .enumerate()
        .map(|(index, img)| {
            let value = img.value();
            let image = Image {
                index,
                src: value.attr("src").unwrap_or_default().trim().to_string(),
                alt: value.attr("alt").map(str::to_string),
                width: value.attr("width").and_then(parse_dimension),
                height: value.attr("height").and_then(parse_dimension),
                is_inside_link: is_inside_link(img),
            };
            if !image.is_inside_link {
                if image.is_tracking_pixel() {
                    stats.increment_info(InfoType::TrackingPixel);
                } else if image.alt.as_deref().and_then(non_blank).is_none() {
                    stats.increment_warning(WarningType::MissingAltText);
                }
            }
            image
        })
        .collect()
}

/// Resolves an href to an absolute web URL when possible.
///
/// Fragments and non-web schemes are `NonHttp`. Relative hrefs are joined
/// onto `base_url`; without one they stay `Unresolved`. Protocol-relative
/// hrefs (`//cdn.example.com/x`) assume `https`.
pub fn resolve_href(href: &str, base_url: Option<&Url>) -> (LinkKind, Option<Url>) {
    if href.is_empty() || href.starts_with('#') {
        return (LinkKind::NonHttp, None);
    }
    if href.len() > MAX_URL_LENGTH {
        log::warn!(
            "Link exceeds maximum length ({} > {}): {}...",
            href.len(),
            MAX_URL_LENGTH,
            href.chars().take(50).collect::<String>()
        );
        return (LinkKind::Unresolved, None);
    }

    let parsed = match Url::parse(href) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) if href.starts_with("//") => {
            Url::parse(&format!("https:{href}"))
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => match base_url {
            Some(base) => base.join(href),
            None => {
                log::debug!("Relative link without base URL: {}", href);
                return (LinkKind::Unresolved, None);
            }
        },
        Err(e) => Err(e),
    };

    match parsed {
        Ok(url) => match url.scheme() {
            "http" | "https" => (LinkKind::Http, Some(url)),
            _ => (LinkKind::NonHttp, None),
        },
        Err(e) => {
            log::warn!("Invalid link {}: {}", href, e);
            (LinkKind::Unresolved, None)
        }
    }
}

/// Query parameters parsed straight from an href that did not resolve.
fn query_from_href(href: &str) -> BTreeMap<String, String> {
    let without_fragment = href.split('#').next().unwrap_or_default();
    match without_fragment.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect(),
        None => BTreeMap::new(),
    }
}

fn image_label(img: ElementRef<'_>) -> String {
    let value = img.value();
    if let Some(alt) = value.attr("alt").and_then(non_blank) {
        return alt.to_string();
    }
    value
        .attr("src")
        .and_then(file_name)
        .unwrap_or_else(|| IMAGE_LINK_LABEL.to_string())
}

/// Last path segment of an image source, without query or fragment.
fn file_name(src: &str) -> Option<String> {
    let path = src.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .next()
        .and_then(non_blank)
        .map(str::to_string)
}

fn is_inside_link(img: ElementRef<'_>) -> bool {
    img.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == "a")
}

/// Parses `width`/`height` attributes such as `"1"`, `"600px"` or `" 1 "`.
fn parse_dimension(raw: &str) -> Option<u32> {
    raw.trim().trim_end_matches("px").trim().parse().ok()
}
