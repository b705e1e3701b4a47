//! The parsed email document.

use scraper::Html;
use url::Url;

use super::links::{extract_images, extract_links, Image, Link};
use super::metadata::{extract_metadata, Metadata};
use crate::error_handling::{CheckStats, InputError};
use crate::normalize::non_blank;

/// An email parsed once per validation run and immutable afterwards.
///
/// The `scraper` tree is dropped after extraction, so the document is `Send`
/// and can cross task boundaries during destination checks.
#[derive(Debug, Clone)]
pub struct EmailDocument {
    raw_html: String,
    language: Option<String>,
    metadata: Metadata,
    links: Vec<Link>,
    images: Vec<Image>,
}

impl EmailDocument {
    /// Parses raw HTML and extracts metadata, links and images.
    ///
    /// Relative links are resolved against `base_url` when given.
    ///
    /// # Errors
    ///
    /// Returns `InputError::EmptyDocument` for empty input and
    /// `InputError::NotHtml` when the text contains no markup.
    pub fn parse(
        html: impl Into<String>,
        base_url: Option<&Url>,
        stats: &CheckStats,
    ) -> Result<Self, InputError> {
        let raw_html = html.into();
        if raw_html.trim().is_empty() {
            return Err(InputError::EmptyDocument);
        }
        if !raw_html.contains('<') {
            return Err(InputError::NotHtml);
        }

        let document = Html::parse_document(&raw_html);
        if !document.errors.is_empty() {
            log::debug!("HTML parser recovered from {} errors", document.errors.len());
        }

        let language = document
            .root_element()
            .value()
            .attr("lang")
            .and_then(non_blank)
            .map(str::to_string);
        let metadata = extract_metadata(&document, &raw_html, stats);
        let links = extract_links(&document, base_url, stats);
        let images = extract_images(&document, stats);

        log::debug!(
            "Parsed email: {} links, {} images, lang={:?}",
            links.len(),
            images.len(),
            language
        );

        Ok(Self {
            raw_html,
            language,
            metadata,
            links,
            images,
        })
    }

    pub fn raw_html(&self) -> &str {
        &self.raw_html
    }

    /// The `<html lang>` attribute, when declared.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Links in document order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// All images in document order, including those inside links.
    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Images not wrapped in a link; these get accessibility verdicts.
    pub fn standalone_images(&self) -> impl Iterator<Item = &Image> {
        self.images.iter().filter(|img| !img.is_inside_link)
    }
}
