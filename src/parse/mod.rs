//! Email parsing and fact extraction.
//!
//! This module turns raw email HTML into an [`EmailDocument`]:
//! - Metadata (sender, sender name, reply-to, subject, preheader)
//! - Footer facts (copyright year, campaign code and country)
//! - Links with resolved targets and query parameters
//! - Images, split into standalone and link-wrapped
//!
//! Parsing is synchronous and single-pass. All parsing is done using CSS
//! selectors via the `scraper` crate.

mod document;
mod links;
mod metadata;

// Re-export public API
pub use document::EmailDocument;
pub use links::{extract_images, extract_links, resolve_href, Image, Link, LinkKind};
pub use metadata::{extract_metadata, Metadata};
