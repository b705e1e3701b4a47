//! End-to-end validation of one email.
//!
//! A run goes through these steps:
//! 1. Parse the HTML into an [`EmailDocument`]
//! 2. Match metadata, UTM parameters and image alt text against the requirements
//! 3. Phase 1: probe every distinct web link (when `check_links` is set)
//! 4. Phase 2: look for product listings on hosts that require it (when
//!    `check_products` is set), skipping URLs that already failed phase 1
//! 5. Assemble the report and its summary
//!
//! Phase 2 can also be run later for a chosen set of URLs through
//! [`Validator::run_product_checks`].

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use url::Url;

use crate::config::{Config, DomainSettings};
use crate::destination::{DestinationChecker, ProductDetection, ReachabilityResult};
use crate::error_handling::{CheckStats, InitializationError, InputError, ValidationError};
use crate::matcher::{match_image, match_link_alt, match_metadata, match_utm};
use crate::parse::{EmailDocument, LinkKind};
use crate::report::{LinkRecord, ValidationReport, VerdictStatus};
use crate::requirements::RequirementsDocument;

/// Validates emails with one configuration and one destination checker.
///
/// Cheap to clone; clones share the HTTP client, domain settings and
/// statistics.
///
/// # Examples
///
/// ```no_run
/// use email_qa::{Config, DomainSettings, RequirementsDocument, Validator};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let validator = Validator::new(Config::default(), DomainSettings::default())?;
/// let requirements = RequirementsDocument::from_json(r#"{"metadata": {"subject": "Hello"}}"#)?;
/// let report = validator
///     .validate("<html><head><title>Hello</title></head></html>", &requirements)
///     .await?;
/// println!("{}", report.summary.overall);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Validator {
    config: Config,
    checker: DestinationChecker,
}

impl Validator {
    /// Builds a validator with a fresh HTTP client and statistics.
    ///
    /// # Errors
    ///
    /// Returns `InitializationError::HttpClientError` if the client cannot be built.
    pub fn new(config: Config, domains: DomainSettings) -> Result<Self, InitializationError> {
        let checker =
            DestinationChecker::new(&config, Arc::new(domains), Arc::new(CheckStats::new()))?;
        Ok(Self { config, checker })
    }

    /// Builds a validator around an existing checker (e.g. one with a custom
    /// browser capability).
    pub fn with_checker(config: Config, checker: DestinationChecker) -> Self {
        Self { config, checker }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn checker(&self) -> &DestinationChecker {
        &self.checker
    }

    pub fn stats(&self) -> &CheckStats {
        self.checker.stats()
    }

    /// Parses `html` and validates it against `requirements`.
    ///
    /// # Errors
    ///
    /// Returns an `InputError` when the HTML is empty or not markup. Every
    /// other problem becomes a verdict in the report.
    pub async fn validate(
        &self,
        html: &str,
        requirements: &RequirementsDocument,
    ) -> Result<ValidationReport, InputError> {
        let document = EmailDocument::parse(html, self.config.base_url.as_ref(), self.stats())?;
        Ok(self.validate_document(&document, requirements).await)
    }

    /// Validates an already parsed document.
    pub async fn validate_document(
        &self,
        document: &EmailDocument,
        requirements: &RequirementsDocument,
    ) -> ValidationReport {
        let mut report = self.match_document(document, requirements);

        if self.config.check_links {
            self.run_reachability_checks(&mut report).await;
        }
        if self.config.check_products {
            let urls = self.product_check_candidates(&report);
            if !urls.is_empty() {
                self.run_product_checks(&mut report, &urls).await;
            }
        }

        log::info!(
            "Validation finished: {} pass, {} fail, {} warn, {} info ({})",
            report.summary.pass,
            report.summary.fail,
            report.summary.warn,
            report.summary.info,
            report.summary.overall
        );
        report
    }

    /// Runs every check that needs no network access.
    ///
    /// The result is deterministic for identical input.
    pub fn match_document(
        &self,
        document: &EmailDocument,
        requirements: &RequirementsDocument,
    ) -> ValidationReport {
        let domains = self.checker.domains();
        let default_language = Some(domains.global_settings.default_language.as_str())
            .filter(|lang| !lang.trim().is_empty());

        let metadata = match_metadata(
            document.metadata(),
            document.language(),
            default_language,
            &requirements.metadata,
        );
        let links = document
            .links()
            .iter()
            .map(|link| LinkRecord {
                index: link.index,
                visible_text: link.visible_text.clone(),
                href: link.href.clone(),
                url: link.url.as_ref().map(Url::to_string),
                is_image_link: link.is_image_link,
                image_alt: link.image_alt.clone(),
                utm: match_utm(link, &requirements.utm_parameters, domains),
                alt_text: match_link_alt(link),
                reachability: match link.kind {
                    LinkKind::Http => None,
                    LinkKind::NonHttp => Some(ReachabilityResult {
                        status: VerdictStatus::Info,
                        http_status: None,
                        final_url: None,
                        attempts: 0,
                        details: Some("not a web link; not probed".to_string()),
                    }),
                    LinkKind::Unresolved => Some(ReachabilityResult::inconclusive(
                        "relative URL could not be resolved",
                    )),
                },
                product: None,
            })
            .collect();
        let images = document.standalone_images().map(match_image).collect();

        ValidationReport::assemble(metadata, links, images)
    }

    /// Phase 1 over every web link in the report.
    pub async fn run_reachability_checks(&self, report: &mut ValidationReport) {
        let urls = distinct_urls(report.links.iter().filter_map(|r| r.url.as_deref()));
        if urls.is_empty() {
            return;
        }
        let results = self.checker.check_reachability(&urls).await;
        for record in &mut report.links {
            if let Some(result) = record.url.as_ref().and_then(|url| results.get(url)) {
                record.reachability = Some(result.clone());
            }
        }
        report.refresh_summary();
    }

    /// URLs whose host requires a product check and whose phase-1 result
    /// (when there is one) is not FAIL.
    pub fn product_check_candidates(&self, report: &ValidationReport) -> Vec<Url> {
        let eligible = report.links.iter().filter_map(|record| {
            let failed = record
                .reachability
                .as_ref()
                .is_some_and(|r| r.status == VerdictStatus::Fail);
            if failed {
                return None;
            }
            record.url.as_deref()
        });
        distinct_urls(eligible)
            .into_iter()
            .filter(|url| self.checker.requires_product_check(url))
            .collect()
    }

    /// Phase 2 for an explicit URL list, merged into `report`.
    ///
    /// Every link record whose URL is in `urls` gets the detection result;
    /// the summary is recomputed.
    pub async fn run_product_checks(&self, report: &mut ValidationReport, urls: &[Url]) {
        let results: HashMap<String, ProductDetection> = self.checker.check_products(urls).await;
        for record in &mut report.links {
            if let Some(detection) = record.url.as_ref().and_then(|url| results.get(url)) {
                record.product = Some(detection.clone());
            }
        }
        report.refresh_summary();
    }
}

/// One-shot validation with default domain settings.
///
/// # Errors
///
/// Returns `ValidationError::Input` for unusable HTML and
/// `ValidationError::Initialization` if the HTTP client cannot be built.
pub async fn validate_email(
    html: &str,
    requirements: &RequirementsDocument,
    config: &Config,
) -> Result<ValidationReport, ValidationError> {
    let validator = Validator::new(config.clone(), DomainSettings::default())?;
    Ok(validator.validate(html, requirements).await?)
}

fn distinct_urls<'a>(urls: impl Iterator<Item = &'a str>) -> Vec<Url> {
    urls.collect::<BTreeSet<_>>()
        .into_iter()
        .filter_map(|url| Url::parse(url).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
