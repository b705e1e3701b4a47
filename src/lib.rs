//! email_qa library: validation of HTML email templates
//!
//! This library checks an HTML email against a JSON requirements document and
//! produces a structured report: metadata rows, per-link UTM and destination
//! results, and image accessibility rows. Every check is a PASS, FAIL, WARN or
//! INFO verdict; only unusable input is an error.
//!
//! # Example
//!
//! ```no_run
//! use email_qa::{Config, DomainSettings, RequirementsDocument, Validator};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let requirements = RequirementsDocument::from_json(
//!     r#"{"metadata": {"footer_campaign_code": "ABC2505", "country": "US"},
//!         "utm_parameters": {"utm_source": "email", "utm_campaign": "ABC2505"}}"#,
//! )?;
//! let html = std::fs::read_to_string("email.html")?;
//!
//! let validator = Validator::new(Config::default(), DomainSettings::default())?;
//! let report = validator.validate(&html, &requirements).await?;
//! println!("{} pass, {} fail ({})",
//!          report.summary.pass, report.summary.fail, report.summary.overall);
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! Destination checks need a Tokio runtime. Parsing and matching
//! ([`Validator::match_document`]) are synchronous.

pub mod batch;
pub mod cli;
pub mod config;
pub mod destination;
pub mod error_handling;
pub mod initialization;
pub mod locale;
pub mod matcher;
pub mod normalize;
pub mod parse;
pub mod patterns;
pub mod report;
pub mod requirements;
mod utils;
pub mod validate;

// Re-export public API
pub use batch::{validate_batch, BatchJob, BatchOutcome};
pub use config::{BrowserBackend, Config, DomainSettings, FailOn, LogFormat, LogLevel};
pub use destination::{BrowserCapability, BrowserCheck, DestinationChecker};
pub use error_handling::{ConfigError, InitializationError, InputError, ValidationError};
pub use locale::{find_locale, localize_requirements, Locale, SUPPORTED_LOCALES};
pub use parse::EmailDocument;
pub use report::{FieldVerdict, LinkRecord, Summary, ValidationReport, VerdictStatus};
pub use requirements::RequirementsDocument;
pub use validate::{validate_email, Validator};
