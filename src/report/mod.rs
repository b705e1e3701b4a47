//! Verdicts and the assembled validation report.
//!
//! Every check surfaces as a [`FieldVerdict`] row. Link rows carry their UTM
//! verdicts plus the destination results; the [`Summary`] counts every
//! verdict in the report.

use serde::Serialize;

use crate::destination::{ProductDetection, ReachabilityResult};

/// Outcome of one check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VerdictStatus {
    /// Expected and actual agree
    Pass,
    /// Expected and actual disagree, or the destination is broken
    Fail,
    /// The check was inconclusive (bot protection, timeout, unresolved link)
    Warn,
    /// Nothing was expected; the actual value is surfaced without judgement
    Info,
}

impl VerdictStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictStatus::Pass => "PASS",
            VerdictStatus::Fail => "FAIL",
            VerdictStatus::Warn => "WARN",
            VerdictStatus::Info => "INFO",
        }
    }
}

impl std::fmt::Display for VerdictStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldVerdict {
    pub field_name: String,
    /// `None` when the requirements did not specify the field
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub status: VerdictStatus,
    /// Why a tolerant match passed, or which portion failed
    pub details: Option<String>,
}

impl FieldVerdict {
    pub fn new(
        field_name: impl Into<String>,
        expected: Option<String>,
        actual: Option<String>,
        status: VerdictStatus,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            expected,
            actual,
            status,
            details: None,
        }
    }

    /// Unjudged row for a field nothing was expected for.
    pub fn info(field_name: impl Into<String>, actual: Option<String>) -> Self {
        Self::new(field_name, None, actual, VerdictStatus::Info)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Report entry for one link, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub index: usize,
    pub visible_text: String,
    pub href: String,
    /// Resolved absolute URL; `None` for non-web or unresolved links
    pub url: Option<String>,
    pub is_image_link: bool,
    pub image_alt: Option<String>,
    pub utm: Vec<FieldVerdict>,
    /// Alt-text verdict for a link-wrapped image
    pub alt_text: Option<FieldVerdict>,
    /// Phase-1 result; `None` when link checking was not requested
    pub reachability: Option<ReachabilityResult>,
    /// Phase-2 result; `None` when the host needs no product check
    pub product: Option<ProductDetection>,
}

impl LinkRecord {
    fn statuses(&self) -> impl Iterator<Item = VerdictStatus> + '_ {
        self.utm
            .iter()
            .map(|v| v.status)
            .chain(self.alt_text.iter().map(|v| v.status))
            .chain(self.reachability.iter().map(|r| r.status))
            .chain(self.product.iter().map(|p| p.status))
    }
}

/// Verdict counts and the top-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub pass: usize,
    pub fail: usize,
    pub warn: usize,
    pub info: usize,
    /// FAIL if any FAIL, else WARN if any WARN, else PASS
    pub overall: VerdictStatus,
}

impl Default for Summary {
    fn default() -> Self {
        Self {
            pass: 0,
            fail: 0,
            warn: 0,
            info: 0,
            overall: VerdictStatus::Pass,
        }
    }
}

impl Summary {
    /// Counts statuses and derives the overall status.
    pub fn from_statuses(statuses: impl IntoIterator<Item = VerdictStatus>) -> Self {
        let mut summary = Summary::default();
        for status in statuses {
            match status {
                VerdictStatus::Pass => summary.pass += 1,
                VerdictStatus::Fail => summary.fail += 1,
                VerdictStatus::Warn => summary.warn += 1,
                VerdictStatus::Info => summary.info += 1,
            }
        }
        summary.overall = if summary.fail > 0 {
            VerdictStatus::Fail
        } else if summary.warn > 0 {
            VerdictStatus::Warn
        } else {
            VerdictStatus::Pass
        };
        summary
    }
}

/// The complete result of validating one email.
///
/// Sections keep a fixed order: metadata rows, link records in document
/// order, then standalone image rows in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub metadata: Vec<FieldVerdict>,
    pub links: Vec<LinkRecord>,
    pub images: Vec<FieldVerdict>,
    pub summary: Summary,
}

impl ValidationReport {
    /// Merges the three sections and computes the summary.
    pub fn assemble(
        metadata: Vec<FieldVerdict>,
        links: Vec<LinkRecord>,
        images: Vec<FieldVerdict>,
    ) -> Self {
        let mut report = Self {
            metadata,
            links,
            images,
            summary: Summary::default(),
        };
        report.refresh_summary();
        report
    }

    /// Recomputes the summary after destination results were merged in.
    pub fn refresh_summary(&mut self) {
        self.summary = Summary::from_statuses(self.statuses().collect::<Vec<_>>());
    }

    /// Every verdict status in report order.
    pub fn statuses(&self) -> impl Iterator<Item = VerdictStatus> + '_ {
        self.metadata
            .iter()
            .map(|v| v.status)
            .chain(self.links.iter().flat_map(LinkRecord::statuses))
            .chain(self.images.iter().map(|v| v.status))
    }

    pub fn has_failures(&self) -> bool {
        self.summary.fail > 0
    }

    pub fn has_warnings(&self) -> bool {
        self.summary.warn > 0
    }

    /// Looks up a metadata row by field name.
    pub fn metadata_field(&self, field_name: &str) -> Option<&FieldVerdict> {
        self.metadata.iter().find(|v| v.field_name == field_name)
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
