//! Requirement matching.
//!
//! Compares extracted facts against a [`RequirementsDocument`] and produces
//! one [`FieldVerdict`] per check:
//! - metadata rows, with tolerant matching for emails and campaign codes
//! - UTM rows per link, honoring per-domain allow-lists
//! - alt-text rows for link-wrapped and standalone images
//!
//! Mismatches are verdicts, never errors.
//!
//! [`RequirementsDocument`]: crate::requirements::RequirementsDocument

mod metadata;
mod utm;

use crate::normalize::non_blank;
use crate::parse::Image;
use crate::report::{FieldVerdict, VerdictStatus};

// Re-export public API
pub use metadata::match_metadata;
pub use utm::{host_key, match_link_alt, match_utm, ANY_VALUE};

/// Accessibility verdict for a standalone image.
///
/// Tracking pixels are INFO whatever their alt; a missing `alt` attribute is
/// a FAIL and a blank one a WARN.
pub fn match_image(image: &Image) -> FieldVerdict {
    let field_name = if image.src.is_empty() {
        format!("image #{}", image.index)
    } else {
        image.src.clone()
    };
    let actual = image.alt.clone();

    if image.is_tracking_pixel() {
        return FieldVerdict::info(field_name, actual).with_details("1x1 tracking pixel");
    }
    match image.alt.as_deref() {
        None => FieldVerdict::new(field_name, None, None, VerdictStatus::Fail)
            .with_details("alt attribute missing"),
        Some(alt) if non_blank(alt).is_none() => {
            FieldVerdict::new(field_name, None, actual, VerdictStatus::Warn)
                .with_details("alt attribute is blank")
        }
        Some(_) => FieldVerdict::new(field_name, None, actual, VerdictStatus::Pass),
    }
}

#[cfg(test)]
mod tests {
    include!("tests.rs");
}
