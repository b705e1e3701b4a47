//! Metadata row matching.

use crate::normalize::{campaign_suffix, collapse_whitespace, emails_match};
use crate::parse::Metadata;
use crate::report::{FieldVerdict, VerdictStatus};
use crate::requirements::MetadataRequirements;

/// How a metadata field is compared.
#[derive(Debug, Clone, Copy)]
enum Comparison {
    /// Whitespace-collapsed, case-sensitive
    Text,
    /// Bare address, case-insensitive
    Email,
    /// Trimmed, case-sensitive
    Exact,
}

/// Produces the metadata rows in report order.
///
/// The seven core rows are always present; a `language` row follows when
/// the requirements name a language. `language` is the document's declared
/// `lang`; `default_language` stands in for it when the document has none,
/// and the row says so.
pub fn match_metadata(
    metadata: &Metadata,
    language: Option<&str>,
    default_language: Option<&str>,
    required: &MetadataRequirements,
) -> Vec<FieldVerdict> {
    let mut rows = vec![
        compare_field("sender", required.sender.as_deref(), metadata.sender.as_deref(), Comparison::Email),
        compare_field(
            "sender_name",
            required.sender_name.as_deref(),
            metadata.sender_name.as_deref(),
            Comparison::Text,
        ),
        compare_field("reply_to", required.reply_to.as_deref(), metadata.reply_to.as_deref(), Comparison::Email),
        compare_field("subject", required.subject.as_deref(), metadata.subject.as_deref(), Comparison::Text),
        compare_field(
            "preheader",
            required.preheader.as_deref(),
            metadata.preheader.as_deref(),
            Comparison::Text,
        ),
        compare_field(
            "copyright_year",
            required.copyright_year.as_deref(),
            metadata.copyright_year.as_deref(),
            Comparison::Exact,
        ),
        match_footer_campaign_code(metadata, required),
    ];
    if let Some(expected) = required.language.as_deref() {
        rows.push(match_language(expected, language, default_language));
    }
    rows
}

fn compare_field(
    field_name: &str,
    expected: Option<&str>,
    actual: Option<&str>,
    comparison: Comparison,
) -> FieldVerdict {
    let actual_owned = actual.map(str::to_string);
    let Some(expected) = expected else {
        return FieldVerdict::info(field_name, actual_owned);
    };
    let expected_owned = Some(expected.to_string());
    let Some(actual) = actual else {
        return FieldVerdict::new(field_name, expected_owned, None, VerdictStatus::Fail)
            .with_details("not found in email");
    };

    let matched = match comparison {
        Comparison::Text => collapse_whitespace(expected) == collapse_whitespace(actual),
        Comparison::Email => emails_match(expected, actual),
        Comparison::Exact => expected.trim() == actual.trim(),
    };
    let status = if matched {
        VerdictStatus::Pass
    } else {
        VerdictStatus::Fail
    };
    log::debug!("{}: expected {:?}, actual {:?} -> {}", field_name, expected, actual, status);
    FieldVerdict::new(field_name, expected_owned, actual_owned, status)
}

/// Composite code + country row. Both requested portions must match.
fn match_footer_campaign_code(metadata: &Metadata, required: &MetadataRequirements) -> FieldVerdict {
    const FIELD: &str = "footer_campaign_code";

    let actual = metadata
        .footer_code
        .as_ref()
        .map(|found| format!("{} - {}", found.code, found.country));
    let expected_code = required.footer_campaign_code.as_deref();
    let expected_country = required.country.as_deref();
    let expected = match (expected_code, expected_country) {
        (None, None) => return FieldVerdict::info(FIELD, actual),
        (Some(code), Some(country)) => format!("{} - {}", code, country),
        (Some(code), None) => code.to_string(),
        (None, Some(country)) => format!("* - {}", country),
    };

    let Some(found) = metadata.footer_code.as_ref() else {
        return FieldVerdict::new(FIELD, Some(expected), None, VerdictStatus::Fail)
            .with_details("no campaign code found in footer");
    };

    let mut problems = Vec::new();
    if let Some(code) = expected_code {
        if campaign_suffix(code) != found.code {
            problems.push(format!(
                "campaign code mismatch: expected {}, found {}",
                campaign_suffix(code),
                found.code
            ));
        }
    }
    if let Some(country) = expected_country {
        if !country.trim().eq_ignore_ascii_case(&found.country) {
            problems.push(format!(
                "country mismatch: expected {}, found {}",
                country.trim(),
                found.country
            ));
        }
    }

    if problems.is_empty() {
        FieldVerdict::new(FIELD, Some(expected), actual, VerdictStatus::Pass)
            .with_details(format!("matched \"{}\"", found.matched))
    } else {
        FieldVerdict::new(FIELD, Some(expected), actual, VerdictStatus::Fail)
            .with_details(problems.join("; "))
    }
}

/// Compares primary language subtags, so `en` accepts `en-US`.
fn match_language(expected: &str, actual: Option<&str>, default: Option<&str>) -> FieldVerdict {
    let primary = |tag: &str| {
        tag.trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    };
    let compared = actual.or(default);
    let status = match compared {
        Some(tag) if primary(expected) == primary(tag) => VerdictStatus::Pass,
        _ => VerdictStatus::Fail,
    };
    let verdict = FieldVerdict::new(
        "language",
        Some(expected.to_string()),
        actual.map(str::to_string),
        status,
    );
    match (actual, default) {
        (Some(_), _) => verdict,
        (None, Some(default)) => verdict.with_details(format!(
            "document declares no lang attribute; assumed default \"{}\"",
            default
        )),
        (None, None) => verdict.with_details("document declares no lang attribute"),
    }
}
