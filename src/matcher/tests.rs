// Matcher tests.

use std::collections::BTreeMap;

use super::*;
use crate::config::{DomainEntry, DomainSettings};
use crate::parse::{Link, LinkKind, Metadata};
use crate::patterns::FooterCode;
use crate::requirements::MetadataRequirements;
use url::Url;

fn metadata_with_footer(code: &str, country: &str) -> Metadata {
    Metadata {
        sender: Some("Shop News <news@shop.example>".into()),
        subject: Some("Big  Summer Sale".into()),
        copyright_year: Some("2025".into()),
        footer_code: Some(FooterCode {
            code: code.into(),
            country: country.into(),
            matched: format!("Campaign Code: 123_{} - {}", code, country),
        }),
        ..Default::default()
    }
}

fn link(href: &str, params: &[(&str, &str)]) -> Link {
    let url = Url::parse(href).ok();
    Link {
        index: 0,
        visible_text: "Shop".into(),
        href: href.into(),
        kind: if url.is_some() { LinkKind::Http } else { LinkKind::Unresolved },
        url,
        query: params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<BTreeMap<_, _>>(),
        is_image_link: false,
        image_alt: None,
    }
}

fn required(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn row<'a>(rows: &'a [FieldVerdict], name: &str) -> &'a FieldVerdict {
    rows.iter().find(|r| r.field_name == name).expect("row present")
}

#[test]
fn test_metadata_rows_in_fixed_order() {
    let rows = match_metadata(&Metadata::default(), None, None, &MetadataRequirements::default());
    let names: Vec<&str> = rows.iter().map(|r| r.field_name.as_str()).collect();
    assert_eq!(
        names,
        [
            "sender",
            "sender_name",
            "reply_to",
            "subject",
            "preheader",
            "copyright_year",
            "footer_campaign_code"
        ]
    );
    assert!(rows.iter().all(|r| r.status == VerdictStatus::Info));
}

#[test]
fn test_unspecified_field_is_info_with_actual() {
    let rows = match_metadata(&metadata_with_footer("ABC2505", "US"), None, None, &MetadataRequirements::default());
    let subject = row(&rows, "subject");
    assert_eq!(subject.status, VerdictStatus::Info);
    assert!(subject.expected.is_none());
    assert_eq!(subject.actual.as_deref(), Some("Big  Summer Sale"));
}

#[test]
fn test_text_fields_collapse_whitespace_but_keep_case() {
    let meta = metadata_with_footer("ABC2505", "US");
    let req = MetadataRequirements {
        subject: Some("Big Summer Sale".into()),
        ..Default::default()
    };
    assert_eq!(row(&match_metadata(&meta, None, None, &req), "subject").status, VerdictStatus::Pass);

    let req = MetadataRequirements {
        subject: Some("big summer sale".into()),
        ..Default::default()
    };
    assert_eq!(row(&match_metadata(&meta, None, None, &req), "subject").status, VerdictStatus::Fail);
}

#[test]
fn test_email_fields_compare_address_case_insensitively() {
    let meta = metadata_with_footer("ABC2505", "US");
    let req = MetadataRequirements {
        sender: Some("NEWS@shop.example".into()),
        reply_to: Some("help@shop.example".into()),
        ..Default::default()
    };
    let rows = match_metadata(&meta, None, None, &req);
    assert_eq!(row(&rows, "sender").status, VerdictStatus::Pass);
    let reply = row(&rows, "reply_to");
    assert_eq!(reply.status, VerdictStatus::Fail);
    assert_eq!(reply.details.as_deref(), Some("not found in email"));
}

#[test]
fn test_copyright_year_pass_and_fail() {
    let meta = metadata_with_footer("ABC2505", "US");
    let req = MetadataRequirements {
        copyright_year: Some("2025".into()),
        ..Default::default()
    };
    assert_eq!(row(&match_metadata(&meta, None, None, &req), "copyright_year").status, VerdictStatus::Pass);

    let req = MetadataRequirements {
        copyright_year: Some("2024".into()),
        ..Default::default()
    };
    let rows = match_metadata(&meta, None, None, &req);
    let year = row(&rows, "copyright_year");
    assert_eq!(year.status, VerdictStatus::Fail);
    assert_eq!(year.actual.as_deref(), Some("2025"));
}

#[test]
fn test_footer_code_passes_with_prefixes_on_either_side() {
    let meta = metadata_with_footer("ABC2505", "US");
    for expected in ["ABC2505", "0_ABC2505", "456_ABC2505"] {
        let req = MetadataRequirements {
            footer_campaign_code: Some(expected.into()),
            country: Some("us".into()),
            ..Default::default()
        };
        let rows = match_metadata(&meta, None, None, &req);
        let footer = row(&rows, "footer_campaign_code");
        assert_eq!(footer.status, VerdictStatus::Pass, "expected {}", expected);
        assert_eq!(footer.actual.as_deref(), Some("ABC2505 - US"));
    }
}

#[test]
fn test_footer_code_names_failing_portion() {
    let meta = metadata_with_footer("ABC2505", "CA");
    let req = MetadataRequirements {
        footer_campaign_code: Some("ABC2505".into()),
        country: Some("US".into()),
        ..Default::default()
    };
    let rows = match_metadata(&meta, None, None, &req);
    let footer = row(&rows, "footer_campaign_code");
    assert_eq!(footer.status, VerdictStatus::Fail);
    let details = footer.details.as_deref().unwrap_or_default();
    assert!(details.contains("country mismatch"));
    assert!(!details.contains("campaign code mismatch"));

    let req = MetadataRequirements {
        footer_campaign_code: Some("XYZ1".into()),
        country: Some("CA".into()),
        ..Default::default()
    };
    let rows = match_metadata(&meta, None, None, &req);
    let details = row(&rows, "footer_campaign_code").details.clone().unwrap_or_default();
    assert!(details.contains("campaign code mismatch"));
    assert!(!details.contains("country mismatch"));
}

#[test]
fn test_footer_code_missing_in_email() {
    let req = MetadataRequirements {
        footer_campaign_code: Some("ABC2505".into()),
        ..Default::default()
    };
    let rows = match_metadata(&Metadata::default(), None, None, &req);
    let footer = row(&rows, "footer_campaign_code");
    assert_eq!(footer.status, VerdictStatus::Fail);
    assert!(footer.actual.is_none());
}

#[test]
fn test_language_row_only_when_required() {
    let meta = Metadata::default();
    assert!(match_metadata(&meta, Some("en"), None, &MetadataRequirements::default())
        .iter()
        .all(|r| r.field_name != "language"));

    let req = MetadataRequirements {
        language: Some("en".into()),
        ..Default::default()
    };
    let rows = match_metadata(&meta, Some("en-US"), None, &req);
    assert_eq!(rows.last().map(|r| r.field_name.as_str()), Some("language"));
    assert_eq!(row(&rows, "language").status, VerdictStatus::Pass);
    assert_eq!(row(&match_metadata(&meta, Some("fr"), None, &req), "language").status, VerdictStatus::Fail);
    assert_eq!(row(&match_metadata(&meta, None, None, &req), "language").status, VerdictStatus::Fail);
}

#[test]
fn test_language_row_reports_undeclared_lang() {
    let meta = Metadata::default();
    let req = MetadataRequirements {
        language: Some("en".into()),
        ..Default::default()
    };

    let undeclared = row(&match_metadata(&meta, None, None, &req), "language").clone();
    assert!(undeclared.actual.is_none());
    assert_eq!(undeclared.details.as_deref(), Some("document declares no lang attribute"));

    let assumed = row(&match_metadata(&meta, None, Some("en"), &req), "language").clone();
    assert_eq!(assumed.status, VerdictStatus::Pass);
    assert!(assumed.actual.is_none(), "the default is not reported as declared");
    assert!(assumed.details.as_deref().unwrap_or_default().contains("assumed default \"en\""));

    let declared = row(&match_metadata(&meta, Some("fr"), Some("en"), &req), "language").clone();
    assert_eq!(declared.status, VerdictStatus::Fail);
    assert_eq!(declared.actual.as_deref(), Some("fr"));
    assert!(declared.details.is_none());
}

#[test]
fn test_utm_wildcard_and_absent() {
    let domains = DomainSettings::default();
    let l = link("https://shop.example/?utm_source=newsletter&utm_medium=", &[
        ("utm_source", "newsletter"),
        ("utm_medium", ""),
    ]);
    let rows = match_utm(
        &l,
        &required(&[("utm_source", "*"), ("utm_medium", "*"), ("utm_content", "*")]),
        &domains,
    );
    assert_eq!(rows[0].status, VerdictStatus::Pass);
    assert_eq!(rows[1].status, VerdictStatus::Fail);
    assert_eq!(rows[1].details.as_deref(), Some("parameter empty"));
    assert_eq!(rows[2].status, VerdictStatus::Fail);
    assert_eq!(rows[2].details.as_deref(), Some("parameter absent"));
}

#[test]
fn test_utm_campaign_ignores_prefix() {
    let domains = DomainSettings::default();
    let l = link("https://shop.example/", &[("utm_campaign", "456_ABC2505")]);
    let rows = match_utm(&l, &required(&[("utm_campaign", "0_ABC2505")]), &domains);
    assert_eq!(rows[0].status, VerdictStatus::Pass);

    let rows = match_utm(&l, &required(&[("utm_campaign", "ABC2506")]), &domains);
    assert_eq!(rows[0].status, VerdictStatus::Fail);
}

#[test]
fn test_utm_other_params_exact_case_sensitive() {
    let domains = DomainSettings::default();
    let l = link("https://shop.example/", &[("utm_source", "Email"), ("utm_extra", "x")]);
    let rows = match_utm(&l, &required(&[("utm_source", "email")]), &domains);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, VerdictStatus::Fail);
}

#[test]
fn test_utm_domain_allow_list_overrides_requirement() {
    let mut domains = DomainSettings::default();
    let mut entry = DomainEntry::default();
    entry
        .allowed_utm_parameters
        .insert("utm_source".into(), vec!["newsletter".into(), "email".into()]);
    entry.allowed_utm_parameters.insert("utm_content".into(), vec!["*".into()]);
    domains.insert_primary("shop.example", entry);

    let l = link("https://shop.example/", &[("utm_source", "newsletter"), ("utm_content", "hero")]);
    let rows = match_utm(
        &l,
        &required(&[("utm_source", "email"), ("utm_content", "footer")]),
        &domains,
    );
    assert_eq!(rows[0].status, VerdictStatus::Pass);
    assert_eq!(rows[0].expected.as_deref(), Some("newsletter, email"));
    assert_eq!(rows[1].status, VerdictStatus::Pass);

    let other = link("https://other.example/", &[("utm_source", "newsletter")]);
    let rows = match_utm(&other, &required(&[("utm_source", "email")]), &domains);
    assert_eq!(rows[0].status, VerdictStatus::Fail);
}

#[test]
fn test_utm_skips_non_http_links() {
    let mut l = link("mailto:help@shop.example", &[]);
    l.kind = LinkKind::NonHttp;
    l.url = None;
    let rows = match_utm(&l, &required(&[("utm_source", "*")]), &DomainSettings::default());
    assert!(rows.is_empty());
}

#[test]
fn test_host_key_includes_port() {
    let url = Url::parse("http://localhost:5001/page").expect("url");
    assert_eq!(host_key(&url).as_deref(), Some("localhost:5001"));
    let url = Url::parse("https://shop.example/page").expect("url");
    assert_eq!(host_key(&url).as_deref(), Some("shop.example"));
}

#[test]
fn test_link_alt_verdicts() {
    let mut l = link("https://shop.example/", &[]);
    assert!(match_link_alt(&l).is_none());
    l.is_image_link = true;
    l.image_alt = Some("Shop the sale".into());
    assert_eq!(match_link_alt(&l).map(|v| v.status), Some(VerdictStatus::Pass));
    l.image_alt = Some("  ".into());
    assert_eq!(match_link_alt(&l).map(|v| v.status), Some(VerdictStatus::Warn));
    l.image_alt = None;
    assert_eq!(match_link_alt(&l).map(|v| v.status), Some(VerdictStatus::Warn));
}

#[test]
fn test_standalone_image_verdicts() {
    let image = |alt: Option<&str>, size: Option<u32>| Image {
        index: 3,
        src: "/img/banner.jpg".into(),
        alt: alt.map(str::to_string),
        width: size,
        height: size,
        is_inside_link: false,
    };
    assert_eq!(match_image(&image(Some("Banner"), None)).status, VerdictStatus::Pass);
    assert_eq!(match_image(&image(Some(" "), None)).status, VerdictStatus::Warn);
    let missing = match_image(&image(None, Some(600)));
    assert_eq!(missing.status, VerdictStatus::Fail);
    assert_eq!(missing.field_name, "/img/banner.jpg");
    assert_eq!(match_image(&image(None, Some(1))).status, VerdictStatus::Info);
}
