// Parse module tests.

use super::*;
use crate::error_handling::{CheckStats, InfoType, InputError, WarningType};
use url::Url;

const SAMPLE_EMAIL: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Fallback title</title>
  <meta name="subject" content="Big Summer Sale">
  <meta name="sender" content="Shop News <news@shop.example>">
  <meta name="sender-name" content="Shop News">
  <meta name="reply-to" content="help@shop.example">
</head>
<body>
  <div class="preheader" style="display:none">Up to 50% off&#8204;&nbsp;&#8204;&nbsp;&#8204;</div>
  <a href="https://shop.example/sale?utm_source=email&amp;utm_campaign=123_ABC2505">Shop now</a>
  <a href="https://shop.example/men?utm_source=a&amp;utm_source=b"><img src="/img/men.png" alt="Men's collection"></a>
  <a href="/relative/path?utm_medium=email">Relative</a>
  <a href="mailto:help@shop.example">Email us</a>
  <img src="/img/banner.jpg" alt="Summer banner">
  <img src="/img/no-alt.jpg">
  <img src="https://track.example/open.gif" width="1" height="1">
  <table class="footer">
    <tr><td>© 2025 Shop Inc.</td></tr>
    <tr><td>Campaign Code: 123_ABC2505 - US</td></tr>
  </table>
</body>
</html>"#;

fn parse(html: &str) -> (EmailDocument, CheckStats) {
    let stats = CheckStats::new();
    let doc = EmailDocument::parse(html, None, &stats).expect("valid email");
    (doc, stats)
}

#[test]
fn test_parse_rejects_empty_and_non_html() {
    let stats = CheckStats::new();
    assert!(matches!(
        EmailDocument::parse("   \n", None, &stats),
        Err(InputError::EmptyDocument)
    ));
    assert!(matches!(
        EmailDocument::parse("just some text", None, &stats),
        Err(InputError::NotHtml)
    ));
}

#[test]
fn test_metadata_from_meta_tags() {
    let (doc, stats) = parse(SAMPLE_EMAIL);
    let meta = doc.metadata();
    assert_eq!(meta.subject.as_deref(), Some("Big Summer Sale"));
    assert_eq!(meta.sender.as_deref(), Some("Shop News <news@shop.example>"));
    assert_eq!(meta.sender_name.as_deref(), Some("Shop News"));
    assert_eq!(meta.reply_to.as_deref(), Some("help@shop.example"));
    assert_eq!(doc.language(), Some("en"));
    assert_eq!(stats.get_warning_count(WarningType::MissingSender), 0);
}

#[test]
fn test_metadata_fallback_elements() {
    let html = r#"<html><head><title> Weekly   Deals </title></head><body>
        <from>deals@shop.example</from><from-name>Deals Team</from-name>
        <reply-to>support@shop.example</reply-to><p>Hi</p></body></html>"#;
    let (doc, _) = parse(html);
    let meta = doc.metadata();
    assert_eq!(meta.subject.as_deref(), Some("Weekly Deals"));
    assert_eq!(meta.sender.as_deref(), Some("deals@shop.example"));
    assert_eq!(meta.sender_name.as_deref(), Some("Deals Team"));
    assert_eq!(meta.reply_to.as_deref(), Some("support@shop.example"));
}

#[test]
fn test_metadata_alternate_meta_names() {
    let html = r#"<html><head>
        <meta name="sender_address" content="a@shop.example">
        <meta name="reply_address" content="b@shop.example">
        </head><body><p>x</p></body></html>"#;
    let (doc, _) = parse(html);
    assert_eq!(doc.metadata().sender.as_deref(), Some("a@shop.example"));
    assert_eq!(doc.metadata().reply_to.as_deref(), Some("b@shop.example"));
}

#[test]
fn test_missing_metadata_counts_warnings() {
    let (doc, stats) = parse("<html><body><p>Nothing here</p></body></html>");
    let meta = doc.metadata();
    assert!(meta.sender.is_none());
    assert!(meta.subject.is_none());
    assert!(meta.preheader.is_none());
    assert!(meta.copyright_year.is_none());
    assert!(meta.footer_code.is_none());
    assert_eq!(stats.get_warning_count(WarningType::MissingSender), 1);
    assert_eq!(stats.get_warning_count(WarningType::MissingSubject), 1);
    assert_eq!(stats.get_warning_count(WarningType::MissingFooterCampaignCode), 1);
}

#[test]
fn test_preheader_truncated_at_invisible_padding() {
    let (doc, _) = parse(SAMPLE_EMAIL);
    assert_eq!(doc.metadata().preheader.as_deref(), Some("Up to 50% off"));
}

#[test]
fn test_preheader_class_priority_and_fallback() {
    let html = r#"<html><body>
        <span class="preview">Second choice</span>
        <div class="hidden preview-text">&#8204;Padding first then text</div>
        </body></html>"#;
    let (doc, _) = parse(html);
    // `preview-text` outranks `preview`; its text starts with padding, so the
    // cleaned text is used instead.
    assert_eq!(
        doc.metadata().preheader.as_deref(),
        Some("Padding first then text")
    );
}

#[test]
fn test_footer_facts_from_footer_table() {
    let (doc, stats) = parse(SAMPLE_EMAIL);
    let meta = doc.metadata();
    assert_eq!(meta.copyright_year.as_deref(), Some("2025"));
    let code = meta.footer_code.as_ref().expect("footer code");
    assert_eq!(code.code, "ABC2505");
    assert_eq!(code.country, "US");
    assert_eq!(stats.get_warning_count(WarningType::MissingCopyright), 0);
}

#[test]
fn test_footer_facts_fall_back_to_body_text() {
    let html = r#"<html><body><p>Thanks for reading.</p>
        <p>Shop Inc. @2024 | XY99 - CA |</p></body></html>"#;
    let (doc, _) = parse(html);
    let meta = doc.metadata();
    assert_eq!(meta.copyright_year.as_deref(), Some("2024"));
    let code = meta.footer_code.as_ref().expect("footer code");
    assert_eq!((code.code.as_str(), code.country.as_str()), ("XY99", "CA"));
}

#[test]
fn test_copyright_year_not_taken_from_attributes() {
    let html = r#"<html><body><img src="https://cdn.example.com/hero@2024.png" alt="Hero">
        <p>Thanks for reading</p></body></html>"#;
    let (doc, stats) = parse(html);
    assert!(doc.metadata().copyright_year.is_none());
    assert_eq!(stats.get_warning_count(WarningType::MissingCopyright), 1);
}

#[test]
fn test_footer_element_preferred_over_body() {
    let html = r#"<html><body>
        <p>Last year's promo: © 2023</p>
        <footer>© 2025 Shop Inc.</footer></body></html>"#;
    let (doc, _) = parse(html);
    assert_eq!(doc.metadata().copyright_year.as_deref(), Some("2025"));
}

#[test]
fn test_links_in_document_order() {
    let (doc, _) = parse(SAMPLE_EMAIL);
    let links = doc.links();
    assert_eq!(links.len(), 4);
    assert_eq!(links[0].index, 0);
    assert_eq!(links[0].visible_text, "Shop now");
    assert_eq!(links[0].kind, LinkKind::Http);
    assert_eq!(links[0].query.get("utm_campaign").map(String::as_str), Some("123_ABC2505"));
    assert!(!links[0].is_image_link);
}

#[test]
fn test_image_link_uses_alt_and_last_duplicate_param() {
    let (doc, _) = parse(SAMPLE_EMAIL);
    let link = &doc.links()[1];
    assert!(link.is_image_link);
    assert_eq!(link.visible_text, "Men's collection");
    assert_eq!(link.image_alt.as_deref(), Some("Men's collection"));
    assert_eq!(link.query.get("utm_source").map(String::as_str), Some("b"));
}

#[test]
fn test_image_link_without_alt_uses_file_name() {
    let html = r#"<html><body><a href="https://shop.example/"><img src="https://cdn.example/hero-banner.png?v=2"></a></body></html>"#;
    let (doc, _) = parse(html);
    let link = &doc.links()[0];
    assert_eq!(link.visible_text, "hero-banner.png");
    assert!(link.image_alt.is_none());
}

#[test]
fn test_relative_and_non_http_links() {
    let (doc, stats) = parse(SAMPLE_EMAIL);
    let relative = &doc.links()[2];
    assert_eq!(relative.kind, LinkKind::Unresolved);
    assert!(relative.url.is_none());
    assert_eq!(relative.query.get("utm_medium").map(String::as_str), Some("email"));

    let mailto = &doc.links()[3];
    assert_eq!(mailto.kind, LinkKind::NonHttp);
    assert_eq!(stats.get_info_count(InfoType::NonHttpLinkSkipped), 1);
    assert_eq!(stats.get_info_count(InfoType::UnresolvedRelativeLink), 1);
}

#[test]
fn test_relative_links_resolve_against_base() {
    let stats = CheckStats::new();
    let base = Url::parse("https://shop.example/emails/").expect("base");
    let doc = EmailDocument::parse(SAMPLE_EMAIL, Some(&base), &stats).expect("valid");
    let relative = &doc.links()[2];
    assert_eq!(relative.kind, LinkKind::Http);
    assert_eq!(
        relative.target_key(),
        Some("https://shop.example/relative/path?utm_medium=email")
    );
}

#[test]
fn test_resolve_href_variants() {
    assert_eq!(resolve_href("#top", None).0, LinkKind::NonHttp);
    assert_eq!(resolve_href("", None).0, LinkKind::NonHttp);
    assert_eq!(resolve_href("tel:+15551234", None).0, LinkKind::NonHttp);
    let (kind, url) = resolve_href("//cdn.example/x", None);
    assert_eq!(kind, LinkKind::Http);
    assert_eq!(url.expect("url").as_str(), "https://cdn.example/x");
    assert_eq!(resolve_href("http://exa mple.com", None).0, LinkKind::Unresolved);
    let long = format!("https://shop.example/{}", "a".repeat(3000));
    assert_eq!(resolve_href(&long, None).0, LinkKind::Unresolved);
}

#[test]
fn test_images_split_standalone_and_linked() {
    let (doc, stats) = parse(SAMPLE_EMAIL);
    assert_eq!(doc.images().len(), 4);
    let standalone: Vec<_> = doc.standalone_images().collect();
    assert_eq!(standalone.len(), 3);
    assert!(doc.images()[0].is_inside_link);
    assert_eq!(standalone[0].alt.as_deref(), Some("Summer banner"));
    assert!(standalone[1].alt.is_none());
    assert!(standalone[2].is_tracking_pixel());
    assert_eq!(stats.get_info_count(InfoType::TrackingPixel), 1);
    assert_eq!(stats.get_warning_count(WarningType::MissingAltText), 1);
}
