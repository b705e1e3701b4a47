//! Loading requirements and domain configuration from disk.

use std::io::Write;

use email_qa::{ConfigError, DomainSettings, InputError, RequirementsDocument};
use tempfile::NamedTempFile;

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write temp file");
    file
}

#[test]
fn test_load_requirements_root_level_shape() {
    let file = temp_file(
        r#"{"sender_address": "news@shop.example", "campaign_code": "ABC2505 - fr", "copyright_year": 2025}"#,
    );
    let requirements = RequirementsDocument::load(file.path()).expect("valid requirements");
    assert_eq!(requirements.metadata.sender.as_deref(), Some("news@shop.example"));
    assert_eq!(requirements.metadata.footer_campaign_code.as_deref(), Some("ABC2505"));
    assert_eq!(requirements.metadata.country.as_deref(), Some("FR"));
    assert_eq!(requirements.metadata.copyright_year.as_deref(), Some("2025"));
}

#[test]
fn test_load_requirements_errors() {
    let missing = tempfile::tempdir().expect("temp dir").path().join("missing.json");
    assert!(matches!(
        RequirementsDocument::load(&missing),
        Err(InputError::Io { .. })
    ));

    let broken = temp_file("{ not json");
    assert!(matches!(
        RequirementsDocument::load(broken.path()),
        Err(InputError::InvalidRequirementsJson(_))
    ));

    let array = temp_file("[1, 2]");
    assert!(matches!(
        RequirementsDocument::load(array.path()),
        Err(InputError::RequirementsNotAnObject("array"))
    ));
}

#[test]
fn test_load_domain_config() {
    let file = temp_file(
        r#"{
            "version": "1.0.0",
            "domains": {
                "primary": {"shop.example": {"product_table_check": true, "expected_classes": ["grid"], "base_url": "https://shop.example"}},
                "test": {}
            },
            "global_settings": {"max_retries": 1}
        }"#,
    );
    let domains = DomainSettings::load(file.path()).expect("valid domain config");
    assert!(domains.requires_product_check("shop.example"));
    assert_eq!(domains.expected_markers("shop.example"), vec!["grid"]);
    assert_eq!(domains.global_settings.max_retries, Some(1));

    let broken = temp_file(r#"{"domains": {"primary": []}}"#);
    assert!(matches!(
        DomainSettings::load(broken.path()),
        Err(ConfigError::InvalidJson(_))
    ));
}
