//! Per-domain destination configuration.
//!
//! Loaded from a JSON file shaped like:
//!
//! ```json
//! {
//!   "domains": {
//!     "primary": { "shop.example.com": { "product_table_check": true } },
//!     "test":    { "localhost:5001":   { "product_table_check": true } }
//!   },
//!   "global_settings": { "max_retries": 3, "request_timeout": 10 }
//! }
//! ```
//!
//! Unknown keys are ignored. A missing file section simply means "no domain
//! opts in", so an empty `DomainSettings` disables product checks entirely.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use crate::config::constants::{DEFAULT_LANGUAGE, DEFAULT_PRODUCT_MARKERS};
use crate::error_handling::ConfigError;

/// Settings for one destination host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DomainEntry {
    /// Whether destination pages on this host must show a product listing
    pub product_table_check: bool,
    /// Class-name markers identifying the product listing
    pub expected_classes: Vec<String>,
    /// Language code to localized host (e.g. `"es" -> "shop.example.mx"`)
    pub localized_versions: HashMap<String, String>,
    /// Parameter name to allowed values; `"*"` accepts any non-empty value
    pub allowed_utm_parameters: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct DomainTables {
    #[serde(deserialize_with = "lowercase_hosts")]
    primary: HashMap<String, DomainEntry>,
    #[serde(deserialize_with = "lowercase_hosts")]
    test: HashMap<String, DomainEntry>,
}

// Host keys are matched case-insensitively; `get` lower-cases the query.
fn lowercase_hosts<'de, D>(deserializer: D) -> Result<HashMap<String, DomainEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let table = HashMap::<String, DomainEntry>::deserialize(deserializer)?;
    Ok(table
        .into_iter()
        .map(|(host, entry)| (host.to_ascii_lowercase(), entry))
        .collect())
}

/// Settings shared by every domain.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    /// Retries after the first reachability attempt
    pub max_retries: Option<usize>,
    /// Per-request timeout in seconds
    pub request_timeout: Option<u64>,
    /// Language assumed for documents without a `lang` attribute
    pub default_language: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            max_retries: None,
            request_timeout: None,
            default_language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

/// Domain configuration consulted by the matcher and the destination checker.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DomainSettings {
    domains: DomainTables,
    /// Settings shared by every domain
    pub global_settings: GlobalSettings,
}

impl DomainSettings {
    /// Parses domain settings from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::InvalidJson)
    }

    /// Loads domain settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let settings = Self::from_json(&raw)?;
        log::info!(
            "Loaded domain configuration from {} ({} primary, {} test domains)",
            path.display(),
            settings.domains.primary.len(),
            settings.domains.test.len()
        );
        Ok(settings)
    }

    /// Registers (or replaces) a primary domain entry.
    pub fn insert_primary(&mut self, host: impl Into<String>, entry: DomainEntry) {
        self.domains.primary.insert(host.into().to_ascii_lowercase(), entry);
    }

    /// Registers (or replaces) a test domain entry.
    pub fn insert_test(&mut self, host: impl Into<String>, entry: DomainEntry) {
        self.domains.test.insert(host.into().to_ascii_lowercase(), entry);
    }

    /// Looks up the entry for a host (optionally `host:port`).
    ///
    /// Primary domains are consulted first, then test domains, then any
    /// primary domain listing the host among its localized versions. A
    /// `host:port` key with no entry of its own falls back to the bare host.
    pub fn get(&self, host: &str) -> Option<&DomainEntry> {
        let host = host.to_ascii_lowercase();
        self.lookup(&host).or_else(|| {
            host.rsplit_once(':')
                .and_then(|(bare, _port)| self.lookup(bare))
        })
    }

    fn lookup(&self, host: &str) -> Option<&DomainEntry> {
        self.domains
            .primary
            .get(host)
            .or_else(|| self.domains.test.get(host))
            .or_else(|| {
                self.domains.primary.values().find(|entry| {
                    entry
                        .localized_versions
                        .values()
                        .any(|localized| localized.eq_ignore_ascii_case(host))
                })
            })
    }

    /// Whether destination pages on `host` need product-listing verification.
    pub fn requires_product_check(&self, host: &str) -> bool {
        self.get(host).is_some_and(|e| e.product_table_check)
    }

    /// Product-listing markers expected on `host`, in priority order.
    pub fn expected_markers(&self, host: &str) -> Vec<String> {
        match self.get(host) {
            Some(entry) if !entry.expected_classes.is_empty() => entry.expected_classes.clone(),
            _ => DEFAULT_PRODUCT_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
        }
    }

    /// Allowed values for `param` on `host`, when the domain restricts it.
    pub fn allowed_utm_values(&self, host: &str, param: &str) -> Option<&[String]> {
        self.get(host)
            .and_then(|e| e.allowed_utm_parameters.get(param))
            .map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": "1.0.0",
        "domains": {
            "primary": {
                "shop.example.com": {
                    "product_table_check": true,
                    "expected_classes": ["productGrid"],
                    "localized_versions": {"es": "shop.example.mx"},
                    "allowed_utm_parameters": {"utm_source": ["newsletter", "email"], "utm_content": ["*"]}
                },
                "blog.example.com": {}
            },
            "test": {
                "localhost:5001": {"product_table_check": true, "is_test_domain": true}
            }
        },
        "global_settings": {"max_retries": 3, "request_timeout": 7}
    }"#;

    #[test]
    fn test_lookup_primary_test_and_localized() {
        let settings = DomainSettings::from_json(SAMPLE).expect("valid config");
        assert!(settings.get("shop.example.com").is_some());
        assert!(settings.get("SHOP.EXAMPLE.COM").is_some());
        assert!(settings.requires_product_check("localhost:5001"));
        // Localized host resolves to the primary entry
        assert!(settings.requires_product_check("shop.example.mx"));
        assert!(settings.get("unknown.example.org").is_none());
    }

    #[test]
    fn test_mixed_case_host_keys_match() {
        let settings = DomainSettings::from_json(
            r#"{"domains": {
                "primary": {"Shop.Example.com": {"product_table_check": true}},
                "test": {"LocalHost:5001": {"product_table_check": true}}
            }}"#,
        )
        .expect("valid config");
        assert!(settings.requires_product_check("shop.example.com"));
        assert!(settings.requires_product_check("SHOP.example.COM:443"));
        assert!(settings.requires_product_check("localhost:5001"));

        let mut settings = DomainSettings::default();
        settings.insert_primary("Mail.Example.org", DomainEntry::default());
        assert!(settings.get("mail.example.org").is_some());
    }

    #[test]
    fn test_lookup_with_port_falls_back_to_host() {
        let settings = DomainSettings::from_json(SAMPLE).expect("valid config");
        assert!(settings.requires_product_check("shop.example.com:8443"));
        assert!(settings.get("localhost:9999").is_none());
    }

    #[test]
    fn test_product_check_flags() {
        let settings = DomainSettings::from_json(SAMPLE).expect("valid config");
        assert!(settings.requires_product_check("shop.example.com"));
        assert!(!settings.requires_product_check("blog.example.com"));
        assert!(!settings.requires_product_check("unknown.example.org"));
    }

    #[test]
    fn test_expected_markers_fall_back_to_defaults() {
        let settings = DomainSettings::from_json(SAMPLE).expect("valid config");
        assert_eq!(settings.expected_markers("shop.example.com"), vec!["productGrid"]);
        assert_eq!(
            settings.expected_markers("blog.example.com"),
            vec!["product-table", "productListContainer"]
        );
    }

    #[test]
    fn test_allowed_utm_values() {
        let settings = DomainSettings::from_json(SAMPLE).expect("valid config");
        let allowed = settings
            .allowed_utm_values("shop.example.com", "utm_source")
            .expect("restricted");
        assert_eq!(allowed, ["newsletter".to_string(), "email".to_string()]);
        assert!(settings
            .allowed_utm_values("shop.example.com", "utm_medium")
            .is_none());
    }

    #[test]
    fn test_global_settings() {
        let settings = DomainSettings::from_json(SAMPLE).expect("valid config");
        assert_eq!(settings.global_settings.max_retries, Some(3));
        assert_eq!(settings.global_settings.request_timeout, Some(7));
        assert_eq!(settings.global_settings.default_language, "en");
    }

    #[test]
    fn test_empty_and_invalid_json() {
        let settings = DomainSettings::from_json("{}").expect("empty object is valid");
        assert!(!settings.requires_product_check("shop.example.com"));
        assert!(DomainSettings::from_json("{not json").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = DomainSettings::load(Path::new("/definitely/not/here.json"))
            .expect_err("missing file");
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }
}
