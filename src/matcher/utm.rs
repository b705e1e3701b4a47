//! UTM parameter and link alt-text matching.

use url::Url;

use crate::config::DomainSettings;
use crate::normalize::{campaign_suffix, non_blank};
use crate::parse::{Link, LinkKind};
use crate::report::{FieldVerdict, VerdictStatus};

/// Expected value meaning "present and non-empty".
pub const ANY_VALUE: &str = "*";
const CAMPAIGN_PARAM: &str = "utm_campaign";

/// Host key used for domain lookups: `host` or `host:port`.
pub fn host_key(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

/// Checks every required UTM parameter on one link.
///
/// Non-web links (`mailto:`, `tel:`, fragments) carry no tracking and get no
/// rows. Parameters present on the link but not required are ignored.
pub fn match_utm(
    link: &Link,
    required: &[(String, String)],
    domains: &DomainSettings,
) -> Vec<FieldVerdict> {
    if link.kind == LinkKind::NonHttp {
        return Vec::new();
    }
    let host = link.url.as_ref().and_then(host_key);
    required
        .iter()
        .map(|(param, expected)| {
            let allowed = host
                .as_deref()
                .and_then(|h| domains.allowed_utm_values(h, param));
            let actual = link.query.get(param).map(String::as_str);
            match allowed {
                Some(values) => match_allowed(param, values, actual),
                None => match_param(param, expected, actual),
            }
        })
        .collect()
}

fn match_param(param: &str, expected: &str, actual: Option<&str>) -> FieldVerdict {
    let expected_owned = Some(expected.to_string());
    let Some(actual) = actual else {
        return FieldVerdict::new(param, expected_owned, None, VerdictStatus::Fail)
            .with_details("parameter absent");
    };
    let actual_owned = Some(actual.to_string());

    if expected == ANY_VALUE {
        return if non_blank(actual).is_some() {
            FieldVerdict::new(param, expected_owned, actual_owned, VerdictStatus::Pass)
                .with_details("any non-empty value accepted")
        } else {
            FieldVerdict::new(param, expected_owned, actual_owned, VerdictStatus::Fail)
                .with_details("parameter empty")
        };
    }

    if param == CAMPAIGN_PARAM {
        let (want, got) = (campaign_suffix(expected), campaign_suffix(actual));
        let status = if want == got {
            VerdictStatus::Pass
        } else {
            VerdictStatus::Fail
        };
        let verdict = FieldVerdict::new(param, expected_owned, actual_owned, status);
        return if status == VerdictStatus::Pass && expected.trim() != actual.trim() {
            verdict.with_details(format!("campaign codes match without prefix ({})", got))
        } else if status == VerdictStatus::Fail {
            verdict.with_details(format!("campaign code {} != {}", got, want))
        } else {
            verdict
        };
    }

    let status = if expected == actual {
        VerdictStatus::Pass
    } else {
        VerdictStatus::Fail
    };
    FieldVerdict::new(param, expected_owned, actual_owned, status)
}

/// A domain allow-list replaces the requirement value for this parameter.
fn match_allowed(param: &str, allowed: &[String], actual: Option<&str>) -> FieldVerdict {
    let expected = Some(allowed.join(", "));
    let Some(actual) = actual else {
        return FieldVerdict::new(param, expected, None, VerdictStatus::Fail)
            .with_details("parameter absent");
    };
    let present = non_blank(actual).is_some();
    let accepted = allowed.iter().any(|value| {
        if value == ANY_VALUE {
            present
        } else if param == CAMPAIGN_PARAM {
            campaign_suffix(value) == campaign_suffix(actual)
        } else {
            value == actual
        }
    });
    let status = if accepted {
        VerdictStatus::Pass
    } else {
        VerdictStatus::Fail
    };
    FieldVerdict::new(param, expected, Some(actual.to_string()), status)
        .with_details(if accepted {
            "allowed by domain configuration"
        } else {
            "not among the domain's allowed values"
        })
}

/// Alt-text verdict for an image wrapped in a link: PASS, or WARN when the
/// alt is blank or missing.
pub fn match_link_alt(link: &Link) -> Option<FieldVerdict> {
    if !link.is_image_link {
        return None;
    }
    let actual = link.image_alt.clone();
    Some(match actual.as_deref().and_then(non_blank) {
        Some(_) => FieldVerdict::new("alt_text", None, actual, VerdictStatus::Pass),
        None => FieldVerdict::new("alt_text", None, actual, VerdictStatus::Warn)
            .with_details("linked image has no alt text"),
    })
}
