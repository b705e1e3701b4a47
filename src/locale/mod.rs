//! Supported locales and requirement localization.
//!
//! A campaign is usually sent in several locales that share one set of
//! requirements and differ only in country and language. Localizing a
//! requirements document fills those in from the locale table.

use crate::error_handling::InputError;
use crate::requirements::RequirementsDocument;

/// One supported locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Locale {
    /// Locale code, e.g. `fr_CA`
    pub code: &'static str,
    /// ISO country code expected in the footer
    pub country: &'static str,
    /// Primary language subtag expected in `<html lang>`
    pub language: &'static str,
    pub display_name: &'static str,
}

/// Every locale the validator knows, in display order.
pub const SUPPORTED_LOCALES: &[Locale] = &[
    Locale {
        code: "en_US",
        country: "US",
        language: "en",
        display_name: "English (US)",
    },
    Locale {
        code: "en_CA",
        country: "CA",
        language: "en",
        display_name: "English (Canada)",
    },
    Locale {
        code: "fr_CA",
        country: "CA",
        language: "fr",
        display_name: "French (Canada)",
    },
    Locale {
        code: "es_MX",
        country: "MX",
        language: "es",
        display_name: "Spanish (Mexico)",
    },
    Locale {
        code: "fr_FR",
        country: "FR",
        language: "fr",
        display_name: "French (France)",
    },
    Locale {
        code: "it_IT",
        country: "IT",
        language: "it",
        display_name: "Italian (Italy)",
    },
    Locale {
        code: "ja_JP",
        country: "JP",
        language: "ja",
        display_name: "Japanese (Japan)",
    },
];

/// Looks up a locale by code. `fr-CA` and `FR_ca` are accepted for `fr_CA`.
pub fn find_locale(code: &str) -> Option<&'static Locale> {
    let wanted = code.trim().replace('-', "_");
    SUPPORTED_LOCALES
        .iter()
        .find(|locale| locale.code.eq_ignore_ascii_case(&wanted))
}

/// Returns a copy of `base` with country, language and locale set for `code`.
///
/// # Errors
///
/// Returns `InputError::UnsupportedLocale` when `code` is not in
/// [`SUPPORTED_LOCALES`].
pub fn localize_requirements(
    base: &RequirementsDocument,
    code: &str,
) -> Result<RequirementsDocument, InputError> {
    let locale = find_locale(code).ok_or_else(|| InputError::UnsupportedLocale(code.to_string()))?;
    let mut localized = base.clone();
    localized.metadata.country = Some(locale.country.to_string());
    localized.metadata.language = Some(locale.language.to_string());
    localized.locale = Some(locale.code.to_string());
    log::debug!("Localized requirements for {}", locale.display_name);
    Ok(localized)
}
