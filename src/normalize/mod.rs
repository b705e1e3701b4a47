//! Field normalization shared by extraction and matching.
//!
//! Every comparison in the matcher goes through these helpers, so the same
//! rule is applied to the expected value and the extracted value.

/// Returns the campaign code with any variable tracking prefix removed.
///
/// The value is trimmed, then split at the LAST underscore when something
/// follows it. `"123_ABC2505"` becomes `"ABC2505"`, `"ABC2505"` and
/// `"ABC2505_"` are returned unchanged (trimmed).
///
/// ```
/// use email_qa::normalize::campaign_suffix;
///
/// assert_eq!(campaign_suffix(" 0_ABC2505 "), "ABC2505");
/// assert_eq!(campaign_suffix("X_1_ABC"), "ABC");
/// assert_eq!(campaign_suffix("ABC2505"), "ABC2505");
/// ```
pub fn campaign_suffix(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.rsplit_once('_') {
        Some((_, suffix)) if !suffix.is_empty() => suffix,
        _ => trimmed,
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Returns the trimmed value, or `None` when nothing is left.
pub fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

/// Extracts the bare address from `Display Name <addr@example.com>`.
///
/// Values without angle brackets are returned trimmed.
pub fn email_address(value: &str) -> &str {
    let trimmed = value.trim();
    match (trimmed.rfind('<'), trimmed.rfind('>')) {
        (Some(open), Some(close)) if open < close => trimmed[open + 1..close].trim(),
        _ => trimmed,
    }
}

/// Compares two email-bearing values by address, ignoring case.
pub fn emails_match(expected: &str, actual: &str) -> bool {
    email_address(expected).eq_ignore_ascii_case(email_address(actual))
}

/// Whether `c` is an invisible spacing character used to pad preheaders.
///
/// Covers zero-width spaces and joiners, word joiner and invisible operators,
/// combining grapheme joiner, bidi marks and embeddings, figure space, soft
/// hyphen, non-breaking hyphen and the byte order mark.
pub fn is_invisible_spacing(c: char) -> bool {
    matches!(
        c,
        '\u{200b}'
            | '\u{200c}'
            | '\u{2060}'..='\u{206f}'
            | '\u{034f}'
            | '\u{061c}'
            | '\u{200e}'
            | '\u{200f}'
            | '\u{202a}'..='\u{202e}'
            | '\u{2007}'
            | '\u{00ad}'
            | '\u{2011}'
            | '\u{feff}'
    )
}

/// Cuts `text` at the first invisible spacing character.
pub fn truncate_at_invisible(text: &str) -> &str {
    match text.find(is_invisible_spacing) {
        Some(idx) => &text[..idx],
        None => text,
    }
}
