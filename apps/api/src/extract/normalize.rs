//! Deterministic normalizers for well-formed contact tokens. Both scan in
//! document order and take the first qualifying match: the contact block
//! is conventionally near the top of a résumé. Absence is `None`, never an
//! error.

use std::sync::LazyLock;

use regex::Regex;

use super::text::ExtractedText;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("valid email pattern")
});

/// Candidate runs of digits separated by `+ - ( ) . space`. Length and
/// digit-count rules are enforced in `normalize_phone`.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+?[0-9][0-9()\-. ]{4,}[0-9]").expect("valid phone pattern")
});

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// First email address in document order, or `None`.
pub fn find_email(text: &ExtractedText) -> Option<String> {
    first_email(&text.full_text())
}

/// First phone number in document order, normalized to digits with an
/// optional leading `+`, or `None`.
pub fn find_phone(text: &ExtractedText) -> Option<String> {
    first_phone(&text.full_text())
}

pub fn first_email(text: &str) -> Option<String> {
    EMAIL_RE.find(text).map(|m| m.as_str().to_string())
}

pub fn first_phone(text: &str) -> Option<String> {
    PHONE_RE
        .find_iter(text)
        .find_map(|m| normalize_phone(m.as_str()))
}

/// Strips separators from a phone candidate, keeping digits and a leading
/// `+`. Candidates outside the 7–15 digit range are rejected.
fn normalize_phone(candidate: &str) -> Option<String> {
    let digits: String = candidate.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS || digits.len() > MAX_PHONE_DIGITS {
        return None;
    }
    if candidate.starts_with('+') {
        Some(format!("+{digits}"))
    } else {
        Some(digits)
    }
}

/// Whether a single line contains an email address. Used by the resolver
/// to classify contact lines.
pub fn line_has_email(line: &str) -> bool {
    EMAIL_RE.is_match(line)
}

/// Whether a single line contains a qualifying phone number.
pub fn line_has_phone(line: &str) -> bool {
    first_phone(line).is_some()
}
