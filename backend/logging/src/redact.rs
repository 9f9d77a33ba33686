//! Log Redaction Layer
//!
//! Student text can carry phone numbers or e-mail addresses; tokens can leak
//! from backend errors. All of them are scrubbed before logging.

use regex::Regex;
use std::sync::LazyLock;

static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3,5}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{32,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    let redacted = EMAIL_RE.replace_all(&redacted, "[REDACTED_EMAIL]");
    TELEPHONE_RE
        .replace_all(&redacted, "[REDACTED_PHONE]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrubs_contact_details() {
        let raw = "call me on +91 98450 123 4567 or mail asha@example.org";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("asha@example.org"));
        assert!(clean.contains("[REDACTED_EMAIL]"));
        assert!(clean.contains("[REDACTED_PHONE]"));
    }

    #[test]
    fn scrubs_bearer_tokens() {
        let clean = redact_sensitive_data("upstream said: Bearer eyJhbGciOiJIUzI1NiJ9");
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiJ9"));
    }

    #[test]
    fn leaves_short_numbers_alone() {
        let text = "A 5 kg box accelerates at 2 m/s^2";
        assert_eq!(redact_sensitive_data(text), text);
    }
}
