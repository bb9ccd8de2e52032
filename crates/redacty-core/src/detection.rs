//! Email detection using a fixed regex pattern

use regex::Regex;
use tracing::debug;

/// Lexical email shape: `local-part@domain-labels.tld`.
///
/// The `|` inside the TLD class is part of the historical pattern and is kept
/// so detection results stay identical to earlier releases.
pub const EMAIL_PATTERN: &str = r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}\b";

#[derive(Debug, Clone)]
pub struct EmailMatcher {
    pattern: Regex,
    anchored: Regex,
}

impl EmailMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        let pattern = Regex::new(EMAIL_PATTERN)?;
        let anchored = Regex::new(&format!("^(?:{})", EMAIL_PATTERN))?;
        debug!("Loaded email pattern: {}", EMAIL_PATTERN);

        Ok(Self { pattern, anchored })
    }

    /// All non-overlapping email-shaped substrings, left to right.
    ///
    /// Repeated addresses are returned once per occurrence.
    pub fn find<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.pattern.find_iter(text).map(|mat| mat.as_str()).collect()
    }

    /// Whether `candidate` starts with an email-shaped token.
    ///
    /// Only the start is anchored, so trailing text after a valid address is
    /// accepted.
    pub fn is_email(&self, candidate: &str) -> bool {
        self.anchored.is_match(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> EmailMatcher {
        EmailMatcher::new().unwrap()
    }

    #[test]
    fn test_find_multiple_emails() {
        let text = "hey can we run a test for test@example.com, \
                    please also find py@foo.bar and please don't fail lol";
        assert_eq!(matcher().find(text), vec!["test@example.com", "py@foo.bar"]);
    }

    #[test]
    fn test_find_dotted_local_part() {
        let text = "ok well this should work hello.world@gmail.com shouldn't it";
        assert_eq!(matcher().find(text), vec!["hello.world@gmail.com"]);
    }

    #[test]
    fn test_find_nothing() {
        assert!(matcher().find("this wont work, invalid.email, you kno").is_empty());
        assert!(matcher().find("").is_empty());
    }

    #[test]
    fn test_find_keeps_repeats() {
        let text = "a@b.io wrote to c@d.org and a@b.io again";
        assert_eq!(matcher().find(text), vec!["a@b.io", "c@d.org", "a@b.io"]);
    }

    #[test]
    fn test_find_with_unicode_text() {
        let text = "Grüße an jörg — schreib an jorg+news@mail.example.de bitte ✉";
        assert_eq!(matcher().find(text), vec!["jorg+news@mail.example.de"]);
    }

    #[test]
    fn test_find_requires_two_letter_tld() {
        assert!(matcher().find("broken@host.c").is_empty());
        assert_eq!(matcher().find("ok@host.co"), vec!["ok@host.co"]);
    }

    #[test]
    fn test_masked_token_is_not_an_email() {
        assert!(matcher().find("Another test email to *@*").is_empty());
    }

    #[test]
    fn test_is_email_anchored_at_start() {
        let matcher = matcher();
        assert!(matcher.is_email("test@example.com"));
        assert!(matcher.is_email("test@example.com trailing"));
        assert!(!matcher.is_email("invalid.email"));
        assert!(!matcher.is_email(" leading@example.com"));
        assert!(!matcher.is_email(""));
    }
}
