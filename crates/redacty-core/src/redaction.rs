//! Email redaction and text rewriting
//!
//! The [`Redactor`] decides per detected address whether it is masked, and
//! [`Redactor::rewrite`] applies those decisions to a whole text value. Neither
//! touches the database, so both can be exercised on plain strings.

use crate::detection::EmailMatcher;
use regex::Regex;
use std::borrow::Cow;
use std::cmp::Reverse;
use tracing::debug;

/// Runs of local-part or domain characters; everything but the `@` in practice.
const MASK_RUN_PATTERN: &str = r"[a-zA-Z0-9._%+-]+";

pub const MASK_TOKEN: &str = "*";

#[derive(Debug, Clone)]
pub struct Redactor {
    matcher: EmailMatcher,
    mask_runs: Regex,
    excluded_domain: String,
}

impl Redactor {
    /// An empty `excluded_domain` is a suffix of every address, so nothing
    /// gets redacted with it.
    pub fn new(excluded_domain: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            matcher: EmailMatcher::new()?,
            mask_runs: Regex::new(MASK_RUN_PATTERN)?,
            excluded_domain: excluded_domain.into(),
        })
    }

    pub fn excluded_domain(&self) -> &str {
        &self.excluded_domain
    }

    pub fn matcher(&self) -> &EmailMatcher {
        &self.matcher
    }

    /// Masked form of `email`, or `None` when it is left alone.
    ///
    /// The exclusion is a plain suffix comparison: with `example.com` excluded,
    /// `mail@foo.example.com` and `mail@notexample.com` are both kept.
    pub fn anonymize_email(&self, email: &str) -> Option<String> {
        if !self.matcher.is_email(email) || email.ends_with(&self.excluded_domain) {
            return None;
        }

        Some(self.mask_runs.replace_all(email, MASK_TOKEN).into_owned())
    }

    /// Replaces every occurrence of each redactable address found in `text`.
    ///
    /// Returns the input borrowed when nothing was replaced.
    pub fn rewrite<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut redactions: Vec<(&str, String)> = Vec::new();

        for candidate in self.matcher.find(text) {
            if redactions.iter().any(|(seen, _)| *seen == candidate) {
                continue;
            }
            if let Some(masked) = self.anonymize_email(candidate) {
                redactions.push((candidate, masked));
            }
        }

        if redactions.is_empty() {
            return Cow::Borrowed(text);
        }

        // Longer addresses first, so a shorter one that is a suffix of a longer
        // one cannot mask only part of it.
        redactions.sort_by_key(|(original, _)| Reverse(original.len()));

        let mut rewritten = text.to_string();
        for (original, masked) in &redactions {
            rewritten = rewritten.replace(original, masked);
        }

        debug!("Redacted {} distinct addresses", redactions.len());
        Cow::Owned(rewritten)
    }
}
