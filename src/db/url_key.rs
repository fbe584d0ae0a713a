//! Splitting catalog URLs into scheme and remainder.
//!
//! Two URLs whose remainders (everything from the first `://` on) are equal
//! name the same logical entity, whatever their schemes.

use crate::error::{AppError, Result};

const SEPARATOR: &str = "://";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlKey<'a> {
    pub scheme: &'a str,
    /// The part after the separator, e.g. `example.com/feed`.
    pub rest: &'a str,
    suffix: &'a str,
}

impl<'a> UrlKey<'a> {
    pub fn parse(url: &'a str) -> Result<Self> {
        let malformed = |reason| AppError::MalformedUrl {
            url: url.to_string(),
            reason,
        };

        let idx = url.find(SEPARATOR).ok_or_else(|| malformed("missing `://`"))?;
        let scheme = &url[..idx];
        let rest = &url[idx + SEPARATOR.len()..];

        if scheme.is_empty() {
            return Err(malformed("empty scheme"));
        }
        if !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(malformed("invalid scheme"));
        }
        if rest.is_empty() {
            return Err(malformed("nothing after `://`"));
        }

        Ok(Self {
            scheme,
            rest,
            suffix: &url[idx..],
        })
    }

    /// The scheme-agnostic identity, `://` included.
    pub fn suffix(&self) -> &'a str {
        self.suffix
    }

    pub fn same_entity(&self, other: &UrlKey<'_>) -> bool {
        self.rest == other.rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_scheme_and_rest() {
        let key = UrlKey::parse("https://a.com/x?y=1").unwrap();
        assert_eq!(key.scheme, "https");
        assert_eq!(key.rest, "a.com/x?y=1");
        assert_eq!(key.suffix(), "://a.com/x?y=1");
    }

    #[test]
    fn scheme_change_is_same_entity() {
        let old = UrlKey::parse("http://a.com/x").unwrap();
        let new = UrlKey::parse("https://a.com/x").unwrap();
        assert!(old.same_entity(&new));
    }

    #[test]
    fn host_change_is_a_different_entity() {
        let a = UrlKey::parse("http://a.com").unwrap();
        let b = UrlKey::parse("http://b.com").unwrap();
        assert!(!a.same_entity(&b));
    }

    #[test]
    fn splits_on_the_first_separator() {
        let key = UrlKey::parse("https://a.com/r?to=http://b.com").unwrap();
        assert_eq!(key.scheme, "https");
        assert_eq!(key.rest, "a.com/r?to=http://b.com");
    }

    #[test]
    fn rejects_malformed_input() {
        for url in ["a.com/feed", "://a.com", "http://", "ht tp://a.com", "/r?to=http://a.com"] {
            assert!(
                matches!(UrlKey::parse(url), Err(AppError::MalformedUrl { .. })),
                "{url} should be rejected"
            );
        }
    }
}
