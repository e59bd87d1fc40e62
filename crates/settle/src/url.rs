//! URL patterns for url-matches waits and page objects.

use crate::result::{SettleError, SettleResult};
use std::fmt;

/// URL pattern for matching the current page
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Prefix match
    Prefix(String),
    /// Contains substring
    Contains(String),
    /// Regex match
    Regex(String),
    /// Glob pattern (e.g., "**/tickets/*")
    Glob(String),
    /// Match any URL
    Any,
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    ///
    /// # Errors
    ///
    /// Returns [`SettleError::InvalidPattern`] for a regex that does not compile.
    /// A bad pattern will never match, so callers treat it as permanent.
    pub fn matches(&self, url: &str) -> SettleResult<bool> {
        Ok(match self {
            Self::Exact(pattern) => url == pattern,
            Self::Prefix(pattern) => url.starts_with(pattern.as_str()),
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Regex(pattern) => regex::Regex::new(pattern)
                .map_err(|e| SettleError::InvalidPattern {
                    pattern: pattern.clone(),
                    message: e.to_string(),
                })?
                .is_match(url),
            Self::Glob(pattern) => glob_matches(pattern, url),
            Self::Any => true,
        })
    }
}

/// `*` matches any run of characters; everything else is literal
fn glob_matches(pattern: &str, url: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    let (first, rest) = match parts.split_first() {
        Some((first, rest)) if !rest.is_empty() => (*first, rest),
        _ => return url == pattern,
    };
    let Some(mut remaining) = url.strip_prefix(first) else {
        return false;
    };

    let (last, middle) = match rest.split_last() {
        Some((last, middle)) => (*last, middle),
        None => return true,
    };
    for part in middle.iter().filter(|part| !part.is_empty()) {
        match remaining.find(part) {
            Some(found) => remaining = &remaining[found + part.len()..],
            None => return false,
        }
    }

    // The trailing literal is anchored to the end and may not overlap
    // anything already consumed
    remaining.ends_with(last)
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "url == {p:?}"),
            Self::Prefix(p) => write!(f, "url starts with {p:?}"),
            Self::Contains(p) => write!(f, "url contains {p:?}"),
            Self::Regex(p) => write!(f, "url matches /{p}/"),
            Self::Glob(p) => write!(f, "url matches glob {p:?}"),
            Self::Any => write!(f, "any url"),
        }
    }
}
