//! Title matching policies.
//!
//! Reconciliation compares titles through a [`TitleMatcher`], which maps a
//! raw title to the key used for equality. The default policy is exact
//! string equality; anything looser is opt-in configuration.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Maps a title to its comparison key.
///
/// ## Design Note
/// - `Send + Sync` so one matcher can be shared by every request
/// - Keys borrow from the input when no normalization is needed
pub trait TitleMatcher: Send + Sync {
    /// Returns the name of this policy (for logging)
    fn name(&self) -> &str;

    /// Comparison key for a title. An empty key never matches.
    fn key<'a>(&self, title: &'a str) -> Cow<'a, str>;
}

/// Raw string equality: case- and whitespace-sensitive
pub struct ExactTitle;

impl TitleMatcher for ExactTitle {
    fn name(&self) -> &str {
        "exact"
    }

    fn key<'a>(&self, title: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(title)
    }
}

/// Trims surrounding whitespace and lowercases before comparing
pub struct CaseInsensitiveTitle;

impl TitleMatcher for CaseInsensitiveTitle {
    fn name(&self) -> &str {
        "case-insensitive"
    }

    fn key<'a>(&self, title: &'a str) -> Cow<'a, str> {
        let trimmed = title.trim();
        let lowered = trimmed.to_lowercase();
        if lowered == trimmed {
            Cow::Borrowed(trimmed)
        } else {
            Cow::Owned(lowered)
        }
    }
}

/// Configuration-level choice of matching policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitleMatching {
    #[default]
    Exact,
    CaseInsensitive,
}

impl TitleMatching {
    pub fn matcher(&self) -> &'static dyn TitleMatcher {
        match self {
            TitleMatching::Exact => &ExactTitle,
            TitleMatching::CaseInsensitive => &CaseInsensitiveTitle,
        }
    }
}

impl fmt::Display for TitleMatching {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.matcher().name())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown title matching policy {0:?} (expected `exact` or `case-insensitive`)")]
pub struct UnknownTitleMatching(pub String);

impl FromStr for TitleMatching {
    type Err = UnknownTitleMatching;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(TitleMatching::Exact),
            "case-insensitive" | "case_insensitive" | "ci" => Ok(TitleMatching::CaseInsensitive),
            _ => Err(UnknownTitleMatching(s.to_string())),
        }
    }
}
