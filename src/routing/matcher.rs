//! Route pattern parsing and matching.
//!
//! # Responsibilities
//! - Validate patterns at registration time
//! - Classify patterns as exact or subtree
//! - Match request paths against a pattern
//!
//! # Design Decisions
//! - A trailing `/` marks a subtree pattern (`/debug/` matches `/debug/x`)
//! - Any other pattern matches only the identical path
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching

use crate::routing::RouteError;

/// How a pattern matches request paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Exact,
    Subtree,
}

/// A validated route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    raw: String,
    kind: MatchKind,
}

impl Pattern {
    /// Parse a pattern. It must be non-empty and start with `/`.
    pub fn parse(raw: impl Into<String>) -> Result<Self, RouteError> {
        let raw = raw.into();
        if !raw.starts_with('/') || raw.contains(char::is_whitespace) {
            return Err(RouteError::InvalidPattern(raw));
        }
        let kind = if raw.ends_with('/') {
            MatchKind::Subtree
        } else {
            MatchKind::Exact
        };
        Ok(Self { raw, kind })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> MatchKind {
        self.kind
    }

    /// Returns true if `path` is served by this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self.kind {
            MatchKind::Exact => path == self.raw,
            MatchKind::Subtree => path.starts_with(&self.raw),
        }
    }

    /// Longer patterns are more specific.
    pub fn specificity(&self) -> usize {
        self.raw.len()
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
