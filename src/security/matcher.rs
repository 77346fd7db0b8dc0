//! Exclusion rule matching.
//!
//! # Responsibilities
//! - Parse the comma-separated exclusion list once at startup
//! - Match request paths exactly or by prefix (`prefix/*`)
//!
//! # Design Decisions
//! - Matching is case-sensitive
//! - `.` and `..` segments are not interpreted; normalization belongs to the host
//! - Prefix rules match on segment boundaries: `/public/*` covers `/public`
//!   and `/public/x` but not `/publicx`
//! - No regex to guarantee O(n) matching

use std::fmt;

/// A single exclusion pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionRule {
    /// Matches one path exactly.
    Exact(String),
    /// Matches the prefix itself and everything below it. Stored without
    /// the trailing `/*`.
    Prefix(String),
}

impl ExclusionRule {
    /// Parse one pattern. Returns `None` for blank input.
    pub fn parse(pattern: &str) -> Option<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return None;
        }
        match pattern.strip_suffix("/*") {
            Some(prefix) => Some(Self::Prefix(prefix.to_string())),
            None => Some(Self::Exact(pattern.to_string())),
        }
    }

    /// Returns true if the path is covered by this rule.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Exact(expected) => path == expected,
            Self::Prefix(prefix) => path
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('/')),
        }
    }
}

impl fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(path) => f.write_str(path),
            Self::Prefix(prefix) => write!(f, "{}/*", prefix),
        }
    }
}

/// Immutable set of exclusion rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionRules {
    rules: Vec<ExclusionRule>,
}

impl ExclusionRules {
    /// Parse a comma-separated list such as `"/login,/public/*"`.
    /// Duplicates collapse; blank entries are ignored.
    pub fn parse(list: &str) -> Self {
        let mut rules: Vec<ExclusionRule> = Vec::new();
        for rule in list.split(',').filter_map(ExclusionRule::parse) {
            if !rules.contains(&rule) {
                rules.push(rule);
            }
        }
        Self { rules }
    }

    /// Returns true on the first rule covering `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(path))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExclusionRule> {
        self.rules.iter()
    }
}

impl fmt::Display for ExclusionRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", rule)?;
        }
        Ok(())
    }
}
