//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile route pattern strings into matchable forms
//! - Match request paths (case-sensitive)
//!
//! # Design Decisions
//! - `**` is honored as a trailing glob only; it matches the base path
//!   itself and any deeper segments
//! - Patterns with named capture groups compile to anchored regexes
//! - Everything else is an exact literal match

use regex::Regex;
use thiserror::Error;

/// Pattern compilation failure.
#[derive(Debug, Error)]
pub enum PatternError {
    #[error("invalid regex: {0}")]
    Regex(#[from] regex::Error),
}

/// A single compiled path pattern.
#[derive(Debug, Clone)]
pub enum PathPattern {
    /// Literal path, matched exactly.
    Exact(String),
    /// `<base>/**`: matches the base path and everything below it.
    Prefix(String),
    /// Anchored regex with named capture groups.
    Regex(Regex),
}

impl PathPattern {
    /// Compile a pattern string from configuration.
    pub fn compile(pattern: &str) -> Result<Self, PatternError> {
        if let Some(base) = pattern.strip_suffix("/**") {
            return Ok(PathPattern::Prefix(base.to_string()));
        }
        if pattern.contains("(?<") || pattern.contains("(?P<") {
            let anchored = format!("^{pattern}$");
            return Ok(PathPattern::Regex(Regex::new(&anchored)?));
        }
        Ok(PathPattern::Exact(pattern.to_string()))
    }

    /// Returns true if the path matches this pattern.
    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathPattern::Exact(literal) => path == literal,
            PathPattern::Prefix(base) => {
                path == base
                    || (path.len() > base.len()
                        && path.starts_with(base.as_str())
                        && path.as_bytes()[base.len()] == b'/')
            }
            PathPattern::Regex(regex) => regex.is_match(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_pattern() {
        let pattern = PathPattern::compile("/login").unwrap();
        assert!(pattern.matches("/login"));
        assert!(!pattern.matches("/login/"));
        assert!(!pattern.matches("/logout"));
    }

    #[test]
    fn test_glob_matches_base_and_descendants() {
        let pattern = PathPattern::compile("/users/**").unwrap();
        assert!(pattern.matches("/users"));
        assert!(pattern.matches("/users/42"));
        assert!(pattern.matches("/users/public/42"));
        assert!(!pattern.matches("/usersX"));
        assert!(!pattern.matches("/user"));
    }

    #[test]
    fn test_root_glob_matches_everything() {
        let pattern = PathPattern::compile("/**").unwrap();
        assert!(pattern.matches("/"));
        assert!(pattern.matches("/anything/at/all"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let pattern = PathPattern::compile("/users/**").unwrap();
        assert!(!pattern.matches("/Users/42"));
    }

    #[test]
    fn test_named_capture_pattern_is_regex() {
        let pattern = PathPattern::compile("/api-docs/users/(?<rem>.*)").unwrap();
        assert!(matches!(pattern, PathPattern::Regex(_)));
        assert!(pattern.matches("/api-docs/users/v3/api-docs"));
        assert!(!pattern.matches("/api-docs/posts/v3/api-docs"));
    }

    #[test]
    fn test_invalid_regex_is_rejected() {
        assert!(PathPattern::compile("/api-docs/users/(?<rem.*").is_err());
    }
}
