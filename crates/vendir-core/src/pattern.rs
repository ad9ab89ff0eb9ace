//! Prefix patterns: glob expressions matched against leading path components.
//!
//! ## Syntax
//!
//! A pattern is a `/`-separated glob:
//!
//! - `*` matches any run of characters within one component
//! - `?` matches one character within a component
//! - `[abc]`, `[a-z]`, `[!abc]` match a character class
//! - `{a,b}` matches either alternative
//! - `**` matches any number of whole components
//!
//! A leading `./` and trailing `/` are ignored.
//!
//! ## Prefix semantics
//!
//! A pattern matches a path when it matches the whole path or any leading
//! run of whole components of it. `pkg/a` therefore matches `pkg/a`,
//! `pkg/a/x.go` and `pkg/a/b/y.go`, but not `pkg/ab/x.go`; `pkg/*/gen`
//! matches `pkg/foo/gen/z.go`.

use std::fmt;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use thiserror::Error;

/// Error compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern is empty after normalization.
    #[error("empty pattern '{pattern}'")]
    Empty { pattern: String },

    /// Invalid glob syntax.
    #[error("invalid pattern '{pattern}': {message}")]
    Invalid { pattern: String, message: String },
}

/// A compiled prefix pattern.
#[derive(Debug, Clone)]
pub struct PrefixPattern {
    raw: String,
    matcher: GlobSet,
}

impl PrefixPattern {
    /// Compile a pattern.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let normalized = normalize(pattern);
        if normalized.is_empty() {
            return Err(PatternError::Empty {
                pattern: pattern.to_string(),
            });
        }

        let invalid = |message: String| PatternError::Invalid {
            pattern: pattern.to_string(),
            message,
        };

        let mut builder = GlobSetBuilder::new();
        for glob in [normalized.to_string(), format!("{}/**", normalized)] {
            let glob = GlobBuilder::new(&glob)
                .literal_separator(true)
                .build()
                .map_err(|e| invalid(e.to_string()))?;
            builder.add(glob);
        }
        let matcher = builder.build().map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            raw: pattern.to_string(),
            matcher,
        })
    }

    /// The pattern as written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check whether `path` (relative, `/`-separated) matches.
    pub fn matches(&self, path: &str) -> bool {
        self.matcher.is_match(normalize(path))
    }
}

impl fmt::Display for PrefixPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn normalize(path: &str) -> &str {
    let mut path = path.trim();
    while let Some(rest) = path.strip_prefix("./") {
        path = rest;
    }
    path.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(p: &str) -> PrefixPattern {
        PrefixPattern::new(p).unwrap()
    }

    mod literal_tests {
        use super::*;

        #[test]
        fn directory_prefix() {
            let p = pattern("pkg/a");
            assert!(p.matches("pkg/a"));
            assert!(p.matches("pkg/a/x.go"));
            assert!(p.matches("pkg/a/b/y.go"));
            assert!(!p.matches("pkg/ab/x.go"));
            assert!(!p.matches("pkg/b/x.go"));
            assert!(!p.matches("other/pkg/a/x.go"));
        }

        #[test]
        fn exact_file() {
            let p = pattern("github.com/foo/bar/gen.go");
            assert!(p.matches("github.com/foo/bar/gen.go"));
            assert!(!p.matches("github.com/foo/bar/gen.go.bak"));
        }

        #[test]
        fn normalization() {
            let p = pattern("./pkg/a/");
            assert!(p.matches("pkg/a/x.go"));
            assert!(p.matches("./pkg/a/x.go"));
            assert_eq!(p.as_str(), "./pkg/a/");
            assert_eq!(p.to_string(), "./pkg/a/");
        }
    }

    mod glob_tests {
        use super::*;

        #[test]
        fn star_stays_within_component() {
            let p = pattern("pkg/*/gen");
            assert!(p.matches("pkg/foo/gen/z.go"));
            assert!(!p.matches("pkg/foo/bar/gen/z.go"));
        }

        #[test]
        fn double_star_crosses_components() {
            let p = pattern("**/testdata");
            assert!(p.matches("github.com/foo/bar/testdata/x.go"));
            assert!(p.matches("testdata/x.go"));
            assert!(!p.matches("github.com/foo/testdatas/x.go"));
        }

        #[test]
        fn extension_glob() {
            let p = pattern("**/*_test.go");
            assert!(p.matches("a/b/c_test.go"));
            assert!(!p.matches("a/b/c.go"));
        }

        #[test]
        fn alternatives_and_classes() {
            let p = pattern("github.com/{foo,bar}/v[0-9]");
            assert!(p.matches("github.com/foo/v1/x.go"));
            assert!(p.matches("github.com/bar/v2/x.go"));
            assert!(!p.matches("github.com/baz/v1/x.go"));
            assert!(!p.matches("github.com/foo/vx/x.go"));
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn empty_rejected() {
            for raw in ["", "/", "./", "  "] {
                assert!(matches!(
                    PrefixPattern::new(raw),
                    Err(PatternError::Empty { .. })
                ));
            }
        }

        #[test]
        fn invalid_glob_rejected() {
            let err = PrefixPattern::new("pkg/[a").unwrap_err();
            assert!(matches!(err, PatternError::Invalid { .. }));
            assert!(err.to_string().starts_with("invalid pattern 'pkg/[a':"));
        }
    }
}
