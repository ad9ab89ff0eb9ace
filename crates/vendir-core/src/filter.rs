//! File selector: which vendored files take part in rewriting.
//!
//! ## Semantics
//!
//! 1. No patterns at all: every file matches
//! 2. Inclusions given: a file must match at least one of them
//! 3. Exclusions given: a file matching any of them is dropped, even if an
//!    inclusion matched
//!
//! Patterns use [`PrefixPattern`] syntax. Paths are relative to the vendor
//! root and always name files; skipping whole directories early is left to
//! the caller's traversal.

use std::path::{Component, Path};

use crate::pattern::{PatternError, PrefixPattern};

/// Include/exclude filter over relative file paths.
#[derive(Debug, Clone, Default)]
pub struct FileSelector {
    include: Vec<PrefixPattern>,
    exclude: Vec<PrefixPattern>,
}

impl FileSelector {
    /// Compile a selector from raw pattern lists.
    pub fn new<S: AsRef<str>>(include: &[S], exclude: &[S]) -> Result<Self, PatternError> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// A selector that matches every file.
    pub fn all() -> Self {
        Self::default()
    }

    /// Check if a relative, `/`-separated file path is selected.
    pub fn matches(&self, relative_path: &str) -> bool {
        if !self.include.is_empty() && !self.include.iter().any(|p| p.matches(relative_path)) {
            return false;
        }
        !self.exclude.iter().any(|p| p.matches(relative_path))
    }

    /// Check a relative filesystem path, joining its components with `/`.
    ///
    /// Paths that are not plain relative paths never match.
    pub fn matches_path(&self, relative_path: &Path) -> bool {
        let mut parts = Vec::new();
        for component in relative_path.components() {
            match component {
                Component::Normal(part) => parts.push(part.to_string_lossy()),
                Component::CurDir => {}
                _ => return false,
            }
        }
        self.matches(&parts.join("/"))
    }

    /// Returns true if no patterns are configured.
    pub fn is_unfiltered(&self) -> bool {
        self.include.is_empty() && self.exclude.is_empty()
    }
}

fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<PrefixPattern>, PatternError> {
    patterns
        .iter()
        .map(|p| PrefixPattern::new(p.as_ref()))
        .collect()
}
