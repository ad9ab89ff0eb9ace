//! Standard library catalog.
//!
//! The set of import paths the Go toolchain ships with. It is obtained once,
//! from a [`StdlibSource`], and then injected into [`RewriteConfig`] as an
//! immutable value.
//!
//! [`RewriteConfig`]: crate::config::RewriteConfig

use std::collections::BTreeSet;

use crate::toolchain::ToolchainError;

/// Something that can enumerate the standard library's import paths.
///
/// The production implementation is [`GoToolchain`](crate::toolchain::GoToolchain);
/// tests use fixed lists.
pub trait StdlibSource {
    /// List every standard library import path.
    fn list_std_packages(&self) -> Result<Vec<String>, ToolchainError>;
}

/// Immutable set of standard library import paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StdlibCatalog {
    paths: BTreeSet<String>,
}

impl StdlibCatalog {
    /// Load the catalog from a source, calling it exactly once.
    ///
    /// Surrounding whitespace and blank entries are dropped.
    pub fn load(source: &dyn StdlibSource) -> Result<Self, ToolchainError> {
        let listed = source.list_std_packages()?;
        let catalog = Self::from_paths(listed);
        if catalog.is_empty() {
            tracing::warn!("standard library catalog is empty, stdlib imports will be rewritten");
        } else {
            tracing::debug!(packages = catalog.len(), "loaded standard library catalog");
        }
        Ok(catalog)
    }

    /// Build a catalog from an explicit list of import paths.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let paths = paths
            .into_iter()
            .filter_map(|p| {
                let trimmed = p.as_ref().trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            })
            .collect();
        StdlibCatalog { paths }
    }

    /// Check whether `path` is a standard library import path.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    /// Number of import paths in the catalog.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Returns true if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
