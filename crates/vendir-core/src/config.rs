//! Engine configuration.

use thiserror::Error;

use crate::stdlib::StdlibCatalog;

/// Configuration errors. Fatal at construction; there is no partially
/// initialized engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The host module path is empty.
    #[error("requires module path")]
    MissingModulePath,

    /// The target package prefix is empty.
    #[error("requires package prefix")]
    MissingPackagePrefix,
}

/// Immutable inputs of the path rewriter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteConfig {
    module_path: String,
    package_prefix: String,
    stdlib: StdlibCatalog,
}

impl RewriteConfig {
    /// Create a configuration.
    ///
    /// `module_path` is the import path of the module that owns the vendored
    /// tree; `package_prefix` is the import path the tree will live under.
    /// Trailing slashes are removed from both.
    pub fn new(
        module_path: impl Into<String>,
        package_prefix: impl Into<String>,
        stdlib: StdlibCatalog,
    ) -> Result<Self, ConfigError> {
        let module_path = normalize(module_path.into());
        if module_path.is_empty() {
            return Err(ConfigError::MissingModulePath);
        }
        let package_prefix = normalize(package_prefix.into());
        if package_prefix.is_empty() {
            return Err(ConfigError::MissingPackagePrefix);
        }
        Ok(Self {
            module_path,
            package_prefix,
            stdlib,
        })
    }

    pub fn module_path(&self) -> &str {
        &self.module_path
    }

    pub fn package_prefix(&self) -> &str {
        &self.package_prefix
    }

    pub fn stdlib(&self) -> &StdlibCatalog {
        &self.stdlib
    }
}

fn normalize(path: String) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.len() == path.len() {
        path
    } else {
        trimmed.to_string()
    }
}
