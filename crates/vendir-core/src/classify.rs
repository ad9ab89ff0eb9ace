//! Import path classification and rewriting.
//!
//! [`PathRewriter`] decides, for one import path, whether it must be
//! redirected into the vendored tree. Rules are tried in order and the first
//! match wins:
//!
//! | # | Class             | Condition                                        | Result           |
//! |---|-------------------|--------------------------------------------------|------------------|
//! | 1 | `Empty`           | empty path                                       | unchanged        |
//! | 2 | `Cgo`             | exactly `C`                                      | unchanged        |
//! | 3 | `Relative`        | `/…`, `.`, `./…`, `..`, `../…`                   | unchanged        |
//! | 4 | `Stdlib`          | in the standard library catalog                  | unchanged        |
//! | 5 | `HostModule`      | module path, or below it                         | unchanged        |
//! | 6 | `AlreadyVendored` | package prefix, or below it                      | unchanged        |
//! | 7 | `ThirdParty`      | anything else                                    | `prefix/` + path |
//!
//! Rule 6 makes rewriting idempotent when the package prefix lies outside
//! the host module's namespace; inside it, rule 5 already covers such paths.

use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use crate::config::RewriteConfig;

/// Classification of one import path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportClass {
    Empty,
    Cgo,
    Relative,
    Stdlib,
    HostModule,
    AlreadyVendored,
    ThirdParty,
}

impl ImportClass {
    /// Whether paths of this class get the package prefix.
    pub fn is_rewritten(self) -> bool {
        self == ImportClass::ThirdParty
    }
}

impl fmt::Display for ImportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImportClass::Empty => "empty",
            ImportClass::Cgo => "cgo",
            ImportClass::Relative => "relative",
            ImportClass::Stdlib => "stdlib",
            ImportClass::HostModule => "host_module",
            ImportClass::AlreadyVendored => "already_vendored",
            ImportClass::ThirdParty => "third_party",
        };
        f.write_str(name)
    }
}

/// Pure import path rewriter over an immutable [`RewriteConfig`].
#[derive(Debug, Clone)]
pub struct PathRewriter {
    config: RewriteConfig,
}

impl PathRewriter {
    pub fn new(config: RewriteConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RewriteConfig {
        &self.config
    }

    /// Classify an import path.
    pub fn classify(&self, path: &str) -> ImportClass {
        if path.is_empty() {
            return ImportClass::Empty;
        }
        if path == "C" {
            return ImportClass::Cgo;
        }
        if !is_replaceable(path) {
            return ImportClass::Relative;
        }
        if self.config.stdlib().contains(path) {
            return ImportClass::Stdlib;
        }
        if has_path_prefix(path, self.config.module_path()) {
            return ImportClass::HostModule;
        }
        if has_path_prefix(path, self.config.package_prefix()) {
            return ImportClass::AlreadyVendored;
        }
        ImportClass::ThirdParty
    }

    /// Rewrite an import path, borrowing the input when it is unchanged.
    pub fn rewrite_path<'a>(&self, path: &'a str) -> Cow<'a, str> {
        if self.classify(path).is_rewritten() {
            Cow::Owned(format!("{}/{}", self.config.package_prefix(), path))
        } else {
            Cow::Borrowed(path)
        }
    }
}

/// Whether `path` is an absolute or relative import that must never be
/// prefixed. Expects a non-empty path.
fn is_replaceable(path: &str) -> bool {
    !(path.starts_with('/')
        || path == "."
        || path.starts_with("./")
        || path == ".."
        || path.starts_with("../"))
}

/// Whether `path` equals `prefix` or lies below it on a `/` boundary.
fn has_path_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
