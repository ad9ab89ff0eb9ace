//! Source editor: rewrite the import paths of one Go file.
//!
//! [`SourceRewriter`] scans a file's import header, runs every import path
//! through the [`PathRewriter`], and replaces only the literals whose value
//! changed. `//go:generate` directives are disabled by replacing their
//! prefix with [`DISABLED_DIRECTIVE`], which keeps them visible in the
//! vendored copy without letting `go generate` run them against it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::classify::PathRewriter;
use crate::edit::{EditError, SpanEditor};
use crate::literal::{quote, unquote, UnquoteError};
use crate::scan::{scan, ScanError};

/// Replacement for the `//go:generate` prefix of a disabled directive.
pub const DISABLED_DIRECTIVE: &str = "//vendir:removed go:generate";

/// Errors from rewriting a source file. A file either rewrites completely
/// or fails as a whole.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// The import header could not be parsed.
    #[error("parse error at {0}")]
    Parse(#[from] ScanError),

    /// An import path literal could not be decoded.
    #[error(transparent)]
    Unquote(#[from] UnquoteError),

    /// Recorded replacements were inconsistent (a bug, not bad input).
    #[error("internal edit error: {0}")]
    Edit(#[from] EditError),

    /// The file could not be read.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A content error attributed to the file it came from.
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<RewriteError>,
    },
}

impl RewriteError {
    /// The file this error is attributed to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            RewriteError::Io { path, .. } | RewriteError::File { path, .. } => Some(path),
            _ => None,
        }
    }

    fn in_file(self, path: &Path) -> Self {
        RewriteError::File {
            path: path.to_path_buf(),
            source: Box::new(self),
        }
    }
}

/// Result type for source rewriting.
pub type RewriteResult<T> = Result<T, RewriteError>;

/// Options for [`SourceRewriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    /// Disable `//go:generate` directives.
    /// Default: true
    pub strip_generate: bool,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            strip_generate: true,
        }
    }
}

/// Output of rewriting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewritten {
    /// The full new file content.
    pub text: String,
    /// Number of import literals replaced.
    pub imports_rewritten: usize,
    /// Number of `//go:generate` directives disabled.
    pub directives_disabled: usize,
}

impl Rewritten {
    /// Whether the text differs from the input.
    pub fn is_changed(&self) -> bool {
        self.imports_rewritten > 0 || self.directives_disabled > 0
    }
}

/// Rewrites import paths in Go source text.
#[derive(Debug, Clone)]
pub struct SourceRewriter {
    paths: PathRewriter,
    options: RewriteOptions,
}

impl SourceRewriter {
    pub fn new(paths: PathRewriter, options: RewriteOptions) -> Self {
        Self { paths, options }
    }

    /// The path rewriter used for each import.
    pub fn paths(&self) -> &PathRewriter {
        &self.paths
    }

    pub fn options(&self) -> RewriteOptions {
        self.options
    }

    /// Rewrite one file's source text.
    pub fn rewrite_source(&self, source: &str) -> RewriteResult<Rewritten> {
        let scanned = scan(source, self.options.strip_generate)?;

        let mut editor = SpanEditor::new(source);
        let mut imports_rewritten = 0;
        for import in &scanned.imports {
            let path = unquote(&import.literal)?;
            let rewritten = self.paths.rewrite_path(&path);
            if rewritten != path {
                editor.replace(import.span, quote(&rewritten));
                imports_rewritten += 1;
            }
        }

        for directive in &scanned.directives {
            editor.replace(directive.span, DISABLED_DIRECTIVE);
        }

        Ok(Rewritten {
            text: editor.apply()?,
            imports_rewritten,
            directives_disabled: scanned.directives.len(),
        })
    }

    /// Read a file and rewrite its content.
    ///
    /// Errors carry the file's path.
    pub fn rewrite_file(&self, path: &Path) -> RewriteResult<Rewritten> {
        let source = fs::read_to_string(path).map_err(|source| RewriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let rewritten = self
            .rewrite_source(&source)
            .map_err(|e| e.in_file(path))?;
        debug!(
            file = %path.display(),
            imports = rewritten.imports_rewritten,
            directives = rewritten.directives_disabled,
            "rewrote file"
        );
        Ok(rewritten)
    }
}
