//! Unified error type and exit codes for vendir.
//!
//! Every subsystem has its own error enum; [`VendirError`] bridges them into
//! one type the CLI can render and map to a process exit code.
//!
//! ## Error Code Mapping
//!
//! - `2`: Invalid arguments or configuration
//! - `3`: Source errors (a Go file could not be parsed or decoded)
//! - `4`: Filesystem errors
//! - `5`: Toolchain errors (`go` missing, failing or timing out)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::pattern::PatternError;
use crate::source::RewriteError;
use crate::toolchain::ToolchainError;
use crate::vendor::VendorError;

// ============================================================================
// Output Error Codes
// ============================================================================

/// Stable exit codes, one per error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OutputErrorCode {
    /// Bad command line input or configuration.
    InvalidArguments = 2,
    /// A Go source file could not be processed.
    SourceError = 3,
    /// Reading, writing, copying or removing files failed.
    FilesystemError = 4,
    /// The Go toolchain could not answer.
    ToolchainError = 5,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl OutputErrorCode {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for OutputErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for the CLI.
#[derive(Debug, Error)]
pub enum VendirError {
    /// Invalid arguments from the caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments { message: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    /// Workflow errors with no more specific variant.
    #[error(transparent)]
    Vendor(VendorError),

    /// A filesystem operation outside the library workflows failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

/// Result type for vendir operations.
pub type VendirResult<T> = Result<T, VendirError>;

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&VendirError> for OutputErrorCode {
    fn from(err: &VendirError) -> Self {
        match err {
            VendirError::InvalidArguments { .. } => OutputErrorCode::InvalidArguments,
            VendirError::Config(_) => OutputErrorCode::InvalidArguments,
            VendirError::Pattern(_) => OutputErrorCode::InvalidArguments,
            VendirError::Rewrite(err) => rewrite_code(err),
            VendirError::Toolchain(_) => OutputErrorCode::ToolchainError,
            VendirError::Vendor(err) => vendor_code(err),
            VendirError::Io { .. } => OutputErrorCode::FilesystemError,
            VendirError::InternalError { .. } => OutputErrorCode::InternalError,
        }
    }
}

impl From<VendirError> for OutputErrorCode {
    fn from(err: VendirError) -> Self {
        OutputErrorCode::from(&err)
    }
}

fn rewrite_code(err: &RewriteError) -> OutputErrorCode {
    match err {
        RewriteError::Parse(_) | RewriteError::Unquote(_) => OutputErrorCode::SourceError,
        RewriteError::Io { .. } => OutputErrorCode::FilesystemError,
        RewriteError::Edit(_) => OutputErrorCode::InternalError,
        RewriteError::File { source, .. } => rewrite_code(source),
    }
}

fn vendor_code(err: &VendorError) -> OutputErrorCode {
    match err {
        VendorError::MissingGoMod { .. }
        | VendorError::MissingVendorDir { .. }
        | VendorError::TargetExists { .. }
        | VendorError::Config(_) => OutputErrorCode::InvalidArguments,
        VendorError::Io { .. } | VendorError::Walk(_) => OutputErrorCode::FilesystemError,
        VendorError::Rewrite(err) => rewrite_code(err),
        VendorError::Toolchain(_) => OutputErrorCode::ToolchainError,
    }
}

// ============================================================================
// Bridge: VendorError -> VendirError
// ============================================================================

impl From<VendorError> for VendirError {
    fn from(err: VendorError) -> Self {
        match err {
            VendorError::Rewrite(err) => VendirError::Rewrite(err),
            VendorError::Toolchain(err) => VendirError::Toolchain(err),
            VendorError::Config(err) => VendirError::Config(err),
            other => VendirError::Vendor(other),
        }
    }
}

// ============================================================================
// Convenience Constructors
// ============================================================================

impl VendirError {
    /// Create an invalid arguments error.
    pub fn invalid_args(message: impl Into<String>) -> Self {
        VendirError::InvalidArguments {
            message: message.into(),
        }
    }

    /// Create a filesystem error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        VendirError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        VendirError::InternalError {
            message: message.into(),
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> OutputErrorCode {
        OutputErrorCode::from(self)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::EditError;
    use crate::scan::ScanError;
    use crate::text::Span;

    fn parse_error() -> RewriteError {
        RewriteError::Parse(ScanError {
            line: 1,
            col: 1,
            message: "expected 'package', found 'import'".to_string(),
        })
    }

    mod error_code_mapping {
        use super::*;

        #[test]
        fn invalid_arguments_maps_to_invalid_arguments() {
            let err = VendirError::invalid_args("missing target");
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(err.error_code().code(), 2);
        }

        #[test]
        fn config_and_pattern_map_to_invalid_arguments() {
            let err = VendirError::from(ConfigError::MissingModulePath);
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            let err = VendirError::from(PatternError::Empty {
                pattern: String::new(),
            });
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn parse_error_maps_to_source_error() {
            let err = VendirError::from(parse_error());
            assert_eq!(err.error_code(), OutputErrorCode::SourceError);
            assert_eq!(err.error_code().code(), 3);
        }

        #[test]
        fn file_wrapper_keeps_inner_code() {
            let err = VendirError::from(RewriteError::File {
                path: PathBuf::from("a.go"),
                source: Box::new(parse_error()),
            });
            assert_eq!(err.error_code(), OutputErrorCode::SourceError);

            let err = VendirError::from(RewriteError::Io {
                path: PathBuf::from("a.go"),
                source: io::Error::new(io::ErrorKind::NotFound, "gone"),
            });
            assert_eq!(err.error_code(), OutputErrorCode::FilesystemError);
        }

        #[test]
        fn edit_error_maps_to_internal_error() {
            let err = VendirError::from(RewriteError::Edit(EditError::SpanOutOfBounds {
                span: Span::new(0, 9),
                source_len: 3,
            }));
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
        }

        #[test]
        fn toolchain_maps_to_toolchain_error() {
            let err = VendirError::from(ToolchainError::EmptyOutput {
                command: "go env GOROOT".to_string(),
            });
            assert_eq!(err.error_code(), OutputErrorCode::ToolchainError);
            assert_eq!(err.error_code().code(), 5);
        }

        #[test]
        fn internal_error_maps_to_internal_error() {
            let err = VendirError::internal("unexpected state");
            assert_eq!(err.error_code(), OutputErrorCode::InternalError);
            assert_eq!(err.error_code().code(), 10);
        }
    }

    mod vendor_bridge {
        use super::*;

        #[test]
        fn nested_errors_are_flattened() {
            let err = VendirError::from(VendorError::Toolchain(ToolchainError::NotFound {
                message: "cannot find binary path".to_string(),
            }));
            assert!(matches!(err, VendirError::Toolchain(_)));

            let err = VendirError::from(VendorError::Rewrite(parse_error()));
            assert!(matches!(err, VendirError::Rewrite(_)));
        }

        #[test]
        fn workflow_errors_keep_category() {
            let err = VendirError::from(VendorError::TargetExists {
                path: PathBuf::from("third_party"),
            });
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert_eq!(
                err.to_string(),
                "third_party already exists, remove it before create"
            );

            let err = VendirError::from(VendorError::Io {
                path: PathBuf::from("third_party/x.go"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            });
            assert_eq!(err.error_code(), OutputErrorCode::FilesystemError);
        }
    }

    mod error_display {
        use super::*;

        #[test]
        fn invalid_arguments_display() {
            let err = VendirError::invalid_args("missing field");
            assert_eq!(err.to_string(), "invalid arguments: missing field");
        }

        #[test]
        fn transparent_display() {
            let err = VendirError::from(ConfigError::MissingPackagePrefix);
            assert_eq!(err.to_string(), "requires package prefix");
        }

        #[test]
        fn io_display() {
            let err = VendirError::io(
                "vendor/a.go",
                io::Error::new(io::ErrorKind::NotFound, "not found"),
            );
            assert_eq!(err.to_string(), "vendor/a.go: not found");
        }
    }

    mod output_error_code {
        use super::*;

        #[test]
        fn code_values() {
            assert_eq!(OutputErrorCode::InvalidArguments.code(), 2);
            assert_eq!(OutputErrorCode::SourceError.code(), 3);
            assert_eq!(OutputErrorCode::FilesystemError.code(), 4);
            assert_eq!(OutputErrorCode::ToolchainError.code(), 5);
            assert_eq!(OutputErrorCode::InternalError.code(), 10);
        }

        #[test]
        fn display_shows_code() {
            assert_eq!(format!("{}", OutputErrorCode::InvalidArguments), "2");
            assert_eq!(format!("{}", OutputErrorCode::InternalError), "10");
        }
    }
}
