//! Output types and rendering for the vendir CLI.
//!
//! Text output is meant for people; JSON output is a stable, versioned
//! document per command. Both are written to stdout. Diagnostics go to
//! stderr through `tracing`.

use std::io::{self, Write};

use serde::Serialize;
use vendir_core::classify::ImportClass;
use vendir_core::error::{OutputErrorCode, VendirError};
use vendir_core::vendor::VendorReport;

/// Version of the JSON documents.
pub const SCHEMA_VERSION: &str = "1";

/// Result of `vendir create`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateResponse {
    pub status: String,
    pub schema_version: String,
    #[serde(flatten)]
    pub report: VendorReport,
}

impl CreateResponse {
    pub fn new(report: VendorReport) -> Self {
        CreateResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            report,
        }
    }
}

/// Result of `vendir rewrite-path`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathResponse {
    pub status: String,
    pub schema_version: String,
    /// The import path as given.
    pub path: String,
    /// The import path after rewriting.
    pub rewritten: String,
    pub class: ImportClass,
}

impl PathResponse {
    pub fn new(path: impl Into<String>, rewritten: impl Into<String>, class: ImportClass) -> Self {
        PathResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            path: path.into(),
            rewritten: rewritten.into(),
            class,
        }
    }
}

/// Error details in a JSON error document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorInfo {
    /// Exit code of the process.
    pub code: u8,
    pub message: String,
}

impl ErrorInfo {
    pub fn from_error(err: &VendirError) -> Self {
        ErrorInfo {
            code: OutputErrorCode::from(err).code(),
            message: err.to_string(),
        }
    }
}

/// JSON document emitted when a command fails.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub schema_version: String,
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &VendirError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{}", json)
}

/// Human-readable summary of a vendoring run.
pub fn render_report_text(report: &VendorReport) -> String {
    let stats = &report.stats;
    let mut out = String::new();
    out.push_str(&format!("module:   {}\n", report.module_path));
    out.push_str(&format!("prefix:   {}\n", report.package_prefix));
    out.push_str(&format!("target:   {}\n", report.target.display()));
    out.push_str(&format!(
        "files:    {} rewritten, {} unchanged, {} skipped\n",
        stats.files_rewritten,
        stats.files_visited - stats.files_skipped - stats.files_rewritten,
        stats.files_skipped
    ));
    out.push_str(&format!("imports:  {} rewritten\n", stats.imports_rewritten));
    if stats.directives_disabled > 0 {
        out.push_str(&format!(
            "generate: {} directives disabled\n",
            stats.directives_disabled
        ));
    }
    out
}
