//! Command implementations for the vendir CLI.
//!
//! Each `run_*` function validates its arguments, drives `vendir-core`, and
//! returns a value for `main.rs` to render. Toolchain access is generic over
//! [`GoTools`] so commands can be exercised without a Go installation.
//!
//! ## Error Handling
//!
//! All functions return `Result<T, VendirError>`; the error's
//! [`OutputErrorCode`](vendir_core::error::OutputErrorCode) becomes the
//! process exit code.

use std::path::Path;

use vendir_core::error::{VendirError, VendirResult};
use vendir_core::filter::FileSelector;
use vendir_core::source::{RewriteOptions, Rewritten};
use vendir_core::toolchain::GoTools;
use vendir_core::vendor::{build_rewriter, create_vendor, PathOverrides, VendorOptions, VendorReport};

use crate::output::PathResponse;

/// Compile `--include` / `--exclude` patterns.
pub fn build_selector(include: &[String], exclude: &[String]) -> VendirResult<FileSelector> {
    Ok(FileSelector::new(include, exclude)?)
}

/// `vendir create <dir> <target_vendor_dir>`
pub fn run_create<T: GoTools>(
    tools: &T,
    dir: &Path,
    target: &Path,
    options: &VendorOptions,
) -> VendirResult<VendorReport> {
    if !dir.is_dir() {
        return Err(VendirError::invalid_args(format!(
            "{} is not a directory",
            dir.display()
        )));
    }
    Ok(create_vendor(tools, dir, target, options)?)
}

/// `vendir rewrite-file <file> <target_vendor_dir>`
///
/// Returns the rewritten content without modifying anything.
pub fn run_rewrite_file<T: GoTools>(
    tools: &T,
    file: &Path,
    target: &Path,
    overrides: &PathOverrides,
    options: RewriteOptions,
) -> VendirResult<Rewritten> {
    match file.metadata() {
        Ok(metadata) if metadata.is_dir() => {
            return Err(VendirError::invalid_args(format!(
                "{} is not a file",
                file.display()
            )));
        }
        Ok(_) => {}
        Err(e) => return Err(VendirError::io(file, e)),
    }
    check_target(target, overrides)?;

    let rewriter = build_rewriter(tools, target, overrides, options)?;
    Ok(rewriter.rewrite_file(file)?)
}

/// `vendir rewrite-path <path> <target_vendor_dir>`
pub fn run_rewrite_path<T: GoTools>(
    tools: &T,
    path: &str,
    target: &Path,
    overrides: &PathOverrides,
) -> VendirResult<PathResponse> {
    check_target(target, overrides)?;

    let rewriter = build_rewriter(tools, target, overrides, RewriteOptions::default())?;
    let paths = rewriter.paths();
    let class = paths.classify(path);
    let rewritten = paths.rewrite_path(path);
    Ok(PathResponse::new(path, rewritten, class))
}

/// The toolchain resolves paths from inside the target, so it must exist
/// unless both paths were given explicitly.
fn check_target(target: &Path, overrides: &PathOverrides) -> VendirResult<()> {
    let resolves = overrides.module_path.is_none() || overrides.package_prefix.is_none();
    if resolves && !target.is_dir() {
        return Err(VendirError::invalid_args(format!(
            "{} is not a directory",
            target.display()
        )));
    }
    Ok(())
}
