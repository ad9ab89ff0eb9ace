//! Vendoring workflow: copy a module's `vendor/` tree under a new import
//! path and rewrite every Go file in the copy.
//!
//! ## Phases
//!
//! 1. Validate the source directory (`go.mod` and `vendor/` present)
//! 2. Optionally refresh it with `go mod tidy` and `go mod vendor`
//! 3. Prepare the target directory (`force` clears an existing one)
//! 4. Resolve the module path and package prefix of the target
//! 5. Copy `vendor/` into the target and drop the host module's own subtree
//! 6. Rewrite the selected `.go` files in place
//!
//! Toolchain access goes through [`GoTools`], so the whole workflow can run
//! against a fake toolchain.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::classify::PathRewriter;
use crate::config::{ConfigError, RewriteConfig};
use crate::filter::FileSelector;
use crate::source::{RewriteError, RewriteOptions, SourceRewriter};
use crate::stdlib::StdlibCatalog;
use crate::toolchain::{GoTools, ToolchainError};

/// Errors from the vendoring workflow.
#[derive(Debug, Error)]
pub enum VendorError {
    /// The source directory has no `go.mod`.
    #[error("{} is not a module root: missing go.mod", .dir.display())]
    MissingGoMod { dir: PathBuf },

    /// The source directory has no `vendor/` directory.
    #[error("{} has no vendor directory, run 'go mod vendor' first", .dir.display())]
    MissingVendorDir { dir: PathBuf },

    /// The target exists and `force` was not requested.
    #[error("{} already exists, remove it before create", .path.display())]
    TargetExists { path: PathBuf },

    /// A filesystem operation failed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Directory traversal failed.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Rewrite(#[from] RewriteError),

    #[error(transparent)]
    Toolchain(#[from] ToolchainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for the vendoring workflow.
pub type VendorResult<T> = Result<T, VendorError>;

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> VendorError + '_ {
    move |source| VendorError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Explicit module path and package prefix. Whatever is left unset is
/// resolved through the toolchain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathOverrides {
    pub module_path: Option<String>,
    pub package_prefix: Option<String>,
}

/// Options for [`create_vendor`].
#[derive(Debug, Clone, Default)]
pub struct VendorOptions {
    /// Remove an existing target before creating it.
    pub force: bool,
    /// Run `go mod tidy` and `go mod vendor` in the source directory first.
    pub update: bool,
    pub paths: PathOverrides,
    pub rewrite: RewriteOptions,
    /// Which copied files are rewritten.
    pub selector: FileSelector,
}

/// Per-file counters from [`rewrite_tree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TreeStats {
    /// `.go` files found.
    pub files_visited: usize,
    /// `.go` files left alone by the selector.
    pub files_skipped: usize,
    /// Files whose content changed.
    pub files_rewritten: usize,
    pub imports_rewritten: usize,
    pub directives_disabled: usize,
}

/// Summary of a completed [`create_vendor`] run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VendorReport {
    pub module_path: String,
    pub package_prefix: String,
    pub target: PathBuf,
    #[serde(flatten)]
    pub stats: TreeStats,
}

/// Create a privately vendored copy of `dir`'s dependencies in `target`.
pub fn create_vendor<T: GoTools>(
    tools: &T,
    dir: &Path,
    target: &Path,
    options: &VendorOptions,
) -> VendorResult<VendorReport> {
    let vendor_dir = check_source_dir(dir)?;

    if options.update {
        info!(dir = %dir.display(), "refreshing module dependencies");
        tools.mod_tidy(dir)?;
        tools.mod_vendor(dir)?;
    }

    prepare_target(target, options.force)?;

    let rewriter = build_rewriter(tools, target, &options.paths, options.rewrite)?;
    let config = rewriter.paths().config();
    let module_path = config.module_path().to_string();
    let package_prefix = config.package_prefix().to_string();
    info!(module = %module_path, prefix = %package_prefix, "resolved import paths");

    let module_fs_path = module_path_to_fs_path(&module_path);
    if options.update {
        remove_tree(&vendor_dir.join(&module_fs_path))?;
    }

    let copied = copy_tree(&vendor_dir, target)?;
    info!(files = copied, target = %target.display(), "copied vendor tree");
    // packages provided by the host module itself
    remove_tree(&target.join(&module_fs_path))?;

    if !options.selector.is_unfiltered() {
        info!("rewriting selected files only");
    }
    let stats = rewrite_tree(target, &rewriter, &options.selector)?;
    info!(
        rewritten = stats.files_rewritten,
        skipped = stats.files_skipped,
        "rewrote vendored sources"
    );

    Ok(VendorReport {
        module_path,
        package_prefix,
        target: target.to_path_buf(),
        stats,
    })
}

/// Build a [`SourceRewriter`] for files that will live in `target`.
///
/// The standard library catalog is loaded from `tools`; the module path
/// and package prefix come from `overrides` or, when missing, from the
/// toolchain's view of `target`.
pub fn build_rewriter<T: GoTools>(
    tools: &T,
    target: &Path,
    overrides: &PathOverrides,
    options: RewriteOptions,
) -> VendorResult<SourceRewriter> {
    let (module_path, package_prefix) =
        match (&overrides.module_path, &overrides.package_prefix) {
            (Some(module), Some(prefix)) => (module.clone(), prefix.clone()),
            (module, prefix) => {
                let resolved = tools.resolve_module_package(target)?;
                (
                    module.clone().unwrap_or(resolved.module_path),
                    prefix.clone().unwrap_or(resolved.package_path),
                )
            }
        };
    let stdlib = StdlibCatalog::load(tools)?;
    let config = RewriteConfig::new(module_path, package_prefix, stdlib)?;
    Ok(SourceRewriter::new(PathRewriter::new(config), options))
}

/// Check that `dir` holds `go.mod` and `vendor/`; returns the vendor path.
pub fn check_source_dir(dir: &Path) -> VendorResult<PathBuf> {
    if !dir.join("go.mod").is_file() {
        return Err(VendorError::MissingGoMod {
            dir: dir.to_path_buf(),
        });
    }
    let vendor_dir = dir.join("vendor");
    if !vendor_dir.is_dir() {
        return Err(VendorError::MissingVendorDir {
            dir: dir.to_path_buf(),
        });
    }
    Ok(vendor_dir)
}

/// Create `target`, clearing it first when `force` is set.
pub fn prepare_target(target: &Path, force: bool) -> VendorResult<()> {
    if force {
        remove_tree(target)?;
    } else if fs::symlink_metadata(target).is_ok() {
        return Err(VendorError::TargetExists {
            path: target.to_path_buf(),
        });
    }
    fs::create_dir_all(target).map_err(io_error(target))
}

/// Recursively copy the contents of `from` into `to`.
///
/// File and directory permissions travel with the copy. Directory modes are
/// applied deepest first once everything is copied, so a read-only source
/// directory still receives its files. Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path) -> VendorResult<usize> {
    let mut copied = 0;
    let mut dir_modes = Vec::new();
    for entry in WalkDir::new(from).follow_links(true).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(from) else {
            continue;
        };
        let dest = to.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&dest).map_err(io_error(&dest))?;
            if entry.depth() > 0 {
                dir_modes.push((dest, entry.metadata()?.permissions()));
            }
        } else {
            fs::copy(entry.path(), &dest).map_err(io_error(&dest))?;
            copied += 1;
        }
    }
    for (dir, permissions) in dir_modes.into_iter().rev() {
        fs::set_permissions(&dir, permissions).map_err(io_error(&dir))?;
    }
    Ok(copied)
}

/// Remove a file or directory tree. A missing path is not an error.
pub fn remove_tree(path: &Path) -> VendorResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(io_error(path)(e)),
    };
    let removed = if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    debug!(path = %path.display(), "removed");
    removed.map_err(io_error(path))
}

/// Rewrite every selected `.go` file below `root` in place.
///
/// Selector paths are relative to `root`. Only changed files are written;
/// writing over the existing file keeps its permissions.
pub fn rewrite_tree(
    root: &Path,
    rewriter: &SourceRewriter,
    selector: &FileSelector,
) -> VendorResult<TreeStats> {
    let mut stats = TreeStats::default();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_go_file(entry.path()) {
            continue;
        }
        stats.files_visited += 1;

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !selector.matches_path(relative) {
            debug!(file = %relative.display(), "skipped by selector");
            stats.files_skipped += 1;
            continue;
        }

        let rewritten = rewriter.rewrite_file(path)?;
        if !rewritten.is_changed() {
            continue;
        }
        fs::write(path, rewritten.text.as_bytes()).map_err(io_error(path))?;
        stats.files_rewritten += 1;
        stats.imports_rewritten += rewritten.imports_rewritten;
        stats.directives_disabled += rewritten.directives_disabled;
    }
    Ok(stats)
}

/// Convert a `/`-separated module path into a relative filesystem path.
pub fn module_path_to_fs_path(module_path: &str) -> PathBuf {
    module_path.split('/').filter(|c| !c.is_empty()).collect()
}

fn is_go_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "go")
}
