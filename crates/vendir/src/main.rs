//! Binary entry point for the vendir CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Copy ./src/vendor into ./internal/third_party and rewrite its imports
//! vendir create ./src ./internal/third_party
//!
//! # Refresh vendor/ first and replace an existing target
//! vendir create --update --force ./src ./internal/third_party
//!
//! # Preview one file or one import path without touching anything
//! vendir rewrite-file ./src/vendor/github.com/foo/bar/bar.go ./internal/third_party
//! vendir rewrite-path github.com/foo/bar ./internal/third_party
//! ```

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use vendir::cli::{build_selector, run_create, run_rewrite_file, run_rewrite_path};
use vendir::output::{emit_response, render_report_text, CreateResponse, ErrorResponse};
use vendir_core::error::{OutputErrorCode, VendirError};
use vendir_core::source::RewriteOptions;
use vendir_core::toolchain::{GoToolchain, ToolchainConfig, DEFAULT_TIMEOUT};
use vendir_core::vendor::{PathOverrides, VendorOptions};

// ============================================================================
// CLI Structure
// ============================================================================

/// Private vendoring of Go dependencies.
///
/// Copies a module's vendor/ tree under a new import path and rewrites
/// every import in the copy, without changes to go.mod.
#[derive(Parser, Debug)]
#[command(
    name = "vendir",
    version,
    about = "Create private vendored copies of Go dependencies"
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,
    #[command(subcommand)]
    command: Command,
}

/// Global arguments shared by all subcommands.
#[derive(Parser, Debug)]
struct GlobalArgs {
    /// Log level for tracing output (RUST_LOG takes precedence).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Shorthand for `--log-level info`.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Path of the `go` executable (default: looked up on PATH).
    #[arg(long, global = true)]
    go: Option<PathBuf>,

    /// Seconds to wait for each `go` invocation.
    #[arg(long, global = true, default_value_t = DEFAULT_TIMEOUT.as_secs())]
    go_timeout: u64,
}

/// Module path and package prefix overrides.
#[derive(Args, Debug)]
struct PathArgs {
    /// Host module path (default: resolved with `go list -m`).
    #[arg(long)]
    module_path: Option<String>,

    /// Import path of the target directory (default: resolved with `go list -m`).
    #[arg(long)]
    package_prefix: Option<String>,
}

impl From<PathArgs> for PathOverrides {
    fn from(args: PathArgs) -> Self {
        PathOverrides {
            module_path: args.module_path,
            package_prefix: args.package_prefix,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a vendoring directory.
    ///
    /// <DIR> must contain a go.mod and a vendor directory.
    Create {
        /// Module directory holding go.mod and vendor/.
        dir: PathBuf,

        /// Directory to create the rewritten copy in.
        target_vendor_dir: PathBuf,

        /// Run `go mod tidy` and `go mod vendor` in <DIR> first.
        #[arg(long)]
        update: bool,

        /// Remove <TARGET_VENDOR_DIR> if it exists.
        #[arg(short, long)]
        force: bool,

        /// Leave `//go:generate` directives active.
        #[arg(long)]
        keep_generate: bool,

        /// Only rewrite files under these patterns (relative to the target).
        #[arg(long)]
        include: Vec<String>,

        /// Never rewrite files under these patterns (relative to the target).
        #[arg(long)]
        exclude: Vec<String>,

        #[command(flatten)]
        paths: PathArgs,
    },

    /// Print the rewritten content of a file. Modifies nothing.
    RewriteFile {
        file: PathBuf,

        target_vendor_dir: PathBuf,

        /// Leave `//go:generate` directives active.
        #[arg(long)]
        keep_generate: bool,

        #[command(flatten)]
        paths: PathArgs,
    },

    /// Print the rewritten form of an import path. Modifies nothing.
    RewritePath {
        path: String,

        target_vendor_dir: PathBuf,

        #[command(flatten)]
        paths: PathArgs,
    },
}

/// Log level for tracing output.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing_level(self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Output format for command results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable text (default).
    #[default]
    Text,
    /// JSON document.
    Json,
}

// ============================================================================
// Main
// ============================================================================

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.global.verbose {
        LogLevel::Info
    } else {
        cli.global.log_level
    };
    init_tracing(level);

    let format = cli.global.format;
    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let error_code = OutputErrorCode::from(&err);
            match format {
                OutputFormat::Json => {
                    let _ = emit_response(&ErrorResponse::from_error(&err), &mut io::stdout());
                    let _ = io::stdout().flush();
                }
                OutputFormat::Text => eprintln!("error: {}", err),
            }
            ExitCode::from(error_code.code())
        }
    }
}

/// Initialize tracing subscriber.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Execute the CLI command.
fn execute(cli: Cli) -> Result<(), VendirError> {
    let global = cli.global;
    let tools = GoToolchain::discover(&ToolchainConfig {
        go: global.go,
        timeout: Duration::from_secs(global.go_timeout),
    })?;

    match cli.command {
        Command::Create {
            dir,
            target_vendor_dir,
            update,
            force,
            keep_generate,
            include,
            exclude,
            paths,
        } => {
            let options = VendorOptions {
                force,
                update,
                paths: paths.into(),
                rewrite: RewriteOptions {
                    strip_generate: !keep_generate,
                },
                selector: build_selector(&include, &exclude)?,
            };
            let report = run_create(&tools, &dir, &target_vendor_dir, &options)?;
            match global.format {
                OutputFormat::Json => emit(&CreateResponse::new(report)),
                OutputFormat::Text => print_text(&render_report_text(&report)),
            }
        }
        Command::RewriteFile {
            file,
            target_vendor_dir,
            keep_generate,
            paths,
        } => {
            let options = RewriteOptions {
                strip_generate: !keep_generate,
            };
            let rewritten =
                run_rewrite_file(&tools, &file, &target_vendor_dir, &paths.into(), options)?;
            print_text(&rewritten.text)
        }
        Command::RewritePath {
            path,
            target_vendor_dir,
            paths,
        } => {
            let response = run_rewrite_path(&tools, &path, &target_vendor_dir, &paths.into())?;
            match global.format {
                OutputFormat::Json => emit(&response),
                OutputFormat::Text => print_text(&format!("{}\n", response.rewritten)),
            }
        }
    }
}

fn emit<T: serde::Serialize>(response: &T) -> Result<(), VendirError> {
    emit_response(response, &mut io::stdout()).map_err(|e| VendirError::internal(e.to_string()))
}

fn print_text(text: &str) -> Result<(), VendirError> {
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| VendirError::internal(e.to_string()))
}
