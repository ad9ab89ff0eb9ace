//! Go toolchain adapter.
//!
//! Everything vendir needs from the surrounding Go installation goes through
//! [`GoToolchain`]: the standard library listing, the module and package
//! paths of a destination directory, and the optional `go mod tidy` /
//! `go mod vendor` refresh. Each invocation is bounded by a timeout; a child
//! that exceeds it is killed and reaped.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};
use wait_timeout::ChildExt;

use crate::stdlib::StdlibSource;

/// Default bound on a single toolchain invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Errors from invoking the Go toolchain.
#[derive(Debug, Error)]
pub enum ToolchainError {
    /// No `go` executable could be located.
    #[error("go toolchain not found: {message}")]
    NotFound { message: String },

    /// The process could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// The process exited unsuccessfully.
    #[error("'{command}' failed (exit code {}): {stderr}", describe_exit(.exit_code))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The process did not finish in time and was killed.
    #[error("'{command}' timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    /// The process succeeded but printed nothing useful.
    #[error("'{command}' produced no output")]
    EmptyOutput { command: String },

    /// The toolchain reported a location vendir cannot use.
    #[error("unexpected output from '{command}': {message}")]
    UnexpectedOutput { command: String, message: String },
}

/// Result type for toolchain operations.
pub type ToolchainResult<T> = Result<T, ToolchainError>;

/// How to find and run the Go toolchain.
#[derive(Debug, Clone)]
pub struct ToolchainConfig {
    /// Explicit `go` executable. When `None`, `go` is looked up on `PATH`.
    pub go: Option<PathBuf>,
    /// Upper bound on each invocation.
    pub timeout: Duration,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            go: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Module path and package prefix of a destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePackage {
    /// Import path of the module that contains the directory.
    pub module_path: String,
    /// Import path of the directory itself.
    pub package_path: String,
}

/// Handle to a located `go` executable.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    go: PathBuf,
    timeout: Duration,
}

impl GoToolchain {
    /// Locate the toolchain according to `config`.
    pub fn discover(config: &ToolchainConfig) -> ToolchainResult<Self> {
        let go = match &config.go {
            Some(path) => path.clone(),
            None => which::which("go").map_err(|e| ToolchainError::NotFound {
                message: e.to_string(),
            })?,
        };
        debug!(go = %go.display(), "using go toolchain");
        Ok(Self {
            go,
            timeout: config.timeout,
        })
    }

    /// Path of the `go` executable in use.
    pub fn go(&self) -> &Path {
        &self.go
    }

    /// Run `go <args>` in `dir` and return its stdout.
    pub fn run(&self, dir: &Path, args: &[&str]) -> ToolchainResult<String> {
        let command = format!("go {}", args.join(" "));
        debug!(%command, dir = %dir.display(), "running toolchain command");

        let mut child = Command::new(&self.go)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ToolchainError::Spawn {
                command: command.clone(),
                source,
            })?;

        // Drain both pipes concurrently so a chatty child cannot block on a
        // full pipe while we wait for it.
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let stdout_reader = thread::spawn(move || read_pipe(stdout));
        let stderr_reader = thread::spawn(move || read_pipe(stderr));

        let waited = child
            .wait_timeout(self.timeout)
            .map_err(|source| ToolchainError::Spawn {
                command: command.clone(),
                source,
            })?;

        let Some(status) = waited else {
            let _ = child.kill();
            let _ = child.wait();
            warn!(%command, timeout = ?self.timeout, "toolchain command timed out");
            return Err(ToolchainError::TimedOut {
                command,
                timeout: self.timeout,
            });
        };

        let stdout = stdout_reader.join().unwrap_or_default();
        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(ToolchainError::Failed {
                command,
                exit_code: status.code(),
                stderr: String::from_utf8_lossy(&stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    /// Run a command expected to print one non-empty line.
    fn run_line(&self, dir: &Path, args: &[&str]) -> ToolchainResult<String> {
        let output = self.run(dir, args)?;
        let line = output.trim();
        if line.is_empty() {
            return Err(ToolchainError::EmptyOutput {
                command: format!("go {}", args.join(" ")),
            });
        }
        Ok(line.to_string())
    }

    /// The toolchain's installation root (`go env GOROOT`).
    pub fn goroot(&self) -> ToolchainResult<PathBuf> {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        self.run_line(&cwd, &["env", "GOROOT"]).map(PathBuf::from)
    }

    /// Resolve the module path and package path of `dir`.
    ///
    /// Both come from `go list -m`, which prints each module's path and root
    /// directory. In workspace mode every module of the `go.work` is listed;
    /// the one whose root is the deepest ancestor of `dir` wins. The package
    /// path is that module's path joined with `dir`'s location relative to
    /// its root.
    pub fn resolve_module_package(&self, dir: &Path) -> ToolchainResult<ModulePackage> {
        let args = ["list", "-m", "-f", "{{.Path}}\n{{.Dir}}"];
        let output = self.run(dir, &args)?;
        let command = format!("go {}", args.join(" "));

        let lines: Vec<&str> = output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() < 2 {
            return Err(ToolchainError::EmptyOutput { command });
        }

        let unexpected = |message: String| ToolchainError::UnexpectedOutput {
            command: command.clone(),
            message,
        };
        let dir = canonical(dir).map_err(|e| unexpected(e.to_string()))?;

        let mut best: Option<(&str, PathBuf)> = None;
        for module in lines.chunks_exact(2) {
            let root = match canonical(Path::new(module[1])) {
                Ok(root) => root,
                Err(e) => {
                    debug!(module = module[0], error = %e, "skipping unreadable module root");
                    continue;
                }
            };
            if !dir.starts_with(&root) {
                continue;
            }
            let deeper = match &best {
                Some((_, current)) => root.components().count() > current.components().count(),
                None => true,
            };
            if deeper {
                best = Some((module[0], root));
            }
        }
        let Some((module_path, module_dir)) = best else {
            return Err(unexpected(format!(
                "{} is not inside any listed module root",
                dir.display()
            )));
        };
        let relative = dir
            .strip_prefix(&module_dir)
            .map_err(|e| unexpected(e.to_string()))?;

        let mut package_path = module_path.to_string();
        for component in relative.components() {
            package_path.push('/');
            package_path.push_str(&component.as_os_str().to_string_lossy());
        }

        Ok(ModulePackage {
            module_path: module_path.to_string(),
            package_path,
        })
    }

    /// Run `go mod tidy` in `dir`.
    pub fn mod_tidy(&self, dir: &Path) -> ToolchainResult<()> {
        self.run(dir, &["mod", "tidy"]).map(|_| ())
    }

    /// Run `go mod vendor` in `dir`.
    pub fn mod_vendor(&self, dir: &Path) -> ToolchainResult<()> {
        self.run(dir, &["mod", "vendor"]).map(|_| ())
    }
}

/// Toolchain operations used by the vendoring workflow.
pub trait GoTools: StdlibSource {
    /// Module path and package path of `dir`.
    fn resolve_module_package(&self, dir: &Path) -> ToolchainResult<ModulePackage>;

    /// Refresh `go.mod`/`go.sum` in `dir`.
    fn mod_tidy(&self, dir: &Path) -> ToolchainResult<()>;

    /// Refresh the `vendor/` directory in `dir`.
    fn mod_vendor(&self, dir: &Path) -> ToolchainResult<()>;
}

impl GoTools for GoToolchain {
    fn resolve_module_package(&self, dir: &Path) -> ToolchainResult<ModulePackage> {
        GoToolchain::resolve_module_package(self, dir)
    }

    fn mod_tidy(&self, dir: &Path) -> ToolchainResult<()> {
        GoToolchain::mod_tidy(self, dir)
    }

    fn mod_vendor(&self, dir: &Path) -> ToolchainResult<()> {
        GoToolchain::mod_vendor(self, dir)
    }
}

impl StdlibSource for GoToolchain {
    /// Lists `./...` from `$GOROOT/src`.
    fn list_std_packages(&self) -> ToolchainResult<Vec<String>> {
        let goroot = self.goroot()?;
        let output = self.run(&goroot.join("src"), &["list", "./..."])?;
        let packages: Vec<String> = output
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if packages.is_empty() {
            return Err(ToolchainError::EmptyOutput {
                command: "go list ./...".to_string(),
            });
        }
        Ok(packages)
    }
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

fn read_pipe<R: Read>(pipe: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut pipe) = pipe {
        let _ = pipe.read_to_end(&mut buf);
    }
    buf
}

fn canonical(path: &Path) -> io::Result<PathBuf> {
    std::fs::canonicalize(path)
}
