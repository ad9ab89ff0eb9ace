//! CLI end-to-end tests.
//!
//! These tests spawn the actual `vendir` binary and validate stdout, stderr
//! and exit codes.
//!
//! Exit code expectations:
//! - 0: Success
//! - 2: Invalid arguments (bad flags, missing directories, existing target)
//! - 3: Source error (unparseable Go file)
//! - 5: Toolchain error (`go` missing or failing)

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;

/// Run vendir with given arguments and return (stdout, stderr, exit_code).
fn run_vendir(args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_vendir"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to execute vendir");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let exit_code = output.status.code().unwrap_or(-1);

    (stdout, stderr, exit_code)
}

fn s(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

/// Executing a freshly written script while another test thread is still
/// writing one can fail with ETXTBSY; scripted tests run one at a time.
#[cfg(unix)]
static SERIAL: Mutex<()> = Mutex::new(());

#[cfg(unix)]
fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write a fake `go` that knows a small standard library and resolves every
/// directory to `example.com/app` rooted at `module_dir`.
#[cfg(unix)]
fn fake_go(dir: &Path, module_dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir.join("goroot/src")).unwrap();
    let script = format!(
        r#"#!/bin/sh
case "$1 $2" in
  "env GOROOT") echo '{goroot}' ;;
  "list ./...") printf 'fmt\nos\nstrings\n' ;;
  "list -m") printf '%s\n%s\n' example.com/app '{module}' ;;
  *) echo "go: unknown command $*" >&2; exit 1 ;;
esac
"#,
        goroot = dir.join("goroot").display(),
        module = module_dir.display(),
    );
    let path = dir.join("go");
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

// ============================================================================
// Argument Handling
// ============================================================================

#[test]
fn help_lists_commands() {
    let (stdout, _stderr, exit_code) = run_vendir(&["--help"]);
    assert_eq!(exit_code, 0);
    for command in ["create", "rewrite-file", "rewrite-path"] {
        assert!(stdout.contains(command), "help should mention {command}");
    }
}

#[test]
fn missing_command_returns_exit_2() {
    let (_stdout, _stderr, exit_code) = run_vendir(&[]);
    assert_eq!(exit_code, 2);
}

#[test]
fn create_missing_dir_returns_exit_2() {
    let (_stdout, stderr, exit_code) = run_vendir(&[
        "--go",
        "/nonexistent/vendir/go",
        "create",
        "/nonexistent/vendir/src",
        "/nonexistent/vendir/out",
    ]);
    assert_eq!(exit_code, 2, "stderr: {stderr}");
    assert!(stderr.contains("is not a directory"));
}

#[test]
fn create_without_vendor_dir_returns_json_error() {
    let tmp = tempfile::tempdir().unwrap();
    fs::write(tmp.path().join("go.mod"), "module example.com/app\n").unwrap();
    let target = tmp.path().join("out");

    let (stdout, _stderr, exit_code) = run_vendir(&[
        "--go",
        "/nonexistent/vendir/go",
        "--format",
        "json",
        "create",
        s(tmp.path()),
        s(&target),
    ]);
    assert_eq!(exit_code, 2);
    let json: Value = serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 2);
    assert!(!target.exists());
}

#[test]
fn unusable_go_returns_exit_5() {
    let (_stdout, stderr, exit_code) = run_vendir(&[
        "--go",
        "/nonexistent/vendir/go",
        "rewrite-path",
        "github.com/foo/bar",
        ".",
        "--module-path",
        "example.com/app",
        "--package-prefix",
        "example.com/app/third_party",
    ]);
    assert_eq!(exit_code, 5, "stderr: {stderr}");
}

// ============================================================================
// Commands Against a Fake Toolchain
// ============================================================================

#[cfg(unix)]
mod scripted {
    use super::*;

    #[test]
    fn rewrite_path_text_and_json() {
        let _guard = serial();
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("app/third_party");
        fs::create_dir_all(&target).unwrap();
        let go = fake_go(tmp.path(), &tmp.path().join("app"));

        let (stdout, stderr, exit_code) =
            run_vendir(&["--go", s(&go), "rewrite-path", "github.com/foo/bar", s(&target)]);
        assert_eq!(exit_code, 0, "stderr: {stderr}");
        assert_eq!(stdout, "example.com/app/third_party/github.com/foo/bar\n");

        let (stdout, _stderr, exit_code) = run_vendir(&[
            "--go",
            s(&go),
            "--format",
            "json",
            "rewrite-path",
            "strings",
            s(&target),
        ]);
        assert_eq!(exit_code, 0);
        let json: Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(json["rewritten"], "strings");
        assert_eq!(json["class"], "stdlib");
    }

    #[test]
    fn rewrite_file_prints_result() {
        let _guard = serial();
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("app/third_party");
        fs::create_dir_all(&target).unwrap();
        let go = fake_go(tmp.path(), &tmp.path().join("app"));
        let file = tmp.path().join("x.go");
        let src = "package x\n\n//go:generate gen\nimport (\n\t\"fmt\"\n\t\"github.com/foo/bar\"\n)\n";
        fs::write(&file, src).unwrap();

        let (stdout, stderr, exit_code) =
            run_vendir(&["--go", s(&go), "rewrite-file", s(&file), s(&target)]);
        assert_eq!(exit_code, 0, "stderr: {stderr}");
        assert_eq!(
            stdout,
            "package x\n\n//vendir:removed go:generate gen\nimport (\n\t\"fmt\"\n\t\"example.com/app/third_party/github.com/foo/bar\"\n)\n"
        );
        assert_eq!(fs::read_to_string(&file).unwrap(), src);

        let (stdout, _stderr, exit_code) = run_vendir(&[
            "--go",
            s(&go),
            "rewrite-file",
            "--keep-generate",
            s(&file),
            s(&target),
        ]);
        assert_eq!(exit_code, 0);
        assert!(stdout.contains("\n//go:generate gen\n"));
    }

    #[test]
    fn rewrite_file_parse_error_returns_exit_3() {
        let _guard = serial();
        let tmp = tempfile::tempdir().unwrap();
        let go = fake_go(tmp.path(), tmp.path());
        let file = tmp.path().join("bad.go");
        fs::write(&file, "package x\nimport (\n\t\"fmt\"\n").unwrap();

        let (_stdout, stderr, exit_code) =
            run_vendir(&["--go", s(&go), "rewrite-file", s(&file), s(tmp.path())]);
        assert_eq!(exit_code, 3, "stderr: {stderr}");
        assert!(stderr.contains("bad.go"));
    }

    #[test]
    fn create_end_to_end() {
        let _guard = serial();
        let tmp = tempfile::tempdir().unwrap();
        let app = tmp.path().join("app");
        let vendor = app.join("vendor");
        fs::create_dir_all(vendor.join("github.com/foo/bar")).unwrap();
        fs::create_dir_all(vendor.join("github.com/foo/gen")).unwrap();
        fs::write(app.join("go.mod"), "module example.com/app\n").unwrap();
        fs::write(
            vendor.join("github.com/foo/bar/bar.go"),
            "package bar\n\nimport \"github.com/foo/baz\"\n",
        )
        .unwrap();
        fs::write(
            vendor.join("github.com/foo/gen/gen.go"),
            "package gen\n\nimport \"github.com/foo/baz\"\n",
        )
        .unwrap();
        let go = fake_go(tmp.path(), &app);
        let target = app.join("internal/third_party");

        let (stdout, stderr, exit_code) = run_vendir(&[
            "--go",
            s(&go),
            "--format",
            "json",
            "create",
            "--exclude",
            "github.com/foo/gen",
            s(&app),
            s(&target),
        ]);
        assert_eq!(exit_code, 0, "stderr: {stderr}");
        let json: Value = serde_json::from_str(&stdout).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["package_prefix"], "example.com/app/internal/third_party");
        assert_eq!(json["files_visited"], 2);
        assert_eq!(json["files_skipped"], 1);
        assert_eq!(json["files_rewritten"], 1);

        let bar = fs::read_to_string(target.join("github.com/foo/bar/bar.go")).unwrap();
        assert!(bar.contains("\"example.com/app/internal/third_party/github.com/foo/baz\""));
        let gen = fs::read_to_string(target.join("github.com/foo/gen/gen.go")).unwrap();
        assert!(gen.contains("\"github.com/foo/baz\""));

        // a second run needs --force
        let (_stdout, stderr, exit_code) =
            run_vendir(&["--go", s(&go), "create", s(&app), s(&target)]);
        assert_eq!(exit_code, 2);
        assert!(stderr.contains("already exists"));

        let (stdout, stderr, exit_code) =
            run_vendir(&["--go", s(&go), "create", "-f", s(&app), s(&target)]);
        assert_eq!(exit_code, 0, "stderr: {stderr}");
        assert!(stdout.contains("files:    2 rewritten, 0 unchanged, 0 skipped"));
    }

    #[test]
    fn update_failure_returns_exit_5() {
        let _guard = serial();
        let tmp = tempfile::tempdir().unwrap();
        let app = tmp.path().join("app");
        fs::create_dir_all(app.join("vendor")).unwrap();
        fs::write(app.join("go.mod"), "module example.com/app\n").unwrap();
        let go = fake_go(tmp.path(), &app);

        let (_stdout, stderr, exit_code) = run_vendir(&[
            "--go",
            s(&go),
            "create",
            "--update",
            s(&app),
            s(&tmp.path().join("out")),
        ]);
        assert_eq!(exit_code, 5, "stderr: {stderr}");
        assert!(stderr.contains("go mod tidy"));
    }
}
