//! Shared test infrastructure for integration tests.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Path to the binary under test, built by cargo for this test run.
pub fn scbake_bin() -> &'static str {
    env!("CARGO_BIN_EXE_scbake")
}

/// Run scbake with the given arguments inside `cwd` and capture the output.
/// A stable identity is injected so `git commit` works in bare CI sandboxes.
pub fn run_scbake(cwd: &Path, args: &[&str]) -> Output {
    Command::new(scbake_bin())
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "scbake-test")
        .env("GIT_AUTHOR_EMAIL", "scbake-test@example.invalid")
        .env("GIT_COMMITTER_NAME", "scbake-test")
        .env("GIT_COMMITTER_EMAIL", "scbake-test@example.invalid")
        .output()
        .expect("run scbake binary")
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Check if a binary is available; tests that shell out to it skip when it
/// is not.
pub fn tool_available(name: &str) -> bool {
    Command::new(name)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

/// Recursively list the relative paths of all entries under `root`, sorted,
/// for before/after comparisons.
pub fn snapshot_tree(root: &Path) -> Vec<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<PathBuf>) {
        for entry in std::fs::read_dir(dir).expect("read dir") {
            let entry = entry.expect("dir entry");
            let path = entry.path();
            out.push(path.strip_prefix(root).expect("under root").to_path_buf());
            if path.is_dir() {
                walk(root, &path, out);
            }
        }
    }
    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
