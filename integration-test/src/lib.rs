//! Test driver for the cmdoption demo binaries.
//!
//! Runs `semver` or `vcs` from the workspace target directory with
//! stdin closed and stdout/stderr captured for assertions.

use std::path::Path;
use std::process::{Command, Stdio};

pub fn target_dir() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/../target/debug")
}

/// Path of a demo binary built by `cargo build -p cmdoption`.
pub fn binary(name: &str) -> String {
    format!("{}/{}", target_dir(), name)
}

/// Run `binary` with `args`.
pub fn run(binary: &str, args: &[&str]) -> std::io::Result<RunOutput> {
    run_in(binary, args, &[], None)
}

/// Like `run`, with extra environment variables and an optional working
/// directory.
pub fn run_in(
    binary: &str,
    args: &[&str],
    env: &[(&str, &str)],
    cwd: Option<&Path>,
) -> std::io::Result<RunOutput> {
    let mut cmd = Command::new(binary);
    cmd.args(args);
    for (k, v) in env {
        cmd.env(k, v);
    }
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }
    cmd.stdin(Stdio::null());

    let output = cmd.output()?;
    Ok(RunOutput {
        code: output.status.code().unwrap_or(-1),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Output captured from a finished run.
pub struct RunOutput {
    pub code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// Assert the exit code, showing both streams on mismatch.
    pub fn expect_exit(self, expected_code: i32) -> RunOutput {
        assert_eq!(
            self.code, expected_code,
            "expected exit code {expected_code}, got {}\nstdout:\n{}\nstderr:\n{}",
            self.code, self.stdout, self.stderr
        );
        self
    }
}
