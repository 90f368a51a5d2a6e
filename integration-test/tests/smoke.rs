use std::process::Command;
use std::sync::Once;
use test_driver::{binary, run, run_in, RunOutput};

static BUILD_INIT: Once = Once::new();

/// Build the demo binaries (semver + vcs) if not already done.
fn ensure_binaries() {
    BUILD_INIT.call_once(|| {
        let manifest_dir = env!("CARGO_MANIFEST_DIR");
        let workspace_root = format!("{manifest_dir}/..");
        let status = Command::new("cargo")
            .args(["build", "-p", "cmdoption", "--features", "demo", "--bins"])
            .current_dir(&workspace_root)
            .status()
            .expect("failed to run cargo build");
        assert!(status.success(), "cargo build -p cmdoption failed");
    });
}

fn semver(args: &[&str]) -> RunOutput {
    ensure_binaries();
    run(&binary("semver"), args).expect("failed to run semver")
}

fn vcs(args: &[&str]) -> RunOutput {
    ensure_binaries();
    run(&binary("vcs"), args).expect("failed to run vcs")
}

// -- semver --

#[test]
fn semver_diff_mode() {
    let out = semver(&["--diff", "--base-jar", "api-1.jar", "--new-jar", "api-2.jar"]).expect_exit(0);
    assert!(out.stdout.contains("diff: true"), "stdout:\n{}", out.stdout);
    assert!(out.stdout.contains("check: false"));
    assert!(out.stdout.contains("base_jar: \"api-1.jar\""));
    assert!(out.stdout.contains("new_jar: \"api-2.jar\""));
    assert!(out.stdout.contains("base_version: None"));
}

#[test]
fn semver_reports_every_missing_jar() {
    let out = semver(&["--diff"]).expect_exit(1);
    assert!(
        out.stderr
            .contains("option --base-jar must be given at least 1 time(s), found 0"),
        "stderr:\n{}",
        out.stderr
    );
    assert!(out.stderr
        .contains("option --new-jar must be given at least 1 time(s), found 0"));
    assert!(out.stderr.contains("Try 'semver --help'"));
    assert!(out.stdout.is_empty());
}

#[test]
fn semver_modes_conflict() {
    let out = semver(&["-d", "-c", "--base-jar", "a", "--new-jar", "b"]).expect_exit(1);
    assert!(out.stderr.contains("option --diff conflicts with option --check"));
    assert!(out.stderr.contains("option --check conflicts with option --diff"));
}

#[test]
fn semver_validate_needs_both_versions() {
    let out = semver(&["-v", "--base-version", "1.0.0", "--base-jar", "a", "--new-jar", "b"])
        .expect_exit(1);
    assert!(out.stderr.contains("option --validate requires option --new-version"));
    assert!(!out.stderr.contains("requires option --base-version"));

    semver(&[
        "-v",
        "--base-version",
        "1.0.0",
        "--new-version",
        "1.1.0",
        "--base-jar",
        "a",
        "--new-jar",
        "b",
    ])
    .expect_exit(0);
}

#[test]
fn semver_ambiguous_abbreviation() {
    let out = semver(&["--ba", "x.jar"]).expect_exit(1);
    assert!(
        out.stderr
            .contains("option --ba is ambiguous; possibilities: --base-jar, --base-version"),
        "stderr:\n{}",
        out.stderr
    );
}

#[test]
fn semver_unique_abbreviation() {
    let out = semver(&["--base-j", "a", "--new-j", "b", "--inf", "--base-v", "2.0"]).expect_exit(0);
    assert!(out.stdout.contains("infer: true"));
    assert!(out.stdout.contains("base_version: Some("));
}

#[test]
fn semver_includes_accumulate() {
    let out = semver(&[
        "--base-jar",
        "a",
        "--new-jar",
        "b",
        "--includes",
        "org.A;org.B",
        "--includes",
        "org.C",
    ])
    .expect_exit(0);
    for class in ["\"org.A\"", "\"org.B\"", "\"org.C\""] {
        assert!(out.stdout.contains(class), "missing {class} in:\n{}", out.stdout);
    }
}

#[test]
fn semver_help_skips_validation() {
    // neither jar is given, yet help wins
    let out = semver(&["--diff", "--check", "-h"]).expect_exit(0);
    assert!(out.stdout.starts_with("Usage: semver [OPTION...]\n\nSemantic version validator.\n"));
    assert!(out.stdout.contains("\nModes:\n"));
    assert!(out.stdout.contains("  --diff, -d "));
    assert!(out.stdout.contains("  --base-jar JAR "));
    assert!(out.stderr.is_empty(), "stderr:\n{}", out.stderr);
}

#[test]
fn semver_missing_argument() {
    let out = semver(&["--base-jar"]).expect_exit(1);
    assert!(out
        .stderr
        .contains("option --base-jar requires 1 argument(s) but 0 given"));
}

#[test]
fn semver_debug_logs_to_stderr() {
    let out = semver(&["--debug", "--base-jar", "a", "--new-jar", "b"]).expect_exit(0);
    assert!(out.stderr.contains("resolved option handler"), "stderr:\n{}", out.stderr);
    assert!(out.stderr.contains("matched option"));
    assert!(out.stdout.contains("debug: true"));
}

#[test]
fn semver_debug_follows_matched_option() {
    // abbreviated --debug still enables logging
    let out = semver(&["--deb", "--base-jar", "a", "--new-jar", "b"]).expect_exit(0);
    assert!(out.stderr.contains("matched option"), "stderr:\n{}", out.stderr);

    // --debug consumed as a version value is not the option
    let out = semver(&["--base-version", "--debug", "--base-jar", "a", "--new-jar", "b"]).expect_exit(0);
    assert!(out.stdout.contains("debug: false"), "stdout:\n{}", out.stdout);
    assert!(out.stderr.is_empty(), "stderr:\n{}", out.stderr);
}

// -- vcs --

#[test]
fn vcs_push_with_remote() {
    let out = vcs(&["push", "--remote", "origin", "main", "dev"]).expect_exit(0);
    assert!(out.stdout.starts_with("command: push\n"), "stdout:\n{}", out.stdout);
    assert!(out.stdout.contains("remote: \"origin\""));
    assert!(out.stdout.contains("\"main\""));
    assert!(out.stdout.contains("\"dev\""));
}

#[test]
fn vcs_push_without_remote() {
    let out = vcs(&["push"]).expect_exit(1);
    assert!(out
        .stderr
        .contains("vcs: option --remote must be given at least 1 time(s), found 0"));
}

#[test]
fn vcs_default_command() {
    let out = vcs(&[]).expect_exit(0);
    assert!(out.stdout.starts_with("command: status\n"));
    assert!(out.stdout.contains("status: Some("));
}

#[test]
fn vcs_settings_and_status_alias() {
    let out = vcs(&["--set", "user", "ann", "--set", "editor", "vi", "st", "-s"]).expect_exit(0);
    assert!(out.stdout.contains("\"user\": \"ann\""));
    assert!(out.stdout.contains("\"editor\": \"vi\""));
    assert!(out.stdout.contains("short: true"));
}

#[test]
fn vcs_aggregated_flags_conflict() {
    let out = vcs(&["-vq"]).expect_exit(1);
    assert!(out.stderr.contains("option --verbose conflicts with option --quiet"));
}

#[test]
fn vcs_commit_messages_in_order() {
    let out = vcs(&["ci", "-m", "first", "-a", "-m", "second"]).expect_exit(0);
    assert!(out.stdout.starts_with("command: commit\n"));
    let first = out.stdout.find("\"first\"").expect("first message");
    let second = out.stdout.find("\"second\"").expect("second message");
    assert!(first < second);
    assert!(out.stdout.contains("all: true"));
}

#[test]
fn vcs_conversion_failure() {
    let out = vcs(&["commit", "-m", "x", "--depth", "deep"]).expect_exit(1);
    assert!(out.stderr.contains("invalid argument for option --depth"), "stderr:\n{}", out.stderr);
}

#[test]
fn vcs_separator_makes_command_positional() {
    let out = vcs(&["--", "push"]).expect_exit(1);
    assert!(out.stderr.contains("unexpected argument: push"));
}

#[test]
fn vcs_command_names_must_match_exactly() {
    let out = vcs(&["pu", "--remote", "origin"]).expect_exit(1);
    assert!(out.stderr.contains("vcs: unexpected argument: pu"), "stderr:\n{}", out.stderr);
}

#[test]
fn vcs_unknown_option() {
    let out = vcs(&["--bogus"]).expect_exit(1);
    assert!(out.stderr.contains("vcs: unknown option: --bogus"));
}

#[test]
fn vcs_help() {
    let out = vcs(&["--help"]).expect_exit(0);
    assert!(out.stdout.starts_with("Usage: vcs [OPTION...] COMMAND [ARG...]\n"));
    assert!(out.stdout.contains("\nCommands:\n"));
    assert!(out.stdout.contains("  commit, ci "));
    assert!(out.stdout.contains("  --set KEY VALUE "));
    assert!(!out.stdout.contains("--debug"));
    assert!(out.stdout.ends_with("Commands accept --help for their own options.\n"));
}

#[test]
fn vcs_command_help() {
    let out = vcs(&["push", "--help"]).expect_exit(0);
    assert!(
        out.stdout
            .starts_with("Usage: vcs push [OPTION...] [REF...]\n\nUpdate remote refs.\n"),
        "stdout:\n{}",
        out.stdout
    );
    assert!(out.stdout.contains("\nParameters:\n"));
    assert!(!out.stdout.contains("Commands:"));

    // hidden options stay out of command help too
    let out = vcs(&["commit", "-h"]).expect_exit(0);
    assert!(!out.stdout.contains("--depth"));
}

#[test]
fn vcs_work_dir_from_tempdir() {
    ensure_binaries();
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().to_string_lossy().to_string();
    let out = run_in(&binary("vcs"), &["-C", &path, "st"], &[], Some(dir.path()))
        .expect("failed to run vcs")
        .expect_exit(0);
    assert!(out.stdout.contains("work_dir: Some("), "stdout:\n{}", out.stdout);
    assert!(out.stdout.contains(&path));
}
