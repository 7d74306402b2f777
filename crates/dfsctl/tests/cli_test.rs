//! Integration tests for the `dfsctl` CLI binary.
//!
//! Every test runs against manifests and inventories in a temp dir, with
//! settings lookups pointed at a nonexistent home directory.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use insta::assert_snapshot;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `dfsctl` binary with env isolation.
fn dfsctl_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dfsctl");
    cmd.env("HOME", "/tmp/dfsctl-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/dfsctl-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("DFSCTL_CONFIG")
        .env_remove("DFSCTL_INVENTORY")
        .env_remove("DFSCTL_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// A manifest and an inventory path inside a fresh temp dir.
struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
        }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn inventory(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    fn cmd(&self) -> assert_cmd::Command {
        let mut cmd = dfsctl_cmd();
        cmd.arg("--config")
            .arg(self.dir.path().join("config.toml"))
            .arg("--inventory")
            .arg(self.inventory());
        cmd
    }
}

const SITE: &str = r"
roots:
  - path: '\\corp\dfs'
    targets: ['\\fs1\dfs']
replication_groups:
  - name: dfsr
    members: [fs1, fs2]
";

fn json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = dfsctl_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    dfsctl_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("replication")
            .and(predicate::str::contains("plan"))
            .and(predicate::str::contains("apply"))
            .and(predicate::str::contains("show")),
    );
}

#[test]
fn test_version_flag() {
    dfsctl_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("dfsctl"));
}

#[test]
fn test_invalid_subcommand() {
    let output = dfsctl_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    dfsctl_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    dfsctl_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── unc ─────────────────────────────────────────────────────────────

#[test]
fn test_unc_joins_components() {
    dfsctl_cmd()
        .args(["unc", "corp", r"dfs\", "data"])
        .assert()
        .success()
        .stdout(predicate::str::diff("\\\\corp\\dfs\\data\n"));
}

#[test]
fn test_unc_needs_server_and_share() {
    let output = dfsctl_cmd().args(["unc", "corp"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("at least a server and a share"));
}

// ── plan ────────────────────────────────────────────────────────────

#[test]
fn test_plan_without_inventory_is_a_usage_error() {
    let ws = Workspace::new();
    let manifest = ws.write("site.yaml", SITE);
    let output = dfsctl_cmd()
        .arg("--config")
        .arg(ws.dir.path().join("config.toml"))
        .args(["plan", arg(&manifest)])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("No inventory file configured"));
}

#[test]
fn test_plan_missing_manifest_is_not_found() {
    let ws = Workspace::new();
    let output = ws.cmd().args(["plan", "missing.yaml"]).output().unwrap();
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_plan_lists_changes_without_writing() {
    let ws = Workspace::new();
    let manifest = ws.write("site.yaml", SITE);
    let output = ws
        .cmd()
        .args(["--output", "plain", "plan", arg(&manifest)])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_snapshot!(stdout.trim_end(), @r"
    namespace root \\corp\dfs: Created namespace root \\corp\dfs (DomainV2) with targets \\fs1\dfs
    replication group dfsr: Created replication group dfsr (mesh); Added member fs1 to replication group dfsr; Added member fs2 to replication group dfsr connected to fs1
    ");
    assert!(!ws.inventory().exists());
}

// ── apply ───────────────────────────────────────────────────────────

#[test]
fn test_apply_is_idempotent() {
    let ws = Workspace::new();
    let manifest = ws.write("site.yaml", SITE);

    let first = ws
        .cmd()
        .args(["-o", "json", "apply", arg(&manifest)])
        .output()
        .unwrap();
    assert!(first.status.success(), "{}", combined_output(&first));
    let reports = json(&first);
    assert_eq!(reports[0]["changed"], true);
    assert_eq!(reports[1]["entity"]["kind"], "group");
    assert!(ws.inventory().exists());

    let second = ws
        .cmd()
        .args(["-o", "json", "apply", arg(&manifest)])
        .output()
        .unwrap();
    assert!(second.status.success(), "{}", combined_output(&second));
    let reports = json(&second);
    assert_eq!(reports[0]["changed"], false);
    assert_eq!(reports[1]["changed"], false);
    assert_eq!(reports[1]["msg"], "");
}

#[test]
fn test_show_lists_applied_entities() {
    let ws = Workspace::new();
    let manifest = ws.write("site.yaml", SITE);
    ws.cmd().args(["apply", arg(&manifest)]).assert().success();

    ws.cmd()
        .args(["-o", "plain", "show", "roots"])
        .assert()
        .success()
        .stdout(predicate::str::diff("\\\\corp\\dfs\n"));
    ws.cmd()
        .args(["-o", "plain", "show", "groups"])
        .assert()
        .success()
        .stdout(predicate::str::diff("dfsr\n"));
}

#[test]
fn test_removal_requires_confirmation() {
    let ws = Workspace::new();
    let manifest = ws.write("site.yaml", SITE);
    ws.cmd().args(["apply", arg(&manifest)]).assert().success();

    let shrink = ws.write(
        "shrink.yaml",
        r"
replication_groups:
  - name: dfsr
    members: [fs1]
",
    );
    let output = ws.cmd().args(["apply", arg(&shrink)]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("requires confirmation"));

    let output = ws
        .cmd()
        .args(["--yes", "-o", "json", "apply", arg(&shrink)])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(
        json(&output)[0]["msg"],
        "Removed member fs2 from replication group dfsr disconnected from fs1"
    );
}

#[test]
fn test_type_change_is_a_conflict() {
    let ws = Workspace::new();
    let manifest = ws.write("site.yaml", SITE);
    ws.cmd().args(["apply", arg(&manifest)]).assert().success();

    let retype = ws.write(
        "retype.yaml",
        r"
roots:
  - path: '\\corp\dfs'
    type: Standalone
    targets: ['\\fs1\dfs']
",
    );
    let output = ws.cmd().args(["plan", arg(&retype)]).output().unwrap();
    assert_eq!(output.status.code(), Some(6));
    assert!(combined_output(&output).contains("Cannot change type"));
}

#[test]
fn test_missing_targets_fail_validation() {
    let ws = Workspace::new();
    let manifest = ws.write("bad.toml", "[[roots]]\npath = '\\\\corp\\dfs'\n");
    let output = ws.cmd().args(["apply", arg(&manifest)]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    assert!(combined_output(&output).contains("targets are required"));
    assert!(!ws.inventory().exists());
}

// ── config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_and_path() {
    let ws = Workspace::new();
    let config = ws.dir.path().join("config.toml");

    ws.cmd().args(["--yes", "config", "init"]).assert().success();
    assert!(config.exists());
    let written = std::fs::read_to_string(&config).unwrap();
    assert!(written.contains("root_ttl = 300"), "{written}");

    let again = ws.cmd().args(["--yes", "config", "init"]).output().unwrap();
    assert_eq!(again.status.code(), Some(2));

    ws.cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_settings_default_output_is_used() {
    let ws = Workspace::new();
    ws.write("config.toml", "[defaults]\noutput = \"json\"\n");
    let manifest = ws.write("site.yaml", SITE);
    let output = ws.cmd().args(["plan", arg(&manifest)]).output().unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let planned = json(&output);
    assert_eq!(planned.as_array().unwrap().len(), 2);
    assert_eq!(planned[0]["operations"][0]["op"], "create_root");
}
