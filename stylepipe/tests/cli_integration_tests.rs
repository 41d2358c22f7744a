// stylepipe/tests/cli_integration_tests.rs
//! Command-line integration tests for the `stylepipe` binary.
//!
//! `dedupe` is driven through stdin and files. `build` and `targets` run
//! against a throwaway project in a temp directory laid out the way the
//! default pipeline expects (`styles/`, partials, `less/includes/`).
//! Console output may carry ANSI colors, so stderr is stripped before
//! assertions.

use anyhow::Result;
#[allow(unused_imports)]
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{NamedTempFile, TempDir};

#[allow(unused_imports)]
use assert_cmd::prelude::*;
use assert_cmd::Command;

use strip_ansi_escapes::strip as strip_ansi_escapes_fn;

fn stylepipe() -> Command {
    let mut cmd = Command::cargo_bin("stylepipe").unwrap();
    cmd.env_remove("STYLEPIPE_CONFIG");
    cmd.env("RUST_LOG", "debug");
    cmd
}

fn run_dedupe(input: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    let mut cmd = stylepipe();
    cmd.arg("dedupe").args(args);
    cmd.write_stdin(input.as_bytes());
    cmd.assert()
}

fn strip_ansi(s: &[u8]) -> String {
    String::from_utf8_lossy(&strip_ansi_escapes_fn(s)).to_string()
}

fn write(root: &Path, rel: &str, content: &str) -> Result<()> {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap())?;
    fs::write(path, content)?;
    Ok(())
}

fn sample_project() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let root = dir.path();
    write(root, "less/includes/_palette.scss", "$accent: #ff6600;\n")?;
    write(
        root,
        "styles/site.scss",
        "@import 'palette';\n.btn {\n  color: $accent;\n  user-select: none;\n}\n",
    )?;
    write(
        root,
        "styles/selectors.scss",
        ".tab ~ .panel ~ .tab {\n  display: none;\n}\n",
    )?;
    Ok(dir)
}

#[test]
fn test_dedupe_collapses_repeated_operand() {
    run_dedupe(".a ~ .b ~ .a { color: red; }", &["-q"])
        .success()
        .stdout(".a ~ .b { color: red; }");
}

#[test]
fn test_dedupe_collapses_at_line_start() {
    run_dedupe("body {}\n.x ~ .x {display:none}\n", &["-q"])
        .success()
        .stdout("body {}\n.x {display:none}\n");
}

#[test]
fn test_dedupe_leaves_comma_lists_alone() {
    let input = ".a ~ .b, .c ~ .b { margin: 0; }";
    run_dedupe(input, &["-q"]).success().stdout(input);
}

#[test]
fn test_dedupe_handles_several_lines() {
    let input = ".a ~ .b ~ .a { color: red; }\np { margin: 0; }\n.c ~ .c { top: 0; }\n";
    run_dedupe(input, &["-q"])
        .success()
        .stdout(".a ~ .b { color: red; }\np { margin: 0; }\n.c { top: 0; }\n");
}

#[test]
fn test_dedupe_reports_count_on_stderr() {
    let assert = run_dedupe(".a ~ .b ~ .a { color: red; }", &[]).success();
    let stderr = strip_ansi(&assert.get_output().stderr);
    assert!(stderr.contains("Collapsed 1 duplicate selector fragment(s)."), "{}", stderr);
}

#[test]
fn test_dedupe_diff_shows_changed_line() {
    let assert = run_dedupe(".a ~ .b ~ .a { color: red; }\n", &["-q", "--diff"]).success();
    let stdout = strip_ansi(&assert.get_output().stdout);
    assert!(stdout.contains("--- Selector Deduplication Diff ---"), "{}", stdout);
    assert!(stdout.contains("-.a ~ .b ~ .a { color: red; }"), "{}", stdout);
    assert!(stdout.contains("+.a ~ .b { color: red; }"), "{}", stdout);
}

#[test]
fn test_dedupe_diff_without_changes() {
    run_dedupe(".a { color: red; }\n", &["-q", "-D"])
        .success()
        .stdout(predicate::str::contains("No duplicate selector fragments found."));
}

#[test]
fn test_dedupe_file_to_file() -> Result<()> {
    let mut input = NamedTempFile::new()?;
    std::io::Write::write_all(&mut input, b".open ~ .open { display: block; }")?;
    let out_dir = TempDir::new()?;
    let out = out_dir.path().join("clean.css");

    stylepipe()
        .args(["-q", "dedupe", "-i"])
        .arg(input.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout("");

    assert_eq!(fs::read_to_string(&out)?, ".open { display: block; }");
    Ok(())
}

#[test]
fn test_dedupe_missing_input_file_fails() {
    stylepipe()
        .args(["dedupe", "-i", "/definitely/not/here.css"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read input file"));
}

#[test]
fn test_build_writes_css_and_maps() -> Result<()> {
    let dir = sample_project()?;
    let root = dir.path();

    stylepipe()
        .args(["-q", "build", "--browsers", "safari 12", "--root"])
        .arg(root)
        .assert()
        .success();

    let site = fs::read_to_string(root.join("styles/site.css"))?;
    assert!(site.contains(".btn"), "{}", site);
    assert!(site.contains("-webkit-user-select: none"), "{}", site);
    assert!(site.contains("sourceMappingURL=site.css.map"), "{}", site);
    assert!(root.join("styles/site.css.map").exists());

    let selectors = fs::read_to_string(root.join("styles/selectors.css"))?;
    assert!(selectors.contains(".tab ~ .panel {"), "{}", selectors);
    assert!(!selectors.contains(".panel ~ .tab"), "{}", selectors);
    Ok(())
}

#[test]
fn test_build_single_target() -> Result<()> {
    let dir = sample_project()?;
    let root = dir.path();

    stylepipe()
        .args(["-q", "build", "slow", "--root"])
        .arg(root)
        .assert()
        .success();

    assert!(root.join("styles/selectors.css").exists());
    assert!(!root.join("styles/site.css").exists());
    Ok(())
}

#[test]
fn test_build_no_source_maps() -> Result<()> {
    let dir = sample_project()?;
    let root = dir.path();

    stylepipe()
        .args(["-q", "build", "fast", "--no-source-maps", "--root"])
        .arg(root)
        .assert()
        .success();

    let site = fs::read_to_string(root.join("styles/site.css"))?;
    assert!(!site.contains("sourceMappingURL"), "{}", site);
    assert!(!root.join("styles/site.css.map").exists());
    Ok(())
}

#[test]
fn test_build_unknown_target_fails() -> Result<()> {
    let dir = sample_project()?;
    stylepipe()
        .args(["build", "medium", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("medium"));
    Ok(())
}

#[test]
fn test_build_dry_run_writes_nothing() -> Result<()> {
    let dir = sample_project()?;
    let root = dir.path();

    let assert = stylepipe()
        .args(["-q", "build", "--dry-run", "--root"])
        .arg(root)
        .assert()
        .success();
    let stdout = strip_ansi(&assert.get_output().stdout);
    assert!(stdout.contains("styles/site.scss -> styles/site.css"), "{}", stdout);
    assert!(stdout.contains("styles/selectors.scss -> styles/selectors.css"), "{}", stdout);
    assert!(!root.join("styles/site.css").exists());
    Ok(())
}

#[test]
fn test_build_json_report() -> Result<()> {
    let dir = sample_project()?;
    let assert = stylepipe()
        .args(["-q", "build", "--json", "--root"])
        .arg(dir.path())
        .assert()
        .success();

    let report: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    let targets = report["targets"].as_array().unwrap();
    assert_eq!(targets.len(), 2);
    let slow = targets.iter().find(|t| t["name"] == "slow").unwrap();
    assert_eq!(slow["outcomes"][0]["cleanup"][0]["occurrences"], 1);
    Ok(())
}

#[test]
fn test_build_failure_sets_exit_code() -> Result<()> {
    let dir = sample_project()?;
    write(dir.path(), "styles/broken.scss", ".x { color: $missing; }\n")?;

    let assert = stylepipe()
        .args(["build", "fast", "--root"])
        .arg(dir.path())
        .assert()
        .failure();
    let stderr = strip_ansi(&assert.get_output().stderr);
    assert!(stderr.contains("styles/broken.scss"), "{}", stderr);
    // The healthy file in the same target is still written.
    assert!(dir.path().join("styles/site.css").exists());
    Ok(())
}

#[test]
fn test_build_with_user_config() -> Result<()> {
    let dir = sample_project()?;
    let root = dir.path();
    write(
        root,
        "stylepipe.yaml",
        "targets:\n  - name: app\n    sources: [\"styles/site.scss\"]\n    dest: dist\n    source_maps: false\n",
    )?;

    stylepipe()
        .args(["-q", "build", "--root"])
        .arg(root)
        .assert()
        .success();

    assert!(root.join("dist/site.css").exists());
    assert!(!root.join("dist/site.css.map").exists());
    assert!(!root.join("styles/selectors.css").exists());
    Ok(())
}

#[test]
fn test_targets_json_lists_files() -> Result<()> {
    let dir = sample_project()?;
    let assert = stylepipe()
        .args(["-q", "targets", "--json", "--root"])
        .arg(dir.path())
        .assert()
        .success();

    let listing: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    let targets = listing["targets"].as_array().unwrap();
    let fast = targets.iter().find(|t| t["name"] == "fast").unwrap();
    assert_eq!(fast["files"], serde_json::json!(["styles/site.scss"]));
    let slow = targets.iter().find(|t| t["name"] == "slow").unwrap();
    assert_eq!(slow["files"], serde_json::json!(["styles/selectors.scss"]));
    assert_eq!(slow["cleanup"], true);
    Ok(())
}

#[test]
fn test_targets_plain_listing() -> Result<()> {
    let dir = sample_project()?;
    stylepipe()
        .args(["-q", "targets", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("slow (1 file(s)) [cleanup, source maps]"))
        .stdout(predicate::str::contains("  - styles/site.scss"));
    Ok(())
}
