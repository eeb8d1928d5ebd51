use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn parse_jsonl(stdout: &[u8]) -> Vec<Value> {
    let s = String::from_utf8_lossy(stdout);
    s.lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| serde_json::from_str::<Value>(l).expect("valid jsonl line"))
        .collect()
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// Command isolated from the user's config and pin store
fn mdscope(state: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("mdscope"));
    cmd.env_remove("RUST_LOG")
        .arg("--config")
        .arg(state.path().join("config.toml"))
        .arg("--pins")
        .arg(state.path().join("pins.json"));
    cmd
}

fn names(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .map(|v| v["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn scan_finds_project_and_skips_excluded_dirs() {
    let root = tempdir().unwrap();
    let state = tempdir().unwrap();
    write_file(&root.path().join("proj/CLAUDE.md"), "# Hi");
    write_file(&root.path().join("proj/node_modules/pkg/CLAUDE.md"), "# Dep");

    let assert = mdscope(&state)
        .arg("scan")
        .arg("--folder")
        .arg(root.path())
        .arg("--exclude")
        .arg("node_modules")
        .assert()
        .success()
        .stderr(predicate::str::contains("1 project(s), 0 without CLAUDE.md"));

    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["name"], "proj");
    assert_eq!(items[0]["token_estimate"], 1);
    assert!(items[0].get("marker_content").is_none());
}

#[test]
fn scan_reports_missing_markers_and_reads_manifest_names() {
    let root = tempdir().unwrap();
    let state = tempdir().unwrap();
    write_file(&root.path().join("web/package.json"), r#"{"name": "storefront"}"#);
    write_file(&root.path().join("api/CLAUDE.md"), "# API");

    let assert = mdscope(&state)
        .args(["scan", "--folder"])
        .arg(root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("1 without CLAUDE.md"));

    let mut found = names(&parse_jsonl(&assert.get_output().stdout));
    found.sort();
    assert_eq!(found, vec!["api", "storefront"]);
}

#[test]
fn scan_search_filters_by_content() {
    let root = tempdir().unwrap();
    let state = tempdir().unwrap();
    write_file(&root.path().join("a/CLAUDE.md"), "Uses Postgres");
    write_file(&root.path().join("b/CLAUDE.md"), "Uses SQLite");

    let assert = mdscope(&state)
        .args(["scan", "--search", "postgres", "--folder"])
        .arg(root.path())
        .assert()
        .success();

    assert_eq!(names(&parse_jsonl(&assert.get_output().stdout)), vec!["a"]);
}

#[test]
fn scan_uses_settings_file() {
    let root = tempdir().unwrap();
    let state = tempdir().unwrap();
    write_file(&root.path().join("x/y/deep/CLAUDE.md"), "deep");
    write_file(
        &state.path().join("config.toml"),
        &format!(
            "scan_folders = [{:?}]\nscan_depth = 2\n",
            root.path().display().to_string()
        ),
    );

    let assert = mdscope(&state).arg("scan").assert().success();
    assert!(parse_jsonl(&assert.get_output().stdout).is_empty());

    let assert = mdscope(&state)
        .args(["scan", "--depth", "3"])
        .assert()
        .success();
    assert_eq!(names(&parse_jsonl(&assert.get_output().stdout)), vec!["deep"]);
}

#[test]
fn scan_without_folders_fails() {
    let state = tempdir().unwrap();
    mdscope(&state)
        .arg("scan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No scan folders configured"));
}

#[test]
fn scan_skips_missing_folder_silently() {
    let root = tempdir().unwrap();
    let state = tempdir().unwrap();
    write_file(&root.path().join("proj/CLAUDE.md"), "# Hi");

    let assert = mdscope(&state)
        .args(["scan", "--folder"])
        .arg(root.path().join("gone"))
        .arg("--folder")
        .arg(root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("skipping scan root").not())
        .stderr(predicate::str::contains("WARN").not());

    assert_eq!(names(&parse_jsonl(&assert.get_output().stdout)), vec!["proj"]);
}

#[test]
fn scan_rejects_zero_depth() {
    let root = tempdir().unwrap();
    let state = tempdir().unwrap();
    mdscope(&state)
        .args(["scan", "--depth", "0", "--folder"])
        .arg(root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("scan_depth"));
}

#[test]
fn pin_puts_project_first() {
    let root = tempdir().unwrap();
    let state = tempdir().unwrap();
    write_file(&root.path().join("alpha/CLAUDE.md"), "a");
    write_file(&root.path().join("beta/go.mod"), "module beta");

    mdscope(&state)
        .arg("pin")
        .arg(root.path().join("beta"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pinned"));

    let assert = mdscope(&state)
        .args(["scan", "--folder"])
        .arg(root.path())
        .assert()
        .success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert_eq!(names(&items), vec!["beta", "alpha"]);
    assert_eq!(items[0]["is_pinned"], true);

    mdscope(&state)
        .arg("pin")
        .arg(root.path().join("beta"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("unpinned"));
}

#[test]
fn docs_lists_pinned_documents_first() {
    let state = tempdir().unwrap();
    let root = tempdir().unwrap();
    let project = root.path().join("app");
    write_file(&project.join("CLAUDE.md"), "# App");
    write_file(&project.join("docs/zeta.md"), "z");
    write_file(&project.join("alpha.md"), "a");

    let assert = mdscope(&state)
        .args(["--format", "raw", "docs"])
        .arg(&project)
        .assert()
        .success();
    let listed: Vec<String> = String::from_utf8_lossy(&assert.get_output().stdout)
        .lines()
        .map(|l| Path::new(l).file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(listed, vec!["CLAUDE.md", "alpha.md", "zeta.md"]);

    mdscope(&state)
        .arg("pin")
        .arg(&project)
        .args(["--doc", "docs/zeta.md"])
        .assert()
        .success();

    let assert = mdscope(&state).arg("docs").arg(&project).assert().success();
    let items = parse_jsonl(&assert.get_output().stdout);
    assert!(items[0]["path"].as_str().unwrap().ends_with("zeta.md"));
    assert_eq!(items[0]["pinned"], true);
    assert_eq!(items[1]["pinned"], false);
}

#[test]
fn pin_rejects_unknown_document() {
    let state = tempdir().unwrap();
    let root = tempdir().unwrap();
    write_file(&root.path().join("app/CLAUDE.md"), "# App");

    mdscope(&state)
        .arg("pin")
        .arg(root.path().join("app"))
        .args(["--doc", "missing.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a document"));
}

#[test]
fn docs_rejects_non_project() {
    let state = tempdir().unwrap();
    let root = tempdir().unwrap();
    fs::create_dir_all(root.path().join("plain")).unwrap();

    mdscope(&state)
        .arg("docs")
        .arg(root.path().join("plain"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not a project directory"));
}

#[test]
fn show_renders_plain_text_without_color() {
    let state = tempdir().unwrap();
    let root = tempdir().unwrap();
    let file = root.path().join("CLAUDE.md");
    write_file(&file, "# Title\n\n- one\n- two\n\nRun `make`\n");

    mdscope(&state)
        .args(["--no-color", "show"])
        .arg(&file)
        .assert()
        .success()
        .stdout("Title\n\n• one\n• two\n\nRun make\n\n");
}

#[test]
fn show_json_emits_styled_runs() {
    let state = tempdir().unwrap();
    let root = tempdir().unwrap();
    let file = root.path().join("notes.md");
    write_file(&file, "## Sub");

    let assert = mdscope(&state)
        .args(["show", "--json"])
        .arg(&file)
        .assert()
        .success();
    let doc: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    let run = &doc["runs"][0];
    assert_eq!(run["text"], "Sub\n\n");
    assert_eq!(run["style"]["size"], 20);
    assert_eq!(run["style"]["foreground"], "#c4a7ff");
}

#[test]
fn show_reports_token_count() {
    let state = tempdir().unwrap();
    let root = tempdir().unwrap();
    let file = root.path().join("CLAUDE.md");
    write_file(&file, "abcdefgh");

    mdscope(&state)
        .args(["--no-color", "show", "--tokens", "quarter"])
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("2 tokens (quarter, Green)"));
}

#[test]
fn show_missing_file_fails() {
    let state = tempdir().unwrap();
    mdscope(&state)
        .args(["show", "/nonexistent/CLAUDE.md"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn watch_scan_once_prints_a_single_report() {
    let root = tempdir().unwrap();
    let state = tempdir().unwrap();
    write_file(&root.path().join("proj/CLAUDE.md"), "# Hi");

    let assert = mdscope(&state)
        .args(["watch-scan", "--once", "--folder"])
        .arg(root.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("scan #1"));

    assert_eq!(names(&parse_jsonl(&assert.get_output().stdout)), vec!["proj"]);
}
