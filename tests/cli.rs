use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn write_csv(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

fn tablewatch(dir: &TempDir, input: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tablewatch").unwrap();
    cmd.arg(input)
        .arg("--database")
        .arg(dir.path().join("snapshots.db"))
        .args(["--group-column", "Project Name"])
        .args(["--detail-column", "Item,Qty"])
        .args(["--color", "never"]);
    cmd
}

const FIRST: &str = "Project Name,Item,Qty\nTower,Beam,3\nTower,Column,4\nAnnex,Slab,1\n";
const SECOND: &str = "Project Name,Item,Qty\nTower,Beam,3\nAnnex,Slab,2\nDepot,Truss,7\n";

#[test]
fn first_run_seeds_baseline() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(dir.path(), "quotes.csv", FIRST);

    tablewatch(&dir, &input)
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences found."));
}

#[test]
fn second_run_reports_changes() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(dir.path(), "quotes.csv", FIRST);
    tablewatch(&dir, &input).assert().success();

    write_csv(dir.path(), "quotes.csv", SECOND);
    tablewatch(&dir, &input)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Added"))
        .stdout(predicate::str::contains("Removed"))
        .stdout(predicate::str::contains("Depot"))
        .stdout(predicate::str::contains("Column"));

    // The second run replaced the snapshot, so a repeat is quiet
    tablewatch(&dir, &input)
        .assert()
        .success()
        .stdout(predicate::str::contains("No differences found."));
}

#[test]
fn dry_run_keeps_prior_snapshot() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(dir.path(), "quotes.csv", FIRST);
    tablewatch(&dir, &input).assert().success();

    write_csv(dir.path(), "quotes.csv", SECOND);
    tablewatch(&dir, &input).arg("--dry-run").assert().code(1);
    tablewatch(&dir, &input).assert().code(1);
}

#[test]
fn json_output() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(dir.path(), "quotes.csv", FIRST);
    tablewatch(&dir, &input).assert().success();

    write_csv(dir.path(), "quotes.csv", SECOND);
    let output = tablewatch(&dir, &input)
        .args(["--format", "json"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value.get("Added").is_some());
    assert!(value.get("Removed").is_some());
}

#[test]
fn unknown_group_column_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(dir.path(), "quotes.csv", FIRST);

    let mut cmd = Command::cargo_bin("tablewatch").unwrap();
    cmd.arg(&input)
        .arg("--database")
        .arg(dir.path().join("snapshots.db"))
        .args(["--group-column", "Region"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Region"));
}

#[test]
fn unsupported_file_type_is_an_error() {
    let dir = TempDir::new().unwrap();
    let input = write_csv(dir.path(), "quotes.pdf", FIRST);

    tablewatch(&dir, &input)
        .assert()
        .code(2)
        .stderr(predicate::str::starts_with("Error:"));
}
