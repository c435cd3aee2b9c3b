//! Integration tests for the dashfilter CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the dashfilter binary
#[allow(deprecated)]
fn dashfilter_cmd() -> Command {
    Command::cargo_bin("dashfilter").unwrap()
}

const DATASET: &str = r#"{
    "name": "orders",
    "columns": [
        {"name": "status", "type": "string", "alias": "Status"},
        {"name": "total", "type": "decimal"},
        {"name": "createdAt", "type": "datetime", "alias": "Created"}
    ]
}"#;

const FILTERS: &str = r#"{
    "id": "root",
    "logicalOp": "AND",
    "filters": [
        {"id": "f1", "columnName": "status", "op": "$eq", "value": "open"},
        {"id": "f2", "columnName": "status", "op": "$eq", "value": "paid"},
        {"id": "f3", "columnName": "createdAt", "op": "$between",
         "extra": {"period": "LAST", "unit": "DAY", "value": 7}}
    ],
    "blocks": [
        {"id": "b1", "logicalOp": "OR", "filters": [
            {"id": "f4", "columnName": "total", "op": "$in", "value": "10, 20"}
        ]}
    ]
}"#;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(filters: &str) -> Self {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("orders.json"), DATASET).unwrap();
        fs::write(dir.path().join("filters.json"), filters).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self, subcommand: &str) -> Command {
        let mut cmd = dashfilter_cmd();
        cmd.current_dir(self.dir.path())
            .env_remove("DASHFILTER_ENV")
            .arg(subcommand)
            .arg("--dataset")
            .arg(self.path("orders.json"))
            .arg("--filters")
            .arg(self.path("filters.json"));
        cmd
    }
}

#[test]
fn test_help_command() {
    dashfilter_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: dashfilter <COMMAND>"))
        .stdout(predicate::str::contains("compile"))
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("to-form"))
        .stdout(predicate::str::contains("operators"));
}

#[test]
fn test_version_command() {
    dashfilter_cmd()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_operators_for_temporal_type() {
    dashfilter_cmd()
        .args(["operators", "datetime"])
        .assert()
        .success()
        .stdout(predicate::str::contains("temporal"))
        .stdout(predicate::str::contains("$between"))
        .stdout(predicate::str::contains("$in ").not());
}

#[test]
fn test_operators_for_unknown_type() {
    dashfilter_cmd()
        .args(["operators", "geometry"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("D1001"));
}

#[test]
fn test_compile() {
    let ws = Workspace::new(FILTERS);
    let output = ws
        .cmd("compile")
        .args(["--now", "2024-03-10T12:00:00Z", "--timezone", "+01:00"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "$and": [
                {"status": {"$eq": "open"}},
                {"$or": [{"$and": [], "total": {"$in": [10, 20]}}]}
            ],
            "status": {"$eq": "paid"},
            "createdAt": {"$between": ["2024-03-03T13:00:00+01:00", "2024-03-10T13:00:00+01:00"]}
        })
    );
}

#[test]
fn test_compile_uses_config_timezone() {
    let ws = Workspace::new(FILTERS);
    fs::write(ws.path("dashfilter.toml"), "[display]\ntimezone = \"+05:00\"\n").unwrap();

    ws.cmd("compile")
        .args(["--now", "2024-03-10T12:00:00Z"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-03-10T17:00:00+05:00"));
}

#[test]
fn test_render_rejects_unusable_display_format() {
    let ws = Workspace::new(FILTERS);
    fs::write(
        ws.path("dashfilter.toml"),
        "[environments.ci.display]\ndate_format = \"%d.%m.%Y %H:%M\"\n",
    )
    .unwrap();

    ws.cmd("render").assert().success();

    ws.cmd("render")
        .args(["--env", "ci"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("date_format"))
        .stderr(predicate::str::contains("panicked").not());
}

#[test]
fn test_compile_withheld_value() {
    let filters = r#"{
        "id": "root",
        "filters": [
            {"id": "f1", "columnName": "total", "op": "$gt", "value": "1 +", "extra": {"isManual": true}}
        ]
    }"#;
    let ws = Workspace::new(filters);

    ws.cmd("compile")
        .assert()
        .success()
        .stderr(predicate::str::contains("D2001"))
        .stderr(predicate::str::contains("Values withheld for: total"));

    ws.cmd("compile")
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Validation error"));
}

#[test]
fn test_compile_missing_column() {
    let filters = r#"{"id": "root", "filters": [{"id": "f1", "columnName": "ghost", "op": "$null"}]}"#;
    let ws = Workspace::new(filters);

    ws.cmd("compile")
        .assert()
        .failure()
        .stderr(predicate::str::contains("D1003"))
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn test_render() {
    let ws = Workspace::new(FILTERS);
    ws.cmd("render")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Status = open and Status = paid and Created for last 7 days and (total in 10, 20)",
        ));
}

#[test]
fn test_render_nothing_visible() {
    let filters = r#"{"id": "root", "filters": [
        {"id": "f1", "columnName": "status", "op": "$null", "show": false}
    ]}"#;
    let ws = Workspace::new(filters);
    ws.cmd("render")
        .assert()
        .success()
        .stderr(predicate::str::contains("No visible filters"));
}

#[test]
fn test_to_form() {
    let filters = r#"{"id": "root", "filters": [
        {"id": "f1", "columnName": "createdAt", "op": "$gte", "value": "2024-01-01T10:00:00Z"}
    ]}"#;
    let ws = Workspace::new(filters);
    ws.cmd("to-form")
        .args(["--timezone", "+02:00"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-01-01T12:00:00+02:00"));
}

#[test]
fn test_invalid_filters_file() {
    let ws = Workspace::new("{not json");
    ws.cmd("render")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid filters"));
}

#[test]
fn test_missing_dataset_file() {
    dashfilter_cmd()
        .args(["render", "--dataset", "/nonexistent/orders.json", "--filters", "f.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("IO error"));
}
