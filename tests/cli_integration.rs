//! Integration tests for the `ht` CLI.
//!
//! Each test creates a temp workspace directory, runs `ht` as a subprocess,
//! and verifies stdout and/or file contents.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Datelike;

const SAMPLE_PLAN: &str = include_str!("fixtures/sample_plan.json");

/// Get the path to the built `ht` binary.
fn ht_bin() -> PathBuf {
    // cargo test builds to target/debug/
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("ht");
    path
}

/// Create a workspace whose bootstrap document is the sample plan.
fn create_test_workspace(root: &Path) {
    let plan_dir = root.join("hoshitori");
    fs::create_dir_all(&plan_dir).unwrap();
    fs::write(
        plan_dir.join("plan.toml"),
        r#"[plan]
name = "test-site"

[bootstrap]
file = "bootstrap.json"

# chart columns
[ui]
show_bom_code = true
show_cycle = true
"#,
    )
    .unwrap();
    fs::write(plan_dir.join("bootstrap.json"), SAMPLE_PLAN).unwrap();
}

/// Run `ht` with the given args in the given directory, returning (stdout, stderr, success).
fn run_ht(dir: &Path, args: &[&str]) -> (String, String, bool) {
    let output = Command::new(ht_bin())
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run ht");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (stdout, stderr, output.status.success())
}

/// Run `ht` expecting success, return stdout.
fn run_ht_ok(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_ht(dir, args);
    if !success {
        panic!(
            "ht {:?} failed:\nstdout: {}\nstderr: {}",
            args, stdout, stderr
        );
    }
    stdout
}

/// Run `ht` expecting failure, return stderr.
fn run_ht_err(dir: &Path, args: &[&str]) -> String {
    let (stdout, stderr, success) = run_ht(dir, args);
    if success {
        panic!("ht {:?} should have failed:\nstdout: {}", args, stdout);
    }
    stderr
}

fn saved_plan(root: &Path) -> Option<serde_json::Value> {
    let text = fs::read_to_string(root.join("hoshitori/plan.json")).ok()?;
    Some(serde_json::from_str(&text).unwrap())
}

/// Rows of `ht show --all --json`, keyed for lookup by id
fn chart_row(root: &Path, id: u64) -> serde_json::Value {
    let out = run_ht_ok(root, &["show", "--all", "--json"]);
    let chart: serde_json::Value = serde_json::from_str(&out).unwrap();
    chart["rows"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["id"] == id)
        .cloned()
        .unwrap_or_else(|| panic!("row {} not shown", id))
}

// ---------------------------------------------------------------------------
// Startup
// ---------------------------------------------------------------------------

#[test]
fn test_not_a_workspace() {
    let tmp = tempfile::TempDir::new().unwrap();
    let err = run_ht_err(tmp.path(), &["show"]);
    assert!(err.contains("not a hoshitori workspace"));
}

#[test]
fn test_missing_bootstrap_is_fatal() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());
    fs::remove_file(tmp.path().join("hoshitori/bootstrap.json")).unwrap();

    let err = run_ht_err(tmp.path(), &["show"]);
    assert!(err.contains("bootstrap"));
}

#[test]
fn test_workspace_dir_flag() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());
    let elsewhere = tempfile::TempDir::new().unwrap();

    let out = run_ht_ok(
        elsewhere.path(),
        &["-C", tmp.path().to_str().unwrap(), "year", "list"],
    );
    assert_eq!(out.trim(), "2024, 2025, 2026, 2027, 2028");
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

#[test]
fn test_show_collapsed_by_default() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["show"]);
    assert!(out.contains("▶ 本館"));
    assert!(!out.contains("空調設備"));
    // the closed root carries the rollup
    assert!(out.contains("〇●"));
}

#[test]
fn test_show_all() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["show", "--all"]);
    assert!(out.lines().next().unwrap().contains("2028"));
    assert!(out.contains("定期点検"));
    assert!(out.contains("1.2.1.1"));
    assert!(out.contains("▼ 本館"));
}

#[test]
fn test_show_json_rows() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["show", "--all", "--json"]);
    let chart: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(chart["years"].as_array().unwrap().len(), 5);
    assert_eq!(chart["rows"].as_array().unwrap().len(), 10);

    // a cycle missing from the document gets the id-based default
    let filter = chart_row(tmp.path(), 7);
    assert_eq!(filter["cycle"], 3);
    assert_eq!(filter["bom_code"], "1.1.2.1");
    // an explicitly blank cycle stays blank
    assert!(chart_row(tmp.path(), 10).get("cycle").is_none());
}

#[test]
fn test_show_search() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["show", "--search", "冷凍"]);
    assert!(out.contains("本館"));
    assert!(out.contains("空調設備"));
    assert!(out.contains("冷凍機"));
    assert!(!out.contains("電気設備"));
    assert!(!out.contains("空調機"));
}

#[test]
fn test_search() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["search", "点検"]);
    assert!(out.contains("1.1.1.1  定期点検  [4]"));
    assert!(out.contains("1.2.1.1  年次点検  [10]"));

    let out = run_ht_ok(tmp.path(), &["search", "boiler"]);
    assert_eq!(out.trim(), "no matches");
}

#[test]
fn test_check() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["check"]);
    assert!(out.contains("✓ plan is valid"));

    fs::write(
        tmp.path().join("hoshitori/plan.json"),
        r#"{"years": [2024], "maintenanceData": [
          {"id": 1, "task": "A", "level": 1, "children": [
            {"id": 2, "task": "B", "level": 2, "children": [
              {"id": 3, "task": "C", "level": 3, "children": [
                {"id": 4, "task": "D", "level": 4,
                 "results": {"2030": {"planned": true, "actual": false}}}
              ]}
            ]}
          ]}
        ]}"#,
    )
    .unwrap();
    let out = run_ht_ok(tmp.path(), &["check", "--json"]);
    let result: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(result["valid"], true);
    assert_eq!(result["warnings"][0]["type"], "year_not_on_axis");
    assert_eq!(result["warnings"][0]["year"], 2030);
}

// ---------------------------------------------------------------------------
// Tree mutations
// ---------------------------------------------------------------------------

#[test]
fn test_add_under_component() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["add", "3", "  振動測定 "]);
    assert_eq!(out.trim(), "11 1.1.1.3");

    let saved = fs::read_to_string(tmp.path().join("hoshitori/plan.json")).unwrap();
    assert!(saved.contains("\"task\": \"振動測定\""));

    // the parent was opened so the new item is visible once its ancestors are
    run_ht_ok(tmp.path(), &["expand", "1", "2"]);
    let out = run_ht_ok(tmp.path(), &["show"]);
    assert!(out.contains("振動測定"));
}

#[test]
fn test_add_ids_increase() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    assert!(run_ht_ok(tmp.path(), &["add", "9", "絶縁測定"]).starts_with("11 "));
    assert!(run_ht_ok(tmp.path(), &["add", "6", "ベルト交換"]).starts_with("12 "));
    assert!(run_ht_ok(tmp.path(), &["add", "9", "清掃"]).starts_with("13 "));
}

#[test]
fn test_add_rejected_without_saving() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_ht_err(tmp.path(), &["add", "2", "Inspect"]);
    assert!(err.contains("not a component"));
    let err = run_ht_err(tmp.path(), &["add", "3", "   "]);
    assert!(err.contains("cannot be empty"));
    let err = run_ht_err(tmp.path(), &["add", "99", "Inspect"]);
    assert!(err.contains("not found"));

    assert!(saved_plan(tmp.path()).is_none());
}

#[test]
fn test_rename() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["rename", "4", "月次点検"]);
    assert_eq!(out.trim(), "4 renamed");
    let out = run_ht_ok(tmp.path(), &["rename", "4", " 月次点検 "]);
    assert_eq!(out.trim(), "4 unchanged");

    let err = run_ht_err(tmp.path(), &["rename", "4", ""]);
    assert!(err.contains("cannot be empty"));
    assert!(run_ht_ok(tmp.path(), &["show", "--all"]).contains("月次点検"));
}

#[test]
fn test_unchanged_edits_leave_bootstrap_in_place() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["rename", "4", "定期点検"]);
    assert_eq!(out.trim(), "4 unchanged");
    let out = run_ht_ok(tmp.path(), &["cycle", "5", "5"]);
    assert_eq!(out.trim(), "5 unchanged");
    let out = run_ht_ok(tmp.path(), &["mark", "5", "2026", "clear"]);
    assert_eq!(out.trim(), "5 2026 unchanged");

    assert!(saved_plan(tmp.path()).is_none());
}

#[test]
fn test_delete_logs_recovery() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["delete", "5", "--yes"]);
    assert_eq!(out.trim(), "deleted 5 (1 nodes)");

    let out = run_ht_ok(tmp.path(), &["show", "--all"]);
    assert!(!out.contains("オーバーホール"));
    assert!(out.contains("定期点検"));

    let log = run_ht_ok(tmp.path(), &["recovery"]);
    assert!(log.contains("delete: node 5 deleted"));
    assert!(log.contains("オーバーホール"));
}

#[test]
fn test_delete_component_cascades() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["delete", "3", "--yes"]);
    assert_eq!(out.trim(), "deleted 3 (3 nodes)");
    let row = chart_row(tmp.path(), 6);
    assert_eq!(row["bom_code"], "1.1.1");
}

#[test]
fn test_delete_without_confirmation_is_cancelled() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["delete", "5"]);
    assert_eq!(out.trim(), "cancelled");
    assert!(saved_plan(tmp.path()).is_none());
}

#[test]
fn test_delete_root_refused() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_ht_err(tmp.path(), &["delete", "1", "--yes"]);
    assert!(err.contains("cannot be deleted"));
}

#[test]
fn test_cycle() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["cycle", "7", "4"]);
    assert_eq!(out.trim(), "7 cycle set to 4 years");
    assert_eq!(chart_row(tmp.path(), 7)["cycle"], 4);

    let out = run_ht_ok(tmp.path(), &["cycle", "7", ""]);
    assert_eq!(out.trim(), "7 cycle cleared");
    assert!(chart_row(tmp.path(), 7).get("cycle").is_none());

    let err = run_ht_err(tmp.path(), &["cycle", "3", "2"]);
    assert!(err.contains("not a maintenance action"));
    let err = run_ht_err(tmp.path(), &["cycle", "7", "abc"]);
    assert!(err.contains("invalid cycle"));
}

#[test]
fn test_mark() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_ht_ok(tmp.path(), &["mark", "7", "2026", "both"]);
    let row = chart_row(tmp.path(), 7);
    assert_eq!(row["marks"]["2026"]["planned"], true);
    assert_eq!(row["marks"]["2026"]["actual"], true);

    // containers pick the mark up through the rollup
    run_ht_ok(tmp.path(), &["collapse", "--all"]);
    let out = run_ht_ok(tmp.path(), &["show", "--json"]);
    let chart: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(chart["rows"][0]["marks"]["2026"]["actual"], true);

    run_ht_ok(tmp.path(), &["mark", "7", "2026", "clear"]);
    assert!(chart_row(tmp.path(), 7)["marks"].get("2026").is_none());

    let err = run_ht_err(tmp.path(), &["mark", "7", "2031", "plan"]);
    assert!(err.contains("not on the year axis"));
    let err = run_ht_err(tmp.path(), &["mark", "7", "2026", "maybe"]);
    assert!(err.contains("invalid mark"));
}

#[test]
fn test_bulk_plan() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["plan", "7", "2024", "--json"]);
    let result: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(result["cycle"], 3);
    assert_eq!(result["planned"], serde_json::json!([2024, 2027]));

    // start year already planned
    let err = run_ht_err(tmp.path(), &["plan", "7", "2024"]);
    assert!(err.contains("--overwrite"));

    // the phase still comes from the earliest planned year (2024)
    let out = run_ht_ok(tmp.path(), &["plan", "7", "2025", "--overwrite"]);
    assert_eq!(out.trim(), "planned 7: 2027");
}

#[test]
fn test_bulk_plan_refused() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let err = run_ht_err(tmp.path(), &["plan", "10", "2024"]);
    assert!(err.contains("no positive cycle"));
    let err = run_ht_err(tmp.path(), &["plan", "3", "2024"]);
    assert!(err.contains("not a maintenance action"));
    let err = run_ht_err(tmp.path(), &["plan", "7", "2040"]);
    assert!(err.contains("not on the year axis"));
    assert!(saved_plan(tmp.path()).is_none());
}

// ---------------------------------------------------------------------------
// Year axis
// ---------------------------------------------------------------------------

#[test]
fn test_year_add() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["year", "add", "2023"]);
    assert_eq!(out.trim(), "added 2023");
    let out = run_ht_ok(tmp.path(), &["year", "list"]);
    assert_eq!(out.trim(), "2023, 2024, 2025, 2026, 2027, 2028");

    let err = run_ht_err(tmp.path(), &["year", "add", "2023"]);
    assert!(err.contains("already exists"));
    let err = run_ht_err(tmp.path(), &["year", "add", "999"]);
    assert!(err.contains("invalid year"));
    let err = run_ht_err(tmp.path(), &["year", "add", "-5"]);
    assert!(err.contains("invalid year"));
}

#[test]
fn test_year_removable_and_remove() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["year", "removable"]);
    assert_eq!(out.trim(), "2026, 2027, 2028");

    let err = run_ht_err(tmp.path(), &["year", "remove", "2024", "--yes"]);
    assert!(err.contains("still has plan or actual entries"));
    assert!(err.contains("2026, 2027, 2028"));

    let out = run_ht_ok(tmp.path(), &["year", "remove", "2028", "--yes"]);
    assert_eq!(out.trim(), "removed 2028");
    let out = run_ht_ok(tmp.path(), &["year", "list", "--json"]);
    let years: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(years["years"], serde_json::json!([2024, 2025, 2026, 2027]));
    assert_eq!(years["removable"], serde_json::json!([2026, 2027]));
}

// ---------------------------------------------------------------------------
// View state
// ---------------------------------------------------------------------------

#[test]
fn test_expand_and_collapse() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["expand", "--all"]);
    assert_eq!(out.trim(), "expanded 6");
    let out = run_ht_ok(tmp.path(), &["show"]);
    assert!(out.contains("年次点検"));

    run_ht_ok(tmp.path(), &["collapse", "2"]);
    let out = run_ht_ok(tmp.path(), &["show"]);
    assert!(out.contains("▶ 空調設備"));
    assert!(!out.contains("冷凍機"));
    assert!(out.contains("受変電設備"));

    let err = run_ht_err(tmp.path(), &["expand", "4"]);
    assert!(err.contains("has no children"));
}

#[test]
fn test_columns() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_ht_ok(tmp.path(), &["columns", "--bom-code", "off"]);
    let out = run_ht_ok(tmp.path(), &["columns"]);
    assert!(out.contains("bom-code: off"));
    assert!(out.contains("cycle: on"));

    let out = run_ht_ok(tmp.path(), &["show", "--all"]);
    assert!(!out.lines().next().unwrap().contains("BOM"));
    assert!(!out.contains("1.1.1.1"));

    let toml = fs::read_to_string(tmp.path().join("hoshitori/plan.toml")).unwrap();
    assert!(toml.contains("# chart columns"));
}

// ---------------------------------------------------------------------------
// Document exchange
// ---------------------------------------------------------------------------

#[test]
fn test_export() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    let out = run_ht_ok(tmp.path(), &["export"]);
    assert_eq!(out.trim(), "exported to hoshitori_data.json");
    let text = fs::read_to_string(tmp.path().join("hoshitori_data.json")).unwrap();
    assert!(text.starts_with("{\n  \"years\""));
    assert!(!text.contains("bomCode"));
    let doc: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert!(doc["maintenanceData"].is_array());

    let out = run_ht_ok(tmp.path(), &["export", "-", "--derived"]);
    assert!(out.contains("\"bomCode\": \"1.2.1.1\""));
    assert!(out.contains("rolledUpResults"));
    assert!(out.contains("\"parentId\": 9"));
}

#[test]
fn test_import_round_trip() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_ht_ok(tmp.path(), &["export", "a.json"]);
    let out = run_ht_ok(tmp.path(), &["import", "a.json", "--yes"]);
    assert!(out.contains("imported 10 items"));
    run_ht_ok(tmp.path(), &["export", "b.json"]);

    let a = fs::read_to_string(tmp.path().join("a.json")).unwrap();
    let b = fs::read_to_string(tmp.path().join("b.json")).unwrap();
    assert_eq!(a, b);

    let log = run_ht_ok(tmp.path(), &["recovery", "--json"]);
    let entries: serde_json::Value = serde_json::from_str(&log).unwrap();
    assert_eq!(entries[0]["category"], "replace");
    assert_eq!(entries[0]["fields"]["Source"], "a.json");
}

#[test]
fn test_import_replaces_plan() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    fs::write(
        tmp.path().join("other.json"),
        r#"{"years": [2031, 2030], "maintenanceData": [
          {"id": 1, "task": "別館", "level": 1, "children": []}
        ]}"#,
    )
    .unwrap();
    run_ht_ok(tmp.path(), &["import", "other.json", "--yes"]);

    let out = run_ht_ok(tmp.path(), &["year", "list"]);
    assert_eq!(out.trim(), "2030, 2031");
    let out = run_ht_ok(tmp.path(), &["show", "--all"]);
    assert!(out.contains("別館"));
    assert!(!out.contains("本館"));
}

#[test]
fn test_import_rejects_bad_shape() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());
    run_ht_ok(tmp.path(), &["rename", "4", "月次点検"]);
    let before = fs::read_to_string(tmp.path().join("hoshitori/plan.json")).unwrap();

    fs::write(tmp.path().join("bad.json"), r#"{"years": 2024, "maintenanceData": []}"#).unwrap();
    let err = run_ht_err(tmp.path(), &["import", "bad.json", "--yes"]);
    assert!(err.contains("years"));

    fs::write(tmp.path().join("bad.json"), r#"{"years": [2024]}"#).unwrap();
    let err = run_ht_err(tmp.path(), &["import", "bad.json", "--yes"]);
    assert!(err.contains("maintenanceData"));

    let after = fs::read_to_string(tmp.path().join("hoshitori/plan.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_reset() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    run_ht_ok(tmp.path(), &["rename", "4", "月次点検"]);
    run_ht_ok(tmp.path(), &["expand", "1"]);
    assert!(saved_plan(tmp.path()).is_some());

    let out = run_ht_ok(tmp.path(), &["reset"]);
    assert_eq!(out.trim(), "cancelled");
    assert!(saved_plan(tmp.path()).is_some());

    let out = run_ht_ok(tmp.path(), &["reset", "--yes"]);
    assert_eq!(out.trim(), "plan reset");
    assert!(saved_plan(tmp.path()).is_none());
    assert!(!tmp.path().join("hoshitori/.state.json").exists());

    let out = run_ht_ok(tmp.path(), &["show", "--all"]);
    assert!(out.contains("定期点検"));
    assert!(!out.contains("月次点検"));
}

#[test]
fn test_recovery_clear() {
    let tmp = tempfile::TempDir::new().unwrap();
    create_test_workspace(tmp.path());

    assert_eq!(
        run_ht_ok(tmp.path(), &["recovery"]).trim(),
        "recovery log is empty"
    );
    run_ht_ok(tmp.path(), &["delete", "5", "--yes"]);
    run_ht_ok(tmp.path(), &["delete", "4", "--yes"]);

    let out = run_ht_ok(tmp.path(), &["recovery", "--limit", "1"]);
    assert!(out.contains("node 4 deleted"));
    assert!(!out.contains("node 5 deleted"));

    let out = run_ht_ok(tmp.path(), &["recovery", "--clear"]);
    assert_eq!(out.trim(), "removed 2 entries");
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

#[test]
fn test_init_empty() {
    let tmp = tempfile::TempDir::new().unwrap();

    let out = run_ht_ok(tmp.path(), &["init", "--name", "Site", "--years", "3"]);
    assert_eq!(out.trim(), "Initialized hoshitori plan: Site");
    assert!(tmp.path().join("hoshitori/plan.toml").is_file());
    assert!(tmp.path().join("hoshitori/bootstrap.json").is_file());

    let year = chrono::Local::now().year();
    let out = run_ht_ok(tmp.path(), &["year", "list"]);
    assert_eq!(
        out.trim(),
        format!("{}, {}, {}", year, year + 1, year + 2)
    );

    let err = run_ht_err(tmp.path(), &["init"]);
    assert!(err.contains("already exists"));
}

#[test]
fn test_init_from_document() {
    let tmp = tempfile::TempDir::new().unwrap();
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/sample_plan.json");

    run_ht_ok(tmp.path(), &["init", "--from", fixture.to_str().unwrap()]);
    let out = run_ht_ok(tmp.path(), &["show", "--all"]);
    assert!(out.contains("年次点検"));
}

#[test]
fn test_init_rejects_bad_document() {
    let tmp = tempfile::TempDir::new().unwrap();
    fs::write(tmp.path().join("bad.json"), r#"{"years": []}"#).unwrap();

    let err = run_ht_err(tmp.path(), &["init", "--from", "bad.json"]);
    assert!(err.contains("maintenanceData"));
    assert!(!tmp.path().join("hoshitori").exists());
}

#[test]
fn test_init_name_with_backslash() {
    let tmp = tempfile::TempDir::new().unwrap();

    run_ht_ok(tmp.path(), &["init", "--name", "Site\\Q \"North\""]);
    let toml = fs::read_to_string(tmp.path().join("hoshitori/plan.toml")).unwrap();
    let config: toml::Value = toml::from_str(&toml).unwrap();
    assert_eq!(config["plan"]["name"].as_str(), Some(r#"Site\Q "North""#));

    // later commands can still read the config
    run_ht_ok(tmp.path(), &["year", "list"]);
}
