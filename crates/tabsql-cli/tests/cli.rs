//! End-to-end tests for the `tabsql` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// The binary with an isolated config directory and no TABSQL_* overrides.
fn tabsql(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("tabsql").expect("binary should build");
    cmd.arg("--config-dir")
        .arg(config_dir.path())
        .env_remove("TABSQL_PAGE_SIZE")
        .env_remove("TABSQL_DATABASE")
        .env_remove("RUST_LOG");
    cmd
}

fn write_sales(dir: &TempDir) -> String {
    let path = dir.path().join("sales.csv");
    fs::write(
        &path,
        "region,amount\neu,10\nus,20\neu,5\nasia,7\nus,1\n",
    )
    .expect("write sales.csv");
    path.to_string_lossy().to_string()
}

#[test]
fn help_lists_examples() {
    let dir = TempDir::new().expect("tempdir");
    tabsql(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Examples:"))
        .stdout(predicate::str::contains("browse"));
}

#[test]
fn query_prints_table_and_count_line() {
    let dir = TempDir::new().expect("tempdir");
    tabsql(&dir)
        .args(["query", "SELECT 42 AS answer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("answer"))
        .stdout(predicate::str::contains("42"))
        .stdout(predicate::str::contains("1 rows returned in"));
}

#[test]
fn query_json_output() {
    let dir = TempDir::new().expect("tempdir");
    let output = tabsql(&dir)
        .args([
            "query",
            "SELECT 1 AS id, 'alice' AS name",
            "--format",
            "json",
        ])
        .output()
        .expect("run tabsql");
    assert!(output.status.success());

    let json: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(json["rows"][0]["id"], 1);
    assert_eq!(json["rows"][0]["name"], "alice");
}

#[test]
fn engine_error_is_reported_verbatim() {
    let dir = TempDir::new().expect("tempdir");
    tabsql(&dir)
        .args(["query", "SELECT * FROM no_such_table"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no_such_table"));
}

#[test]
fn load_then_list_tables() {
    let dir = TempDir::new().expect("tempdir");
    let sales = write_sales(&dir);
    tabsql(&dir)
        .args(["--load", &sales, "tables", "--format", "csv"])
        .assert()
        .success()
        .stdout("name\nsales\n")
        .stderr(predicate::str::contains("Table 'sales' created from sales.csv"));
}

#[test]
fn load_reports_unsupported_files() {
    let dir = TempDir::new().expect("tempdir");
    let bad = dir.path().join("notes.txt");
    fs::write(&bad, "hello").expect("write notes.txt");

    tabsql(&dir)
        .arg("load")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to upload notes.txt"));
}

#[test]
fn invalid_page_size_is_rejected() {
    let dir = TempDir::new().expect("tempdir");
    tabsql(&dir)
        .args(["--page-size", "7", "tables"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("page_size"));
}

#[test]
fn browse_prints_requested_page() {
    let dir = TempDir::new().expect("tempdir");
    let sales = write_sales(&dir);
    tabsql(&dir)
        .args([
            "--load",
            &sales,
            "--page-size",
            "10",
            "browse",
            "sales",
            "--no-interactive",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("5 rows displayed in"))
        .stdout(predicate::str::contains("Showing 1-5 of 5 rows | Page 1 of 1"));
}

#[test]
fn browse_rejects_page_out_of_range() {
    let dir = TempDir::new().expect("tempdir");
    let sales = write_sales(&dir);
    tabsql(&dir)
        .args(["--load", &sales, "browse", "sales", "--page", "3", "--no-interactive"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Page 3 is out of range (1-1)"));
}

#[test]
fn aggregate_prints_query() {
    let dir = TempDir::new().expect("tempdir");
    tabsql(&dir)
        .args([
            "aggregate",
            "--table",
            "sales",
            "--group-by",
            "region",
            "--function",
            "sum",
            "--value",
            "amount",
            "--order-by",
            "aggregated",
            "--desc",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "SELECT \"region\", SUM(\"amount\") AS \"sum_amount\"",
        ))
        .stdout(predicate::str::contains("ORDER BY \"sum_amount\" DESC;"));
}

#[test]
fn aggregate_runs_against_loaded_table() {
    let dir = TempDir::new().expect("tempdir");
    let sales = write_sales(&dir);
    tabsql(&dir)
        .args([
            "--load",
            &sales,
            "aggregate",
            "--table",
            "sales",
            "--group-by",
            "region",
            "--run",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("count"))
        .stdout(predicate::str::contains("3 rows returned in"));
}

#[test]
fn export_writes_csv_file() {
    let dir = TempDir::new().expect("tempdir");
    let sales = write_sales(&dir);
    let out = dir.path().join("eu.csv");

    tabsql(&dir)
        .args([
            "--load",
            &sales,
            "export",
            "SELECT region, amount FROM sales WHERE region = 'eu' ORDER BY amount",
            "--output",
        ])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 rows to"));

    let content = fs::read_to_string(&out).expect("export written");
    assert_eq!(content, "region,amount\neu,5\neu,10\n");
}

#[test]
fn config_set_then_show() {
    let dir = TempDir::new().expect("tempdir");
    tabsql(&dir)
        .args(["config", "set", "--page-size", "50"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration saved successfully."));

    tabsql(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Page Size: 50"));
}

#[test]
fn config_page_size_applies_to_browse() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("config.toml"), "page_size = 10\n").expect("write config");

    let ids: String = (1..=30).map(|i| format!("{}\n", i)).collect();
    let numbers = dir.path().join("numbers.csv");
    fs::write(&numbers, format!("id\n{}", ids)).expect("write numbers.csv");

    tabsql(&dir)
        .arg("--load")
        .arg(&numbers)
        .args(["browse", "numbers", "--page", "3", "--no-interactive"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Showing 21-30 of 30 rows | Page 3 of 3"));
}

#[test]
fn stored_invalid_page_size_is_a_config_error() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("config.toml"), "page_size = 7\n").expect("write config");

    tabsql(&dir)
        .arg("tables")
        .assert()
        .failure()
        .stderr(predicate::str::contains("page_size"))
        .stderr(predicate::str::contains("config set --page-size"));
}
