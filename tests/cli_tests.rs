use assert_cmd::Command;
use rowgraph::fixture;
use rusqlite::Connection;
use std::path::PathBuf;

#[test]
fn test_cli_exits_with_success_on_help() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.arg("--help");
    cmd.assert().success();
}

#[test]
fn test_cli_demo_signature() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.args(["--format", "signature"]);
    cmd.assert().success().stdout(
        "N[table_a.1,table_b.1,table_b.2]|E[table_a.1--table_b.1,table_a.1--table_b.2]\n",
    );
}

#[test]
fn test_cli_json_with_db() {
    let (_dir, path) = prepare_db("rowgraph_cli.db");
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.args([
        "--db",
        path.to_str().unwrap(),
        "--table",
        "table_b",
        "--key",
        "2",
        "--format",
        "json",
        "--order",
        "bfs",
    ]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json");
    assert_eq!(value["seed"], "table_b.2");
    assert_eq!(value["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["edges"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_cli_text_output_lists_nodes_and_edges() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.args(["--table", "table_a", "--key", "1"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).expect("utf8");
    assert!(text.starts_with("seed table_a.1 (3 nodes, 2 edges)"));
    assert!(text.contains("table_a.1 -- table_b.2"));
    assert!(text.contains("  note:second b"));
}

#[test]
fn test_cli_zero_padded_text_key() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("zip.db");
    let conn = Connection::open(&path).expect("db");
    conn.execute_batch(
        "CREATE TABLE zip (code TEXT PRIMARY KEY, town TEXT);
         INSERT INTO zip VALUES ('0150', 'Oslo');",
    )
    .expect("schema");
    drop(conn);
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.args([
        "--db",
        path.to_str().unwrap(),
        "--table",
        "zip",
        "--key",
        "0150",
        "--format",
        "signature",
    ]);
    cmd.assert().success().stdout("N[zip.0150]|E[]\n");
}

#[test]
fn test_cli_payload_last_matches_first_on_static_rows() {
    let run = |policy: &str| {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
        cmd.args(["--payload", policy]);
        cmd.assert().success().get_output().stdout.clone()
    };
    let last = String::from_utf8(run("last")).expect("utf8");
    assert!(last.contains("  note:second b"));
    assert_eq!(last.as_bytes(), run("first").as_slice());
}

#[test]
fn test_cli_max_rows_adds_omitted_line() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.args(["--max-rows", "1"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).expect("utf8");
    assert!(text.contains("table_b.2\n  table_a_id:1\n  ...1 rows omitted.\n"));
    assert!(!text.contains("note:second b"));
}

#[test]
fn test_cli_max_row_length_truncates_values() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.args(["--max-row-length", "3"]);
    let output = cmd.assert().success().get_output().stdout.clone();
    let text = String::from_utf8(output).expect("utf8");
    assert!(text.contains("table_a.1\n  name:fir\n"));
    assert!(text.contains("  note:sec\n"));
    assert!(!text.contains("second b"));
}

#[test]
fn test_cli_missing_row_fails() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.args(["--table", "table_a", "--key", "404"]);
    cmd.assert().failure().code(1);
}

#[test]
fn test_cli_rejects_unknown_order() {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rowgraph"));
    cmd.args(["--order", "sideways"]);
    cmd.assert().failure().code(2);
}

fn prepare_db(name: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(name);
    let conn = Connection::open(&path).expect("db");
    fixture::seed_demo(&conn).expect("seed");
    (dir, path)
}
