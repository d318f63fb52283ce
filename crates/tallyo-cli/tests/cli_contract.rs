use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Value, json};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(1);

struct TestHome {
    path: PathBuf,
}

impl TestHome {
    fn new() -> Self {
        let stamp = match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(value) => value.as_nanos(),
            Err(_) => 0,
        };
        let sequence = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let mut path = std::env::temp_dir();
        path.push(format!(
            "tallyo-cli-test-{}-{stamp}-{sequence}",
            std::process::id()
        ));
        Self { path }
    }
}

impl Drop for TestHome {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

struct CliRun {
    code: Option<i32>,
    stdout: String,
}

impl CliRun {
    fn json(&self) -> Value {
        let parsed = serde_json::from_str::<Value>(&self.stdout);
        assert!(parsed.is_ok(), "stdout was not JSON: {}", self.stdout);
        parsed.unwrap_or(Value::Null)
    }
}

fn run_cli(home: &Path, args: &[&str], input: Option<&str>) -> CliRun {
    let mut command = Command::new(env!("CARGO_BIN_EXE_tallyo"));
    command.args(args);
    command.env("TALLYO_HOME", home);
    command.env_remove("TALLYO_TOKEN");
    command.env_remove("TALLYO_LOG");
    command.stdin(if input.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let spawned = command.spawn();
    assert!(spawned.is_ok());
    if let Ok(mut child) = spawned {
        if let Some(body) = input
            && let Some(mut pipe) = child.stdin.take()
        {
            assert!(pipe.write_all(body.as_bytes()).is_ok());
        }

        let output = child.wait_with_output();
        assert!(output.is_ok());
        if let Ok(result) = output {
            return CliRun {
                code: result.status.code(),
                stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            };
        }
    }

    CliRun {
        code: None,
        stdout: String::new(),
    }
}

fn create_user(home: &Path) -> String {
    let run = run_cli(home, &["user", "create", "ada", "--json"], None);
    assert_eq!(run.code, Some(0));
    let value = run.json();
    value["data"]["token"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_default()
}

#[test]
fn bare_invocation_prints_root_help() {
    let home = TestHome::new();
    let run = run_cli(&home.path, &[], None);
    assert_eq!(run.code, Some(0));
    assert!(run.stdout.starts_with("Tallyo - personal finance ledger\n"));
    assert!(run.stdout.contains("tallyo user create <name>"));
}

#[test]
fn top_level_help_lists_the_workflow() {
    let home = TestHome::new();
    let run = run_cli(&home.path, &["--help"], None);
    assert_eq!(run.code, Some(0));
    assert!(run.stdout.contains("USAGE: tallyo [--token <token>] <command>"));
    assert!(run.stdout.contains("tallyo report categories"));
}

#[test]
fn json_workflow_from_user_to_report() {
    let home = TestHome::new();
    let token = create_user(&home.path);
    assert!(token.starts_with("tly_"));

    let added = run_cli(
        &home.path,
        &["category", "add", "Coffee", "--json", "--token", &token],
        None,
    );
    assert_eq!(added.code, Some(0));
    let category_id = added.json()["data"]["category"]["category_id"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_default();

    let batch = json!([
        {"external_id": "1", "vendor": "STARBUCKS STORE 100", "amount": -450, "posted_at": "2026-02-01"},
        {"external_id": "2", "vendor": "CITY WATER", "amount": -6100, "posted_at": "2026-02-02"}
    ])
    .to_string();
    let ingested = run_cli(
        &home.path,
        &["ingest", "-", "--json", "--token", &token],
        Some(&batch),
    );
    assert_eq!(ingested.code, Some(0));
    let ingest_value = ingested.json();
    assert_eq!(ingest_value["ok"], Value::Bool(true));
    assert_eq!(ingest_value["command"], json!("ingest"));
    assert_eq!(ingest_value["data"]["summary"]["inserted"], json!(2));
    let txn_id = ingest_value["data"]["rows"][0]["txn_id"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_default();

    let reviewed = run_cli(
        &home.path,
        &[
            "txn",
            "review",
            &txn_id,
            "--category",
            &category_id,
            "--json",
            "--token",
            &token,
        ],
        None,
    );
    assert_eq!(reviewed.code, Some(0));
    assert_eq!(
        reviewed.json()["data"]["transaction"]["category_name"],
        json!("Coffee")
    );

    let pending = run_cli(
        &home.path,
        &["txn", "list", "--unreviewed", "--json", "--token", &token],
        None,
    );
    assert_eq!(pending.code, Some(0));
    assert_eq!(pending.json()["data"]["returned"], json!(1));

    let report = run_cli(
        &home.path,
        &["report", "categories", "--json", "--token", &token],
        None,
    );
    assert_eq!(report.code, Some(0));
    let report_value = report.json();
    assert_eq!(report_value["data"]["txn_count"], json!(2));
    assert_eq!(report_value["data"]["total_amount"], json!(-6550));
}

#[test]
fn missing_token_exits_with_user_error() {
    let home = TestHome::new();
    let run = run_cli(&home.path, &["category", "list", "--json"], None);
    assert_eq!(run.code, Some(1));
    let value = run.json();
    assert_eq!(value["ok"], Value::Bool(false));
    assert_eq!(value["error"]["code"], json!("unauthenticated"));
}

#[test]
fn parse_errors_carry_a_command_hint() {
    let home = TestHome::new();
    let run = run_cli(
        &home.path,
        &["txn", "list", "--limit", "0", "--json"],
        None,
    );
    assert_eq!(run.code, Some(1));
    let value = run.json();
    assert_eq!(value["error"]["code"], json!("invalid_argument"));
    assert_eq!(value["data"]["command_hint"], json!("txn list"));
}

#[test]
fn invalid_ingest_rows_are_listed_in_text_mode() {
    let home = TestHome::new();
    let token = create_user(&home.path);
    let batch = "external_id,vendor,amount,posted_at\nx-1,ACME,12.50,2026-02-01\n";

    let run = run_cli(&home.path, &["ingest", "-", "--token", &token], Some(batch));
    assert_eq!(run.code, Some(1));
    assert!(run.stdout.starts_with("Something went wrong."));
    assert!(run.stdout.contains("ingest_validation_failed"));
    assert!(run.stdout.contains("Rows to fix:"));
    assert!(run.stdout.contains("amount"));
}

#[test]
fn token_flag_falls_back_to_the_environment() {
    let home = TestHome::new();
    let token = create_user(&home.path);

    let mut command = Command::new(env!("CARGO_BIN_EXE_tallyo"));
    command
        .args(["category", "list", "--json"])
        .env("TALLYO_HOME", &home.path)
        .env("TALLYO_TOKEN", &token)
        .stdin(Stdio::null());
    let output = command.output();
    assert!(output.is_ok());
    if let Ok(result) = output {
        assert!(result.status.success());
        let parsed = serde_json::from_slice::<Value>(&result.stdout);
        assert!(parsed.is_ok());
        if let Ok(value) = parsed {
            assert_eq!(value["command"], json!("category list"));
        }
    }
}
