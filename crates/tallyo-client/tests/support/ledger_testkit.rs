use std::path::{Path, PathBuf};

use rusqlite::Connection;
use serde_json::Value;
use tallyo_client::commands::categories::{self, CategoryAddOptions};
use tallyo_client::commands::ingest::{self, IngestRunOptions};
use tallyo_client::commands::transactions::{self, TransactionReviewOptions};
use tallyo_client::commands::users::{self, UserCreateOptions};
use tallyo_client::{ClientResult, SuccessEnvelope};
use tempfile::{TempDir, tempdir};

pub fn temp_home() -> std::io::Result<(TempDir, PathBuf)> {
    let dir = tempdir()?;
    let home = dir.path().join("tallyo-home");
    Ok((dir, home))
}

pub fn payload(result: ClientResult<SuccessEnvelope>) -> Value {
    assert!(result.is_ok(), "command failed: {:?}", result.as_ref().err());
    match result.map(serde_json::to_value) {
        Ok(Ok(value)) => value,
        _ => Value::Null,
    }
}

/// Creates a user and returns its bearer token secret.
pub fn create_user(home: &Path, name: &str) -> String {
    let value = payload(users::create_with_options(UserCreateOptions {
        name: name.to_string(),
        token_label: Some("tests".to_string()),
        home_override: Some(home),
    }));
    value["data"]["token"].as_str().unwrap_or_default().to_string()
}

pub fn add_category(home: &Path, token: &str, name: &str) -> String {
    let value = payload(categories::add_with_options(CategoryAddOptions {
        name: name.to_string(),
        token: Some(token.to_string()),
        home_override: Some(home),
    }));
    value["data"]["category"]["category_id"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

pub fn try_ingest(home: &Path, token: &str, body: &str) -> ClientResult<SuccessEnvelope> {
    ingest::run_with_options(IngestRunOptions {
        path: Some("-".to_string()),
        token: Some(token.to_string()),
        home_override: Some(home),
        stdin_override: Some(body.to_string()),
        ..IngestRunOptions::default()
    })
}

pub fn ingest_json(home: &Path, token: &str, rows: &Value) -> Value {
    payload(try_ingest(home, token, &rows.to_string()))
}

pub fn review(
    home: &Path,
    token: &str,
    txn_id: &str,
    category_id: Option<&str>,
    display_vendor: Option<&str>,
) -> Value {
    payload(transactions::review_with_options(TransactionReviewOptions {
        txn_id: txn_id.to_string(),
        category_id: category_id.map(str::to_string),
        display_vendor: display_vendor.map(str::to_string),
        token: Some(token.to_string()),
        home_override: Some(home),
    }))
}

/// The ingested rows of an ingest payload, in batch order.
pub fn ingested_rows(value: &Value) -> Vec<Value> {
    value["data"]["rows"].as_array().cloned().unwrap_or_default()
}

pub fn query_count(home: &Path, sql: &str) -> i64 {
    let connection = Connection::open(home.join("tallyo.db"));
    assert!(connection.is_ok());
    if let Ok(conn) = connection {
        let value = conn.query_row(sql, [], |row| row.get::<_, i64>(0));
        assert!(value.is_ok());
        if let Ok(count) = value {
            return count;
        }
    }
    0
}
