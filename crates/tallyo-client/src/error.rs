use std::path::Path;

use serde_json::{Value, json};
use thiserror::Error;

use crate::contracts::types::{IngestIssue, IngestSummary};

pub(crate) const INGEST_HELP_COMMAND: &str = "tallyo ingest --help";
pub(crate) const INGEST_HELP_SECTION_TITLE: &str = "Ingest Troubleshooting";

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ClientError {
    pub code: String,
    pub message: String,
    pub recovery_steps: Vec<String>,
    pub data: Option<Value>,
}

impl ClientError {
    pub fn new(code: &str, message: &str, recovery_steps: Vec<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.to_string(),
            recovery_steps,
            data: None,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_ingest_help(self) -> Self {
        self.with_ingest_help_data(json!({}))
    }

    pub fn with_ingest_help_data(self, data: Value) -> Self {
        self.with_data(merge_ingest_help_data(data))
    }

    pub fn invalid_argument(message: &str) -> Self {
        Self::invalid_argument_for_command(message, None)
    }

    pub fn invalid_argument_for_command(message: &str, command: Option<&str>) -> Self {
        let help_hint = match command {
            Some(cmd) => format!("Run `tallyo {cmd} --help` for usage."),
            None => "Run `tallyo --help` for usage.".to_string(),
        };
        let error = Self::new("invalid_argument", message, vec![help_hint]);
        if let Some(cmd) = command {
            return error.with_data(json!({
                "command_hint": cmd,
            }));
        }
        error
    }

    pub fn invalid_argument_with_recovery(message: &str, recovery_steps: Vec<String>) -> Self {
        Self::new("invalid_argument", message, recovery_steps)
    }

    pub fn invalid_ingest_format(message: &str, received_format: &str) -> Self {
        Self::invalid_argument_with_recovery(
            message,
            vec![
                "Provide a supported ingest format (JSON array or CSV).".to_string(),
                "Run `tallyo ingest --help` to confirm field requirements.".to_string(),
            ],
        )
        .with_ingest_help_data(json!({
            "received_format": received_format,
            "supported_formats": ["json_array", "csv"],
        }))
    }

    pub fn ingest_schema_mismatch(expected_headers: Vec<String>, actual_headers: Vec<String>) -> Self {
        Self::new(
            "ingest_schema_mismatch",
            "CSV headers do not satisfy the ingest schema.",
            vec![
                "The header row needs external_id, vendor, amount and posted_at.".to_string(),
                "Only category_id and notes are allowed as extra headers.".to_string(),
                "Run `tallyo ingest --help` to review required and optional fields.".to_string(),
            ],
        )
        .with_ingest_help_data(json!({
            "expected_headers": expected_headers,
            "actual_headers": actual_headers,
        }))
    }

    pub fn ingest_validation_failed(summary: IngestSummary, issues: Vec<IngestIssue>) -> Self {
        let issue_count = summary.rows_invalid;
        Self::new(
            "ingest_validation_failed",
            &format!("Ingest failed validation: {issue_count} rows need fixes. No rows were written."),
            vec![
                "Correct the rows listed under `issues`.".to_string(),
                "Then rerun tallyo ingest <path>.".to_string(),
            ],
        )
        .with_ingest_help_data(json!({
            "summary": summary,
            "issues": issues,
        }))
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            "unauthenticated",
            "The supplied bearer token is missing, unknown, or revoked.",
            vec![
                "Pass a valid token with `--token <token>` or set `TALLYO_TOKEN`.".to_string(),
                "Run `tallyo user create <name>` to issue a new token.".to_string(),
            ],
        )
    }

    pub fn category_not_found(category_id: &str) -> Self {
        Self::new(
            "category_not_found",
            &format!("Category id `{category_id}` was not found for this user."),
            vec!["Run `tallyo category list` to find a valid category id.".to_string()],
        )
        .with_data(json!({
            "category_id": category_id,
        }))
    }

    pub fn category_already_exists(name: &str) -> Self {
        Self::new(
            "category_already_exists",
            &format!("A category named `{name}` already exists."),
            vec!["Run `tallyo category list` to reuse the existing category id.".to_string()],
        )
    }

    pub fn transaction_not_found(txn_id: &str) -> Self {
        Self::new(
            "transaction_not_found",
            &format!("Transaction id `{txn_id}` was not found for this user."),
            vec!["Run `tallyo txn list` to find a valid transaction id.".to_string()],
        )
        .with_data(json!({
            "txn_id": txn_id,
        }))
    }

    pub fn amount_overflow(command: &str) -> Self {
        Self::new(
            "amount_overflow",
            "Summed amounts exceed the 64-bit range of minor units.",
            vec![
                "Narrow the range with `--from` and `--to`.".to_string(),
                format!("Run `tallyo {command} --help` for usage."),
            ],
        )
    }

    pub fn internal_serialization(message: &str) -> Self {
        Self::new("internal_serialization_error", message, Vec::new())
    }

    pub fn ledger_init_permission_denied(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_permission_denied",
            &format!("No permission to open the ledger at `{location}`: {detail}"),
            vec![format!(
                "Grant write access to `{location}` or set `TALLYO_HOME` to a writable directory."
            )],
        )
    }

    pub fn ledger_locked(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_locked",
            &format!("Another process holds the ledger lock at `{location}`."),
            vec![format!(
                "Wait for the other tallyo process writing to `{location}` to finish, then retry."
            )],
        )
    }

    pub fn ledger_corrupt(path: &Path) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_corrupt",
            &format!("The file at `{location}` is not a usable Tallyo ledger."),
            vec![format!(
                "Move `{location}` aside and rerun to start a fresh ledger, or restore a backup."
            )],
        )
    }

    pub fn migration_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "migration_failed",
            &format!("Could not upgrade the ledger schema at `{location}`: {detail}"),
            vec!["Check the details for the table or index that blocked the upgrade.".to_string()],
        )
    }

    pub fn ledger_init_failed(path: &Path, detail: &str) -> Self {
        let location = path.display().to_string();
        Self::new(
            "ledger_init_failed",
            &format!("Could not open the ledger at `{location}`: {detail}"),
            Vec::new(),
        )
    }

    pub fn is_internal(&self) -> bool {
        self.code.starts_with("internal_")
            || matches!(
                self.code.as_str(),
                "ledger_init_permission_denied"
                    | "ledger_locked"
                    | "ledger_corrupt"
                    | "migration_failed"
                    | "ledger_init_failed"
            )
    }
}

fn merge_ingest_help_data(mut data: Value) -> Value {
    if !data.is_object() {
        data = json!({});
    }

    if let Some(object) = data.as_object_mut() {
        object.insert(
            "help_command".to_string(),
            Value::String(INGEST_HELP_COMMAND.to_string()),
        );
        object.insert(
            "help_section_title".to_string(),
            Value::String(INGEST_HELP_SECTION_TITLE.to_string()),
        );
    }

    data
}

pub type ClientResult<T> = Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::ClientError;

    #[test]
    fn ingest_help_data_is_merged_into_object_payloads() {
        let error = ClientError::invalid_argument("bad").with_ingest_help_data(json!({
            "row": 3,
        }));
        let data = error.data.unwrap_or_default();
        assert_eq!(data["row"], json!(3));
        assert_eq!(data["help_command"], json!("tallyo ingest --help"));
    }

    #[test]
    fn ledger_errors_are_internal_but_auth_errors_are_not() {
        assert!(ClientError::ledger_locked(std::path::Path::new("/tmp/x")).is_internal());
        assert!(ClientError::internal_serialization("boom").is_internal());
        assert!(!ClientError::unauthenticated().is_internal());
        assert!(!ClientError::amount_overflow("report categories").is_internal());
    }
}
