pub(crate) mod input;
pub(crate) mod parse;
pub(crate) mod persist;
pub(crate) mod validate;

use std::collections::HashSet;
use std::path::Path;

use rusqlite::Connection;

use crate::auth::AuthenticatedUser;
use crate::contracts::types::{IngestSummary, IngestedRow};
use crate::matching::MatchSettings;
use crate::setup::Ledger;
use crate::state::map_sqlite_error;
use crate::{ClientError, ClientResult};

pub(crate) const REQUIRED_FIELDS: [&str; 4] = ["external_id", "vendor", "amount", "posted_at"];
pub(crate) const OPTIONAL_FIELDS: [&str; 2] = ["category_id", "notes"];

#[derive(Debug, Clone)]
pub(crate) struct IngestExecution {
    pub(crate) ingest_id: String,
    pub(crate) source_used: String,
    pub(crate) summary: IngestSummary,
    pub(crate) rows: Vec<IngestedRow>,
}

pub(crate) fn execute(
    ledger: &mut Ledger,
    user: &AuthenticatedUser,
    path: Option<&str>,
    stdin_override: Option<String>,
    settings: &MatchSettings,
) -> ClientResult<IngestExecution> {
    let source = input::resolve_source(path, stdin_override)?;
    let parsed_rows = parse::parse_source(&source.content)?;
    let known_categories = user_category_ids(&ledger.connection, &ledger.db_path, &user.user_id)?;
    let validated = validate::validate_rows(parsed_rows, &known_categories)?;

    let persisted = persist::persist_batch(
        &mut ledger.connection,
        &ledger.db_path,
        persist::PersistInput {
            user,
            rows: &validated.rows,
            settings,
            source_kind: source.kind,
            source_ref: source.source_ref.as_deref(),
        },
    )?;

    tracing::info!(
        user_id = %user.user_id,
        ingest_id = %persisted.ingest_id,
        source = source.kind.as_str(),
        rows_read = validated.summary.rows_read,
        inserted = persisted.inserted,
        skipped = persisted.skipped,
        "ingest committed"
    );

    Ok(IngestExecution {
        ingest_id: persisted.ingest_id,
        source_used: source.kind.as_str().to_string(),
        summary: IngestSummary {
            inserted: persisted.inserted,
            skipped: persisted.skipped,
            ..validated.summary
        },
        rows: persisted.rows,
    })
}

pub(crate) fn invalid_input_error(message: &str) -> ClientError {
    ClientError::invalid_argument_with_recovery(
        message,
        vec![
            "Provide a JSON array of transaction objects or CSV with headers.".to_string(),
            "Run `tallyo ingest --help` to confirm field requirements.".to_string(),
        ],
    )
    .with_ingest_help()
}

fn user_category_ids(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
) -> ClientResult<HashSet<String>> {
    let mut statement = connection
        .prepare("SELECT category_id FROM categories WHERE user_id = ?1")
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let ids = statement
        .query_map([user_id], |row| row.get::<_, String>(0))
        .map_err(|error| map_sqlite_error(db_path, &error))?
        .collect::<Result<HashSet<String>, _>>()
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(ids)
}
