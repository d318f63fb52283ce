use std::path::Path;

use rusqlite::{Connection, TransactionBehavior, params};
use ulid::Ulid;

use crate::ClientResult;
use crate::auth::AuthenticatedUser;
use crate::contracts::types::IngestedRow;
use crate::ingest::input::SourceKind;
use crate::ingest::validate::IngestRow;
use crate::matching::{CategoryInference, MatchSettings, infer_category_detailed, resolve_vendor};
use crate::state::{map_sqlite_error, now_timestamp};

#[derive(Debug, Clone)]
pub(crate) struct PersistResult {
    pub(crate) ingest_id: String,
    pub(crate) inserted: i64,
    pub(crate) skipped: i64,
    pub(crate) rows: Vec<IngestedRow>,
}

pub(crate) struct PersistInput<'a> {
    pub(crate) user: &'a AuthenticatedUser,
    pub(crate) rows: &'a [IngestRow],
    pub(crate) settings: &'a MatchSettings,
    pub(crate) source_kind: SourceKind,
    pub(crate) source_ref: Option<&'a str>,
}

/// Writes a validated batch and its ingest run in one immediate transaction.
///
/// Rows are resolved and inserted one at a time, so each row sees the rows
/// inserted before it as match candidates. A row whose `external_id` already
/// exists for the user is skipped.
pub(crate) fn persist_batch(
    connection: &mut Connection,
    db_path: &Path,
    input: PersistInput<'_>,
) -> ClientResult<PersistResult> {
    let ingest_id = format!("ing_{}", Ulid::new());
    let timestamp = now_timestamp();
    let user_id = input.user.user_id.as_str();

    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    transaction
        .execute(
            "INSERT INTO ingest_runs (
                ingest_id,
                user_id,
                created_at,
                rows_read,
                inserted,
                skipped,
                source_kind,
                source_ref
             ) VALUES (?1, ?2, ?3, ?4, 0, 0, ?5, ?6)",
            params![
                &ingest_id,
                user_id,
                &timestamp,
                input.rows.len() as i64,
                input.source_kind.as_str(),
                input.source_ref
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut inserted = 0_i64;
    let mut rows = Vec::with_capacity(input.rows.len());
    for row in input.rows {
        let resolution = resolve_vendor(&transaction, db_path, user_id, &row.vendor, input.settings)?;
        let (category_id, category_source) = match &row.category_id {
            Some(category_id) => (Some(category_id.clone()), "provided"),
            None => {
                let inference =
                    infer_category_detailed(&transaction, db_path, &row.vendor, user_id, input.settings)?;
                let source = match inference {
                    CategoryInference::ExactReviewed { .. } => "exact_reviewed",
                    CategoryInference::FuzzyReviewed { .. } => "fuzzy_reviewed",
                    CategoryInference::NoInference => "none",
                };
                (inference.into_category_id(), source)
            }
        };

        let txn_id = format!("txn_{}", Ulid::new());
        let changed = transaction
            .execute(
                "INSERT INTO transactions (
                    txn_id,
                    user_id,
                    ingest_id,
                    external_id,
                    vendor,
                    display_vendor,
                    amount,
                    posted_at,
                    category_id,
                    notes,
                    created_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                 ON CONFLICT (user_id, external_id) DO NOTHING",
                params![
                    &txn_id,
                    user_id,
                    &ingest_id,
                    &row.external_id,
                    &row.vendor,
                    &resolution.display_vendor,
                    row.amount,
                    &row.posted_at,
                    &category_id,
                    &row.notes,
                    &timestamp
                ],
            )
            .map_err(|error| map_sqlite_error(db_path, &error))?;

        let (status, txn_id) = if changed == 1 {
            inserted += 1;
            ("inserted", Some(txn_id))
        } else {
            tracing::debug!(user_id, external_id = %row.external_id, "skipped existing transaction");
            ("skipped", None)
        };

        rows.push(IngestedRow {
            row: row.row,
            status: status.to_string(),
            txn_id,
            external_id: row.external_id.clone(),
            vendor: row.vendor.clone(),
            display_vendor: resolution.display_vendor,
            category_id,
            category_source: category_source.to_string(),
        });
    }

    let skipped = input.rows.len() as i64 - inserted;
    transaction
        .execute(
            "UPDATE ingest_runs SET inserted = ?1, skipped = ?2 WHERE ingest_id = ?3",
            params![inserted, skipped, &ingest_id],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    transaction
        .commit()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(PersistResult {
        ingest_id,
        inserted,
        skipped,
        rows,
    })
}
