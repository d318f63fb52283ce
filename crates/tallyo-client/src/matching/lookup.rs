use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Params, Row, params};

use super::VendorCandidate;
use crate::ClientResult;
use crate::state::map_sqlite_error;

// Candidates come back in insertion order (`rowid`) so "first match" is stable.

pub(super) fn first_exact_match(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
    vendor: &str,
) -> ClientResult<Option<VendorCandidate>> {
    connection
        .query_row(
            "SELECT vendor, display_vendor, category_id
             FROM transactions
             WHERE user_id = ?1
               AND vendor = ?2
             ORDER BY rowid ASC
             LIMIT 1",
            params![user_id, vendor],
            candidate_from_row,
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

pub(super) fn first_reviewed_exact_match(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
    vendor: &str,
) -> ClientResult<Option<VendorCandidate>> {
    connection
        .query_row(
            "SELECT vendor, display_vendor, category_id
             FROM transactions
             WHERE user_id = ?1
               AND vendor = ?2
               AND reviewed = 1
             ORDER BY rowid ASC
             LIMIT 1",
            params![user_id, vendor],
            candidate_from_row,
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

/// Uppercases the first `len` characters of `value` with Unicode rules.
pub(super) fn upper_prefix(value: &str, len: usize) -> String {
    value.chars().take(len).flat_map(char::to_uppercase).collect()
}

/// Transactions whose first `prefix_len` characters uppercase to `prefix`.
///
/// SQLite's `UPPER` only folds ASCII, so the comparison runs here over the
/// user's vendors.
pub(super) fn prefix_matches(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
    prefix: &str,
    prefix_len: usize,
) -> ClientResult<Vec<VendorCandidate>> {
    let candidates = collect_candidates(
        connection,
        db_path,
        "SELECT vendor, display_vendor, category_id
         FROM transactions
         WHERE user_id = ?1
         ORDER BY rowid ASC",
        params![user_id],
    )?;
    Ok(candidates
        .into_iter()
        .filter(|candidate| upper_prefix(&candidate.vendor, prefix_len) == prefix)
        .collect())
}

pub(super) fn reviewed_candidates(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
) -> ClientResult<Vec<VendorCandidate>> {
    collect_candidates(
        connection,
        db_path,
        "SELECT vendor, display_vendor, category_id
         FROM transactions
         WHERE user_id = ?1
           AND reviewed = 1
         ORDER BY rowid ASC",
        params![user_id],
    )
}

fn collect_candidates<P: Params>(
    connection: &Connection,
    db_path: &Path,
    sql: &str,
    query_params: P,
) -> ClientResult<Vec<VendorCandidate>> {
    let mut statement = connection
        .prepare(sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let rows = statement
        .query_map(query_params, candidate_from_row)
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let mut candidates = Vec::new();
    for row in rows {
        candidates.push(row.map_err(|error| map_sqlite_error(db_path, &error))?);
    }
    Ok(candidates)
}

fn candidate_from_row(row: &Row<'_>) -> rusqlite::Result<VendorCandidate> {
    Ok(VendorCandidate {
        vendor: row.get(0)?,
        display_vendor: row.get(1)?,
        category_id: row.get(2)?,
    })
}
