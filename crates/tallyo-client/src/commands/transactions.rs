use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::commands::categories::category_name;
use crate::commands::common::{open_for_user, require_non_empty};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{TransactionListData, TransactionReviewData, TransactionRow};
use crate::state::{map_sqlite_error, now_timestamp};
use crate::{ClientError, ClientResult};

const DEFAULT_LIST_LIMIT: i64 = 100;

const TRANSACTION_COLUMNS: &str = "t.txn_id, t.external_id, t.vendor, t.display_vendor, t.amount,
     t.posted_at, t.reviewed, t.category_id, c.name, t.notes";

#[derive(Debug, Default)]
pub struct TransactionListOptions<'a> {
    pub unreviewed_only: bool,
    pub limit: Option<i64>,
    pub token: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TransactionReviewOptions<'a> {
    pub txn_id: String,
    pub category_id: Option<String>,
    pub display_vendor: Option<String>,
    pub token: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn list(unreviewed_only: bool, token: Option<&str>) -> ClientResult<SuccessEnvelope> {
    list_with_options(TransactionListOptions {
        unreviewed_only,
        limit: None,
        token: token.map(str::to_string),
        home_override: None,
    })
}

/// Lists the caller's transactions, newest posting date first.
#[doc(hidden)]
pub fn list_with_options(options: TransactionListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let limit = options.limit.unwrap_or(DEFAULT_LIST_LIMIT);
    if limit <= 0 {
        return Err(ClientError::invalid_argument_for_command(
            "`--limit` must be a positive integer.",
            Some("txn list"),
        ));
    }

    let (ledger, user) = open_for_user(options.home_override, options.token.as_deref())?;
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS}
         FROM transactions t
         LEFT JOIN categories c ON c.category_id = t.category_id
         WHERE t.user_id = ?1
           AND (?2 = 0 OR t.reviewed = 0)
         ORDER BY t.posted_at DESC, t.rowid DESC
         LIMIT ?3"
    );
    let mut statement = ledger
        .connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(&ledger.db_path, &error))?;
    let rows_iter = statement
        .query_map(
            params![&user.user_id, options.unreviewed_only, limit],
            transaction_from_row,
        )
        .map_err(|error| map_sqlite_error(&ledger.db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(&ledger.db_path, &error))?);
    }

    success(
        "txn list",
        TransactionListData {
            unreviewed_only: options.unreviewed_only,
            returned: rows.len() as i64,
            rows,
        },
    )
}

pub fn review(
    txn_id: &str,
    category_id: Option<&str>,
    token: Option<&str>,
) -> ClientResult<SuccessEnvelope> {
    review_with_options(TransactionReviewOptions {
        txn_id: txn_id.to_string(),
        category_id: category_id.map(str::to_string),
        display_vendor: None,
        token: token.map(str::to_string),
        home_override: None,
    })
}

/// Marks a transaction reviewed, optionally setting its category and display vendor.
///
/// Reviewed transactions become the source for category inference on later ingests.
#[doc(hidden)]
pub fn review_with_options(options: TransactionReviewOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let txn_id = require_non_empty(&options.txn_id, "Transaction id", "txn review")?;
    let display_vendor = options
        .display_vendor
        .as_deref()
        .map(|value| require_non_empty(value, "Display vendor", "txn review"))
        .transpose()?;

    let (ledger, user) = open_for_user(options.home_override, options.token.as_deref())?;
    let connection = &ledger.connection;
    let db_path = ledger.db_path.as_path();

    if load_transaction(connection, db_path, &user.user_id, &txn_id)?.is_none() {
        return Err(ClientError::transaction_not_found(&txn_id));
    }
    if let Some(category_id) = options.category_id.as_deref()
        && category_name(connection, db_path, &user.user_id, category_id)?.is_none()
    {
        return Err(ClientError::category_not_found(category_id));
    }

    connection
        .execute(
            "UPDATE transactions
             SET reviewed = 1,
                 reviewed_at = ?1,
                 category_id = COALESCE(?2, category_id),
                 display_vendor = COALESCE(?3, display_vendor)
             WHERE user_id = ?4 AND txn_id = ?5",
            params![
                now_timestamp(),
                options.category_id.as_deref(),
                display_vendor.as_deref(),
                &user.user_id,
                &txn_id
            ],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    let transaction = load_transaction(connection, db_path, &user.user_id, &txn_id)?
        .ok_or_else(|| ClientError::transaction_not_found(&txn_id))?;
    tracing::info!(user_id = %user.user_id, %txn_id, "transaction reviewed");

    success("txn review", TransactionReviewData { transaction })
}

fn load_transaction(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
    txn_id: &str,
) -> ClientResult<Option<TransactionRow>> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS}
         FROM transactions t
         LEFT JOIN categories c ON c.category_id = t.category_id
         WHERE t.user_id = ?1 AND t.txn_id = ?2"
    );
    connection
        .query_row(&sql, params![user_id, txn_id], transaction_from_row)
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

fn transaction_from_row(row: &Row<'_>) -> rusqlite::Result<TransactionRow> {
    Ok(TransactionRow {
        txn_id: row.get(0)?,
        external_id: row.get(1)?,
        vendor: row.get(2)?,
        display_vendor: row.get(3)?,
        amount: row.get(4)?,
        posted_at: row.get(5)?,
        reviewed: row.get(6)?,
        category_id: row.get(7)?,
        category_name: row.get(8)?,
        notes: row.get(9)?,
    })
}
