use std::path::Path;

use rusqlite::params;

use crate::commands::common::{open_for_user, parse_date_filter};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{CategoryReportData, CategoryReportRow};
use crate::state::map_sqlite_error;
use crate::{ClientError, ClientResult};

const REPORT_COMMAND: &str = "report categories";

#[derive(Debug, Default)]
pub struct CategoryReportOptions<'a> {
    pub from: Option<String>,
    pub to: Option<String>,
    pub token: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn categories(
    from: Option<&str>,
    to: Option<&str>,
    token: Option<&str>,
) -> ClientResult<SuccessEnvelope> {
    categories_with_options(CategoryReportOptions {
        from: from.map(str::to_string),
        to: to.map(str::to_string),
        token: token.map(str::to_string),
        home_override: None,
    })
}

/// Spend per category for the caller, over an inclusive posting-date range.
///
/// Uncategorized transactions are grouped under a row with no category id.
#[doc(hidden)]
pub fn categories_with_options(options: CategoryReportOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let from = parse_date_filter(options.from.as_deref(), "--from", REPORT_COMMAND)?;
    let to = parse_date_filter(options.to.as_deref(), "--to", REPORT_COMMAND)?;
    if let (Some(start), Some(end)) = (from.as_deref(), to.as_deref())
        && start > end
    {
        return Err(ClientError::invalid_argument_for_command(
            "`--from` must not be after `--to`.",
            Some(REPORT_COMMAND),
        ));
    }

    let (ledger, user) = open_for_user(options.home_override, options.token.as_deref())?;
    let mut statement = ledger
        .connection
        .prepare(
            "SELECT
                t.category_id,
                c.name,
                COUNT(*) AS txn_count,
                COALESCE(SUM(t.amount), 0) AS total_amount
             FROM transactions t
             LEFT JOIN categories c ON c.category_id = t.category_id
             WHERE t.user_id = ?1
               AND (?2 IS NULL OR t.posted_at >= ?2)
               AND (?3 IS NULL OR t.posted_at <= ?3)
             GROUP BY t.category_id, c.name
             ORDER BY total_amount ASC, c.name ASC",
        )
        .map_err(|error| map_report_error(&ledger.db_path, &error))?;
    let rows_iter = statement
        .query_map(params![&user.user_id, &from, &to], |row| {
            Ok(CategoryReportRow {
                category_id: row.get(0)?,
                category_name: row.get(1)?,
                txn_count: row.get(2)?,
                total_amount: row.get(3)?,
            })
        })
        .map_err(|error| map_report_error(&ledger.db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_report_error(&ledger.db_path, &error))?);
    }

    let txn_count = rows.iter().map(|row| row.txn_count).sum();
    let total_amount = rows
        .iter()
        .try_fold(0_i64, |total, row| total.checked_add(row.total_amount))
        .ok_or_else(|| ClientError::amount_overflow(REPORT_COMMAND))?;

    success(
        REPORT_COMMAND,
        CategoryReportData {
            from,
            to,
            txn_count,
            total_amount,
            rows,
        },
    )
}

/// SQLite's `SUM` raises "integer overflow" once a single category leaves the i64 range.
fn map_report_error(db_path: &Path, error: &rusqlite::Error) -> ClientError {
    if error.to_string().contains("integer overflow") {
        return ClientError::amount_overflow(REPORT_COMMAND);
    }
    map_sqlite_error(db_path, error)
}
