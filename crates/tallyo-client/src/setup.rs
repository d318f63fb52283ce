use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use crate::migrations::{EXPECTED_USER_VERSION, REQUIRED_INDEX_NAMES, REQUIRED_META_KEYS, run_pending};
use crate::state::{LedgerPaths, ensure_ledger_directory, map_sqlite_error, open_connection};
use crate::{ClientError, ClientResult};

const REQUIRED_CORE_TABLES: [(&str, &[&str]); 6] = [
    ("internal_meta", &["key", "value"]),
    ("users", &["user_id", "name", "created_at"]),
    (
        "api_tokens",
        &["token_id", "user_id", "token_hash", "label", "created_at", "revoked_at"],
    ),
    ("categories", &["category_id", "user_id", "name", "created_at"]),
    (
        "ingest_runs",
        &[
            "ingest_id",
            "user_id",
            "created_at",
            "rows_read",
            "inserted",
            "skipped",
            "source_kind",
            "source_ref",
        ],
    ),
    (
        "transactions",
        &[
            "txn_id",
            "user_id",
            "ingest_id",
            "external_id",
            "vendor",
            "display_vendor",
            "amount",
            "posted_at",
            "reviewed",
            "category_id",
            "notes",
            "created_at",
            "reviewed_at",
        ],
    ),
];

/// An opened, migrated and verified ledger.
pub struct Ledger {
    pub db_path: PathBuf,
    pub connection: Connection,
    pub schema_version: String,
}

pub fn open_ledger(home_override: Option<&Path>) -> ClientResult<Ledger> {
    let paths = LedgerPaths::resolve(home_override)?;
    ensure_ledger_directory(&paths.home)?;

    let mut connection = open_connection(&paths.db_path)?;
    run_pending(&mut connection).map_err(|error| map_migration_error(&paths.db_path, &error))?;

    verify_core_tables(&connection, &paths.db_path)?;
    verify_schema_objects(&connection, &paths.db_path)?;
    let schema_version = read_meta(&connection, &paths.db_path, "schema_version")?
        .unwrap_or_else(|| "v1".to_string());

    tracing::debug!(db_path = %paths.db_path.display(), %schema_version, "ledger ready");

    Ok(Ledger {
        db_path: paths.db_path,
        connection,
        schema_version,
    })
}

fn map_migration_error(db_path: &Path, error: &rusqlite_migration::Error) -> ClientError {
    if let rusqlite_migration::Error::RusqliteError { query: _, err } = error {
        let mapped = map_sqlite_error(db_path, err);
        if matches!(
            mapped.code.as_str(),
            "ledger_locked" | "ledger_corrupt" | "ledger_init_permission_denied"
        ) {
            return mapped;
        }
    }
    ClientError::migration_failed(db_path, &error.to_string())
}

fn verify_core_tables(connection: &Connection, db_path: &Path) -> ClientResult<()> {
    for (table_name, required_columns) in REQUIRED_CORE_TABLES {
        if !sqlite_object_exists(connection, "table", table_name, db_path)? {
            return Err(ClientError::ledger_corrupt(db_path));
        }

        let columns = table_columns(connection, table_name, db_path)?;
        let missing_column = required_columns
            .iter()
            .any(|required| !columns.iter().any(|column| column == required));
        if missing_column {
            return Err(ClientError::ledger_corrupt(db_path));
        }
    }

    Ok(())
}

fn verify_schema_objects(connection: &Connection, db_path: &Path) -> ClientResult<()> {
    let user_version = connection
        .query_row("PRAGMA user_version", [], |row| row.get::<_, i64>(0))
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    if user_version != EXPECTED_USER_VERSION {
        return Err(ClientError::ledger_corrupt(db_path));
    }

    for (meta_key, expected_value) in REQUIRED_META_KEYS {
        match read_meta(connection, db_path, meta_key)? {
            Some(actual) if actual == expected_value => {}
            _ => return Err(ClientError::ledger_corrupt(db_path)),
        }
    }

    for index_name in REQUIRED_INDEX_NAMES {
        if !sqlite_object_exists(connection, "index", index_name, db_path)? {
            return Err(ClientError::ledger_corrupt(db_path));
        }
    }

    Ok(())
}

fn read_meta(connection: &Connection, db_path: &Path, key: &str) -> ClientResult<Option<String>> {
    connection
        .query_row(
            "SELECT value FROM internal_meta WHERE key = ?1 LIMIT 1",
            [key],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}

fn sqlite_object_exists(
    connection: &Connection,
    object_type: &str,
    object_name: &str,
    db_path: &Path,
) -> ClientResult<bool> {
    let found = connection
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type = ?1 AND name = ?2 LIMIT 1",
            params![object_type, object_name],
            |_row| Ok(()),
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(found.is_some())
}

fn table_columns(
    connection: &Connection,
    table_name: &str,
    db_path: &Path,
) -> ClientResult<Vec<String>> {
    if !REQUIRED_CORE_TABLES
        .iter()
        .any(|(required_name, _)| *required_name == table_name)
    {
        return Err(ClientError::ledger_init_failed(
            db_path,
            "Refused PRAGMA table inspection for non-core table.",
        ));
    }

    // `table_name` comes from REQUIRED_CORE_TABLES, never from user input.
    let sql = format!("PRAGMA table_info({table_name})");
    let mut statement = connection
        .prepare(&sql)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    let column_iter = statement
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    column_iter
        .map(|column| column.map_err(|error| map_sqlite_error(db_path, &error)))
        .collect()
}
