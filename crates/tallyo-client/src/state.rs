use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, Error as SqliteError, ffi::ErrorCode};

use crate::{ClientError, ClientResult};

pub const HOME_ENV_VAR: &str = "TALLYO_HOME";
const DEFAULT_HOME_DIR: &str = ".tallyo";
const LEDGER_FILE_NAME: &str = "tallyo.db";
const BUSY_TIMEOUT: Duration = Duration::from_millis(250);

/// Where the ledger lives on disk.
#[derive(Debug, Clone)]
pub struct LedgerPaths {
    pub home: PathBuf,
    pub db_path: PathBuf,
}

impl LedgerPaths {
    pub fn resolve(home_override: Option<&Path>) -> ClientResult<Self> {
        let home = resolve_ledger_home(home_override)?;
        let db_path = home.join(LEDGER_FILE_NAME);
        Ok(Self { home, db_path })
    }
}

fn resolve_ledger_home(home_override: Option<&Path>) -> ClientResult<PathBuf> {
    let candidate = if let Some(path) = home_override {
        path.to_path_buf()
    } else if let Some(from_env) = std::env::var_os(HOME_ENV_VAR) {
        PathBuf::from(from_env)
    } else {
        let Some(user_home) = home::home_dir() else {
            return Err(ClientError::ledger_init_failed(
                Path::new("."),
                "Could not resolve a home directory for the Tallyo ledger.",
            ));
        };
        user_home.join(DEFAULT_HOME_DIR)
    };

    if candidate.is_absolute() {
        return Ok(candidate);
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(&candidate))
        .map_err(|error| ClientError::ledger_init_failed(&candidate, &error.to_string()))
}

pub fn ensure_ledger_directory(path: &Path) -> ClientResult<()> {
    fs::create_dir_all(path).map_err(|error| map_io_error(path, &error))?;
    restrict_permissions(path);
    Ok(())
}

pub fn open_connection(db_path: &Path) -> ClientResult<Connection> {
    let connection =
        Connection::open(db_path).map_err(|error| map_sqlite_error(db_path, &error))?;
    connection
        .busy_timeout(BUSY_TIMEOUT)
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(connection)
}

pub fn map_io_error(path: &Path, error: &std::io::Error) -> ClientError {
    match error.kind() {
        std::io::ErrorKind::PermissionDenied => {
            ClientError::ledger_init_permission_denied(path, &error.to_string())
        }
        _ => ClientError::ledger_init_failed(path, &error.to_string()),
    }
}

pub fn map_sqlite_error(path: &Path, error: &SqliteError) -> ClientError {
    match error.sqlite_error_code() {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
            ClientError::ledger_locked(path)
        }
        Some(ErrorCode::NotADatabase) => ClientError::ledger_corrupt(path),
        Some(ErrorCode::CannotOpen | ErrorCode::ReadOnly) => {
            ClientError::ledger_init_permission_denied(path, &error.to_string())
        }
        _ => ClientError::ledger_init_failed(path, &error.to_string()),
    }
}

/// Unix seconds, stored as text like every other ledger timestamp.
pub(crate) fn now_timestamp() -> String {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(duration) => duration.as_secs().to_string(),
        Err(_) => "0".to_string(),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    // Best effort: the ledger still works if the filesystem refuses chmod.
    let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o700));
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}
