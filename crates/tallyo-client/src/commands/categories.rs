use std::path::Path;

use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use ulid::Ulid;

use crate::commands::common::{open_for_user, require_non_empty};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{CategoryAddData, CategoryListData, CategoryRow};
use crate::state::{map_sqlite_error, now_timestamp};
use crate::{ClientError, ClientResult};

#[derive(Debug, Default)]
pub struct CategoryAddOptions<'a> {
    pub name: String,
    pub token: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct CategoryListOptions<'a> {
    pub token: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn add(name: &str, token: Option<&str>) -> ClientResult<SuccessEnvelope> {
    add_with_options(CategoryAddOptions {
        name: name.to_string(),
        token: token.map(str::to_string),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn add_with_options(options: CategoryAddOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let name = require_non_empty(&options.name, "Category name", "category add")?;
    let (ledger, user) = open_for_user(options.home_override, options.token.as_deref())?;

    let category = CategoryRow {
        category_id: format!("cat_{}", Ulid::new()),
        name,
        created_at: now_timestamp(),
    };
    ledger
        .connection
        .execute(
            "INSERT INTO categories (category_id, user_id, name, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &category.category_id,
                &user.user_id,
                &category.name,
                &category.created_at
            ],
        )
        .map_err(|error| {
            if error.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
                ClientError::category_already_exists(&category.name)
            } else {
                map_sqlite_error(&ledger.db_path, &error)
            }
        })?;

    success("category add", CategoryAddData { category })
}

pub fn list(token: Option<&str>) -> ClientResult<SuccessEnvelope> {
    list_with_options(CategoryListOptions {
        token: token.map(str::to_string),
        home_override: None,
    })
}

#[doc(hidden)]
pub fn list_with_options(options: CategoryListOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let (ledger, user) = open_for_user(options.home_override, options.token.as_deref())?;
    let mut statement = ledger
        .connection
        .prepare(
            "SELECT category_id, name, created_at
             FROM categories
             WHERE user_id = ?1
             ORDER BY name ASC, category_id ASC",
        )
        .map_err(|error| map_sqlite_error(&ledger.db_path, &error))?;
    let rows_iter = statement
        .query_map([&user.user_id], |row| {
            Ok(CategoryRow {
                category_id: row.get(0)?,
                name: row.get(1)?,
                created_at: row.get(2)?,
            })
        })
        .map_err(|error| map_sqlite_error(&ledger.db_path, &error))?;

    let mut rows = Vec::new();
    for row in rows_iter {
        rows.push(row.map_err(|error| map_sqlite_error(&ledger.db_path, &error))?);
    }

    success("category list", CategoryListData { rows })
}

pub(crate) fn category_name(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
    category_id: &str,
) -> ClientResult<Option<String>> {
    connection
        .query_row(
            "SELECT name FROM categories WHERE user_id = ?1 AND category_id = ?2",
            params![user_id, category_id],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))
}
