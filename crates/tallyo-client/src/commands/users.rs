use std::path::Path;

use rusqlite::{TransactionBehavior, params};
use ulid::Ulid;

use crate::ClientResult;
use crate::auth::{issue_token, revoke_token as revoke_authenticated_token};
use crate::commands::common::{open_for_user, require_non_empty};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::{TokenRevokeData, UserCreateData};
use crate::setup::open_ledger;
use crate::state::{map_sqlite_error, now_timestamp};

#[derive(Debug, Default)]
pub struct UserCreateOptions<'a> {
    pub name: String,
    pub token_label: Option<String>,
    pub home_override: Option<&'a Path>,
}

#[derive(Debug, Default)]
pub struct TokenRevokeOptions<'a> {
    pub token: Option<String>,
    pub home_override: Option<&'a Path>,
}

pub fn create(name: &str) -> ClientResult<SuccessEnvelope> {
    create_with_options(UserCreateOptions {
        name: name.to_string(),
        token_label: None,
        home_override: None,
    })
}

/// Creates a user and issues its first bearer token.
///
/// The token secret appears only in this response; the ledger keeps its hash.
#[doc(hidden)]
pub fn create_with_options(options: UserCreateOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let name = require_non_empty(&options.name, "User name", "user create")?;
    let mut ledger = open_ledger(options.home_override)?;
    let db_path = ledger.db_path.clone();
    let user_id = format!("usr_{}", Ulid::new());
    let created_at = now_timestamp();

    let transaction = ledger
        .connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|error| map_sqlite_error(&db_path, &error))?;
    transaction
        .execute(
            "INSERT INTO users (user_id, name, created_at) VALUES (?1, ?2, ?3)",
            params![&user_id, &name, &created_at],
        )
        .map_err(|error| map_sqlite_error(&db_path, &error))?;
    let issued = issue_token(
        &transaction,
        &db_path,
        &user_id,
        options.token_label.as_deref(),
    )?;
    transaction
        .commit()
        .map_err(|error| map_sqlite_error(&db_path, &error))?;

    tracing::info!(%user_id, token_id = %issued.token_id, "user created");

    success(
        "user create",
        UserCreateData {
            user_id,
            name,
            token_id: issued.token_id,
            token: issued.secret,
            created_at,
        },
    )
}

pub fn revoke_token(token: Option<&str>) -> ClientResult<SuccessEnvelope> {
    revoke_token_with_options(TokenRevokeOptions {
        token: token.map(str::to_string),
        home_override: None,
    })
}

/// Revokes the token used to authenticate this call.
#[doc(hidden)]
pub fn revoke_token_with_options(options: TokenRevokeOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let (ledger, user) = open_for_user(options.home_override, options.token.as_deref())?;
    let revoked_at = revoke_authenticated_token(&ledger.connection, &ledger.db_path, &user)?;
    tracing::info!(user_id = %user.user_id, token_id = %user.token_id, "token revoked");

    success(
        "token revoke",
        TokenRevokeData {
            token_id: user.token_id,
            user_id: user.user_id,
            revoked_at,
        },
    )
}
