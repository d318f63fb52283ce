use std::path::Path;

use rand::Rng;
use rand::distributions::Alphanumeric;
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use ulid::Ulid;

use crate::state::{map_sqlite_error, now_timestamp};
use crate::{ClientError, ClientResult};

pub const TOKEN_PREFIX: &str = "tly_";
const TOKEN_SECRET_LEN: usize = 40;

/// The user a bearer token maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub token_id: String,
}

#[derive(Debug, Clone)]
pub(crate) struct IssuedToken {
    pub(crate) token_id: String,
    pub(crate) secret: String,
}

/// Maps a caller-supplied bearer token to a user.
///
/// Accepts either a full `Authorization` header value (`Bearer <secret>`) or the
/// bare secret. Missing, unknown and revoked tokens are all `unauthenticated`.
pub fn authenticate(
    connection: &Connection,
    db_path: &Path,
    bearer: Option<&str>,
) -> ClientResult<AuthenticatedUser> {
    let Some(secret) = bearer.and_then(extract_secret) else {
        tracing::warn!("rejected request without a bearer token");
        return Err(ClientError::unauthenticated());
    };

    let found = connection
        .query_row(
            "SELECT token_id, user_id
             FROM api_tokens
             WHERE token_hash = ?1
               AND revoked_at IS NULL
             LIMIT 1",
            [hash_secret(secret)],
            |row| {
                Ok(AuthenticatedUser {
                    token_id: row.get(0)?,
                    user_id: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    match found {
        Some(user) => {
            tracing::debug!(user_id = %user.user_id, token_id = %user.token_id, "authenticated");
            Ok(user)
        }
        None => {
            tracing::warn!("rejected unknown or revoked bearer token");
            Err(ClientError::unauthenticated())
        }
    }
}

pub(crate) fn issue_token(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
    label: Option<&str>,
) -> ClientResult<IssuedToken> {
    let token_id = format!("tok_{}", Ulid::new());
    let secret = generate_secret();
    connection
        .execute(
            "INSERT INTO api_tokens (token_id, user_id, token_hash, label, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![&token_id, user_id, hash_secret(&secret), label, now_timestamp()],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;

    Ok(IssuedToken { token_id, secret })
}

/// Marks the caller's token as revoked and returns the revocation timestamp.
pub(crate) fn revoke_token(
    connection: &Connection,
    db_path: &Path,
    user: &AuthenticatedUser,
) -> ClientResult<String> {
    let revoked_at = now_timestamp();
    connection
        .execute(
            "UPDATE api_tokens SET revoked_at = ?1 WHERE token_id = ?2 AND revoked_at IS NULL",
            params![&revoked_at, &user.token_id],
        )
        .map_err(|error| map_sqlite_error(db_path, &error))?;
    Ok(revoked_at)
}

fn extract_secret(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let secret = match trimmed.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => trimmed,
    };
    if secret.is_empty() { None } else { Some(secret) }
}

fn generate_secret() -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_SECRET_LEN)
        .map(char::from)
        .collect();
    format!("{TOKEN_PREFIX}{body}")
}

fn hash_secret(secret: &str) -> String {
    format!("{:x}", Sha256::digest(secret.as_bytes()))
}
