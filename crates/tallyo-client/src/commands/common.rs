use std::path::Path;

use chrono::NaiveDate;

use crate::auth::{AuthenticatedUser, authenticate};
use crate::setup::{Ledger, open_ledger};
use crate::{ClientError, ClientResult};

/// Opens the ledger and authenticates the bearer token against it.
pub(crate) fn open_for_user(
    home_override: Option<&Path>,
    token: Option<&str>,
) -> ClientResult<(Ledger, AuthenticatedUser)> {
    let ledger = open_ledger(home_override)?;
    let user = authenticate(&ledger.connection, &ledger.db_path, token)?;
    Ok((ledger, user))
}

/// Validates an optional `YYYY-MM-DD` filter argument.
pub(crate) fn parse_date_filter(
    value: Option<&str>,
    flag: &str,
    command: &str,
) -> ClientResult<Option<String>> {
    let Some(raw) = value.map(str::trim) else {
        return Ok(None);
    };
    if raw.len() != 10 || NaiveDate::parse_from_str(raw, "%Y-%m-%d").is_err() {
        return Err(ClientError::invalid_argument_for_command(
            &format!("`{flag}` must be a date in YYYY-MM-DD form; got \"{raw}\"."),
            Some(command),
        ));
    }
    Ok(Some(raw.to_string()))
}

pub(crate) fn require_non_empty(value: &str, field: &str, command: &str) -> ClientResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ClientError::invalid_argument_for_command(
            &format!("{field} must not be empty."),
            Some(command),
        ));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::{parse_date_filter, require_non_empty};

    #[test]
    fn date_filters_accept_iso_dates_only() {
        assert_eq!(
            parse_date_filter(Some("2026-03-01"), "--from", "report categories").ok(),
            Some(Some("2026-03-01".to_string()))
        );
        assert_eq!(parse_date_filter(None, "--from", "report categories").ok(), Some(None));
        let bad = parse_date_filter(Some("2026-3-1"), "--to", "report categories");
        assert!(matches!(bad, Err(ref error) if error.code == "invalid_argument"));
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(require_non_empty("  ", "name", "category add").is_err());
        assert_eq!(require_non_empty(" Food ", "name", "category add").ok().as_deref(), Some("Food"));
    }
}
