use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDate;

use crate::contracts::types::{IngestIssue, IngestSummary};
use crate::ingest::parse::ParsedRow;
use crate::{ClientError, ClientResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestRow {
    pub(crate) row: i64,
    pub(crate) external_id: String,
    pub(crate) vendor: String,
    pub(crate) amount: i64,
    pub(crate) posted_at: String,
    pub(crate) category_id: Option<String>,
    pub(crate) notes: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct ValidatedRows {
    pub(crate) rows: Vec<IngestRow>,
    pub(crate) summary: IngestSummary,
}

/// Validates every row; any issue fails the whole batch.
///
/// `known_categories` holds the category ids owned by the ingesting user.
pub(crate) fn validate_rows(
    parsed_rows: Vec<ParsedRow>,
    known_categories: &HashSet<String>,
) -> ClientResult<ValidatedRows> {
    let rows_read = parsed_rows.len() as i64;
    let mut rows = Vec::new();
    let mut issues = Vec::new();

    for raw in parsed_rows {
        let mut row_issues = Vec::new();

        let external_id = required_string(raw.row, "external_id", raw.external_id, &mut row_issues);
        let vendor = required_string(raw.row, "vendor", raw.vendor, &mut row_issues);
        let amount = validate_amount(raw.row, raw.amount, &mut row_issues);
        let posted_at = validate_posted_at(raw.row, raw.posted_at, &mut row_issues);
        let category_id =
            validate_category(raw.row, raw.category_id, known_categories, &mut row_issues);
        let notes = normalize_optional(raw.notes);

        match (external_id, vendor, amount, posted_at) {
            (Some(external_id), Some(vendor), Some(amount), Some(posted_at))
                if row_issues.is_empty() =>
            {
                rows.push(IngestRow {
                    row: raw.row,
                    external_id,
                    vendor,
                    amount,
                    posted_at,
                    category_id,
                    notes,
                });
            }
            _ => issues.extend(row_issues),
        }
    }

    let rows_invalid = issues
        .iter()
        .map(|issue| issue.row)
        .collect::<BTreeSet<i64>>()
        .len() as i64;
    let summary = IngestSummary {
        rows_read,
        rows_valid: rows.len() as i64,
        rows_invalid,
        inserted: 0,
        skipped: 0,
    };

    if !issues.is_empty() {
        return Err(ClientError::ingest_validation_failed(summary, issues));
    }

    Ok(ValidatedRows { rows, summary })
}

fn issue(row: i64, field: &str, code: &str, description: String) -> IngestIssue {
    IngestIssue {
        row,
        field: field.to_string(),
        code: code.to_string(),
        description,
    }
}

fn required_string(
    row: i64,
    field: &str,
    value: Option<String>,
    issues: &mut Vec<IngestIssue>,
) -> Option<String> {
    let normalized = normalize_optional(value);
    if normalized.is_none() {
        issues.push(issue(
            row,
            field,
            "missing_required_field",
            format!("{field} must be present and non-empty."),
        ));
    }
    normalized
}

fn validate_amount(row: i64, value: Option<String>, issues: &mut Vec<IngestIssue>) -> Option<i64> {
    let candidate = required_string(row, "amount", value, issues)?;
    match candidate.parse::<i64>() {
        Ok(amount) => Some(amount),
        Err(_) => {
            issues.push(issue(
                row,
                "amount",
                "invalid_amount",
                format!("amount must be an integer in minor units (e.g. -4215); got \"{candidate}\""),
            ));
            None
        }
    }
}

fn validate_posted_at(
    row: i64,
    value: Option<String>,
    issues: &mut Vec<IngestIssue>,
) -> Option<String> {
    let candidate = required_string(row, "posted_at", value, issues)?;
    let is_iso_date =
        candidate.len() == 10 && NaiveDate::parse_from_str(&candidate, "%Y-%m-%d").is_ok();
    if !is_iso_date {
        issues.push(issue(
            row,
            "posted_at",
            "invalid_date",
            format!("posted_at must be YYYY-MM-DD; got \"{candidate}\""),
        ));
        return None;
    }
    Some(candidate)
}

fn validate_category(
    row: i64,
    value: Option<String>,
    known_categories: &HashSet<String>,
    issues: &mut Vec<IngestIssue>,
) -> Option<String> {
    let candidate = normalize_optional(value)?;
    if !known_categories.contains(&candidate) {
        issues.push(issue(
            row,
            "category_id",
            "unknown_category",
            format!("category_id \"{candidate}\" does not name one of your categories."),
        ));
        return None;
    }
    Some(candidate)
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    let raw = value?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::validate_rows;
    use crate::ingest::parse::ParsedRow;

    fn row(index: i64, amount: &str, posted_at: &str) -> ParsedRow {
        ParsedRow {
            row: index,
            external_id: Some(format!("ext-{index}")),
            vendor: Some("  STARBUCKS #12 ".to_string()),
            amount: Some(amount.to_string()),
            posted_at: Some(posted_at.to_string()),
            ..ParsedRow::default()
        }
    }

    #[test]
    fn valid_rows_are_trimmed_and_typed() {
        let validated = validate_rows(vec![row(1, "-450", "2026-02-01")], &HashSet::new());
        assert!(validated.is_ok());
        if let Ok(validated) = validated {
            assert_eq!(validated.summary.rows_valid, 1);
            assert_eq!(validated.rows[0].vendor, "STARBUCKS #12");
            assert_eq!(validated.rows[0].amount, -450);
        }
    }

    #[test]
    fn one_bad_row_fails_the_batch_with_per_row_issues() {
        let validated = validate_rows(
            vec![
                row(1, "-450", "2026-02-01"),
                row(2, "4.50", "2026-02-30"),
                row(3, "12", "02/01/2026"),
            ],
            &HashSet::new(),
        );
        assert!(validated.is_err());
        if let Err(error) = validated {
            assert_eq!(error.code, "ingest_validation_failed");
            let data = error.data.unwrap_or_default();
            assert_eq!(data["summary"]["rows_invalid"], 2);
            assert_eq!(data["issues"].as_array().map(Vec::len), Some(3));
            assert_eq!(data["issues"][0]["code"], "invalid_amount");
        }
    }

    #[test]
    fn category_must_belong_to_the_user() {
        let known = HashSet::from(["cat_mine".to_string()]);
        let mut mine = row(1, "-100", "2026-02-01");
        mine.category_id = Some("cat_mine".to_string());
        let mut theirs = row(2, "-100", "2026-02-01");
        theirs.category_id = Some("cat_theirs".to_string());

        let validated = validate_rows(vec![mine.clone()], &known);
        assert!(matches!(
            validated,
            Ok(ref rows) if rows.rows[0].category_id.as_deref() == Some("cat_mine")
        ));

        let rejected = validate_rows(vec![mine, theirs], &known);
        assert!(matches!(
            rejected,
            Err(ref error)
                if error.data.as_ref().map(|data| data["issues"][0]["field"].clone())
                    == Some(serde_json::json!("category_id"))
        ));
    }
}
