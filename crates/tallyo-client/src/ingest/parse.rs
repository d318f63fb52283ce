use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::ingest::{OPTIONAL_FIELDS, REQUIRED_FIELDS, invalid_input_error};
use crate::{ClientError, ClientResult};

/// One source row before validation. `row` is 1-based.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedRow {
    pub(crate) row: i64,
    pub(crate) external_id: Option<String>,
    pub(crate) vendor: Option<String>,
    pub(crate) amount: Option<String>,
    pub(crate) posted_at: Option<String>,
    pub(crate) category_id: Option<String>,
    pub(crate) notes: Option<String>,
}

pub(crate) fn parse_source(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(invalid_input_error("Ingest source is empty."));
    }

    if trimmed.starts_with('[') {
        return parse_json_array(trimmed);
    }

    if trimmed.starts_with('{') {
        return Err(ClientError::invalid_ingest_format(
            "JSON input must be a top-level array of transaction objects.",
            "json_non_array",
        ));
    }

    if looks_like_csv(trimmed) {
        return parse_csv(trimmed);
    }

    Err(ClientError::invalid_ingest_format(
        "Unsupported ingest format. Provide a JSON array or CSV with headers.",
        "unknown",
    ))
}

fn parse_json_array(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let parsed = serde_json::from_str::<Value>(content)
        .map_err(|_| invalid_input_error("Invalid JSON input. Provide a valid JSON array."))?;

    let Some(items) = parsed.as_array() else {
        return Err(invalid_input_error(
            "JSON input must be a top-level array of transaction objects.",
        ));
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            let object = item.as_object().ok_or_else(|| {
                invalid_input_error("JSON array entries must all be objects with transaction fields.")
            })?;
            Ok(ParsedRow {
                row: (index as i64) + 1,
                external_id: json_field(object, "external_id"),
                vendor: json_field(object, "vendor"),
                amount: json_field(object, "amount"),
                posted_at: json_field(object, "posted_at"),
                category_id: json_field(object, "category_id"),
                notes: json_field(object, "notes"),
            })
        })
        .collect()
}

fn parse_csv(content: &str) -> ClientResult<Vec<ParsedRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let headers = reader
        .headers()
        .map_err(|_| invalid_input_error("CSV header row is missing or unreadable."))?
        .iter()
        .map(|value| value.trim().to_string())
        .collect::<Vec<String>>();

    if !headers_are_valid(&headers) {
        return Err(ClientError::ingest_schema_mismatch(expected_headers(), headers));
    }

    let index_by_name = headers
        .iter()
        .enumerate()
        .map(|(index, name)| (name.as_str(), index))
        .collect::<HashMap<&str, usize>>();
    let field = |record: &csv::StringRecord, name: &str| {
        index_by_name
            .get(name)
            .and_then(|index| record.get(*index))
            .map(str::to_string)
    };

    let mut rows = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record =
            record.map_err(|_| invalid_input_error("CSV rows are malformed or not UTF-8."))?;
        rows.push(ParsedRow {
            row: (row_index as i64) + 1,
            external_id: field(&record, "external_id"),
            vendor: field(&record, "vendor"),
            amount: field(&record, "amount"),
            posted_at: field(&record, "posted_at"),
            category_id: field(&record, "category_id"),
            notes: field(&record, "notes"),
        });
    }

    Ok(rows)
}

fn json_field(object: &Map<String, Value>, name: &str) -> Option<String> {
    match object.get(name)? {
        Value::Null => None,
        Value::String(value) => Some(value.clone()),
        other => Some(other.to_string()),
    }
}

fn looks_like_csv(content: &str) -> bool {
    content
        .lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|first_line| first_line.contains(','))
}

fn headers_are_valid(actual_headers: &[String]) -> bool {
    let all_required_present = REQUIRED_FIELDS
        .iter()
        .all(|required| actual_headers.iter().any(|header| header == required));
    let all_known = actual_headers.iter().all(|header| {
        REQUIRED_FIELDS.contains(&header.as_str()) || OPTIONAL_FIELDS.contains(&header.as_str())
    });
    all_required_present && all_known
}

fn expected_headers() -> Vec<String> {
    REQUIRED_FIELDS
        .iter()
        .chain(OPTIONAL_FIELDS.iter())
        .map(|value| value.to_string())
        .collect()
}
