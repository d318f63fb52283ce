use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, get_i64, get_str, str_or_dash};

pub fn render_ingest(data: &Value) -> io::Result<String> {
    let summary = data
        .get("summary")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("ingest output requires summary"))?;
    let ingest_id = data
        .get("ingest_id")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let source = data
        .get("source_used")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    let mut lines = vec!["Ingest completed.".to_string(), String::new()];
    lines.push("Summary:".to_string());
    lines.extend(format::key_value_rows(
        &[
            ("Ingest ID:", ingest_id.to_string()),
            ("Source:", source.to_string()),
            ("Rows read:", get_i64(summary, "rows_read").to_string()),
            ("Inserted:", get_i64(summary, "inserted").to_string()),
            ("Skipped:", get_i64(summary, "skipped").to_string()),
        ],
        2,
    ));

    let rows = format::rows_of(data);
    if !rows.is_empty() {
        let columns = [
            Column {
                name: "Row",
                align: Align::Right,
            },
            Column {
                name: "Status",
                align: Align::Left,
            },
            Column {
                name: "External ID",
                align: Align::Left,
            },
            Column {
                name: "Display vendor",
                align: Align::Left,
            },
            Column {
                name: "Category",
                align: Align::Left,
            },
        ];
        let table_rows = rows
            .iter()
            .map(|row| {
                vec![
                    get_i64(row, "row").to_string(),
                    get_str(row, "status"),
                    get_str(row, "external_id"),
                    get_str(row, "display_vendor"),
                    category_cell(row),
                ]
            })
            .collect::<Vec<_>>();
        lines.push(String::new());
        lines.push("Rows:".to_string());
        lines.extend(format::render_table(&columns, &table_rows));
    }

    if get_i64(summary, "skipped") > 0 {
        lines.push(String::new());
        lines.push("Skipped rows reuse an external_id you already ingested.".to_string());
    }
    Ok(lines.join("\n"))
}

fn category_cell(row: &serde_json::Map<String, Value>) -> String {
    let category = str_or_dash(row, "category_id");
    match row.get("category_source").and_then(Value::as_str) {
        Some("exact_reviewed") | Some("fuzzy_reviewed") => {
            format!("{category} (inferred)")
        }
        _ => category,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_ingest;

    #[test]
    fn renders_summary_rows_and_inferred_categories() {
        let rendered = render_ingest(&json!({
            "ingest_id": "ing_1",
            "source_used": "stdin",
            "summary": {"rows_read": 2, "rows_valid": 2, "rows_invalid": 0, "inserted": 1, "skipped": 1},
            "rows": [
                {"row": 1, "status": "inserted", "txn_id": "txn_1", "external_id": "a", "vendor": "SBUX 1",
                 "display_vendor": "Starbucks", "category_id": "cat_1", "category_source": "fuzzy_reviewed"},
                {"row": 2, "status": "skipped", "external_id": "b", "vendor": "SBUX 2",
                 "display_vendor": "Starbucks", "category_id": null, "category_source": "none"}
            ]
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("Ingest ID:  ing_1"));
            assert!(text.contains("cat_1 (inferred)"));
            assert!(text.contains("Skipped rows reuse an external_id"));
        }
    }

    #[test]
    fn missing_summary_is_an_error() {
        assert!(render_ingest(&json!({"rows": []})).is_err());
    }
}
