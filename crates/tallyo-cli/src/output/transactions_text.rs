use std::io;

use serde_json::{Map, Value};

use super::format::{self, Align, Column, get_i64, get_str, str_or_dash};

pub fn render_transaction_list(data: &Value) -> io::Result<String> {
    let unreviewed_only = data
        .get("unreviewed_only")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let rows = format::rows_of(data);
    if rows.is_empty() {
        let message = if unreviewed_only {
            "Nothing left to review."
        } else {
            "No transactions yet.\n\nIngest some with `tallyo ingest <path>`."
        };
        return Ok(message.to_string());
    }

    let columns = [
        Column {
            name: "Txn ID",
            align: Align::Left,
        },
        Column {
            name: "Posted",
            align: Align::Left,
        },
        Column {
            name: "Vendor",
            align: Align::Left,
        },
        Column {
            name: "Amount",
            align: Align::Right,
        },
        Column {
            name: "Category",
            align: Align::Left,
        },
        Column {
            name: "Reviewed",
            align: Align::Left,
        },
    ];
    let table_rows = rows
        .iter()
        .map(|row| {
            vec![
                get_str(row, "txn_id"),
                get_str(row, "posted_at"),
                shown_vendor(row),
                format::format_amount(get_i64(row, "amount")),
                str_or_dash(row, "category_name"),
                yes_no(row.get("reviewed").and_then(Value::as_bool).unwrap_or(false)),
            ]
        })
        .collect::<Vec<_>>();

    let heading = if unreviewed_only {
        format!("Unreviewed transactions ({}):", rows.len())
    } else {
        format!("Transactions ({}):", rows.len())
    };
    let mut lines = vec![heading, String::new()];
    lines.extend(format::render_table(&columns, &table_rows));
    Ok(lines.join("\n"))
}

pub fn render_transaction_review(data: &Value) -> io::Result<String> {
    let transaction = data
        .get("transaction")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("txn review output requires transaction"))?;

    let mut lines = vec!["Transaction reviewed.".to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Txn ID:", get_str(transaction, "txn_id")),
            ("Vendor:", get_str(transaction, "vendor")),
            ("Display vendor:", str_or_dash(transaction, "display_vendor")),
            (
                "Amount:",
                format::format_amount(get_i64(transaction, "amount")),
            ),
            ("Category:", str_or_dash(transaction, "category_name")),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("Later ingests of similar vendors will reuse this category.".to_string());
    Ok(lines.join("\n"))
}

pub fn render_vendor_resolve(data: &Value) -> io::Result<String> {
    let data = data
        .as_object()
        .ok_or_else(|| io::Error::other("vendor resolve output requires an object"))?;

    let mut lines = vec!["Vendor resolution preview.".to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Vendor:", get_str(data, "vendor")),
            ("Display vendor:", get_str(data, "display_vendor")),
            ("Resolution:", get_str(data, "resolution")),
            ("Category:", str_or_dash(data, "category_name")),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("Nothing was written.".to_string());
    Ok(lines.join("\n"))
}

fn shown_vendor(row: &Map<String, Value>) -> String {
    match row.get("display_vendor").and_then(Value::as_str) {
        Some(display) if !display.is_empty() => display.to_string(),
        _ => get_str(row, "vendor"),
    }
}

fn yes_no(value: bool) -> String {
    let label = if value { "yes" } else { "no" };
    label.to_string()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{render_transaction_list, render_vendor_resolve};

    #[test]
    fn list_prefers_display_vendor_and_formats_amounts() {
        let rendered = render_transaction_list(&json!({
            "unreviewed_only": false,
            "returned": 1,
            "rows": [{
                "txn_id": "txn_1", "external_id": "a", "vendor": "SBUX 1", "display_vendor": "Starbucks",
                "amount": -450, "posted_at": "2026-02-01", "reviewed": true,
                "category_id": "cat_1", "category_name": "Coffee", "notes": null
            }]
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.starts_with("Transactions (1):"));
            assert!(text.contains("Starbucks"));
            assert!(!text.contains("SBUX 1"));
            assert!(text.contains("-4.50"));
            assert!(text.contains("Coffee"));
        }
    }

    #[test]
    fn empty_unreviewed_list_says_nothing_to_review() {
        let rendered = render_transaction_list(&json!({"unreviewed_only": true, "returned": 0, "rows": []}));
        assert!(matches!(rendered.as_deref(), Ok("Nothing left to review.")));
    }

    #[test]
    fn vendor_resolve_shows_resolution_kind() {
        let rendered = render_vendor_resolve(&json!({
            "vendor": "ABC",
            "display_vendor": "ABC",
            "resolution": "too_short",
            "category_id": null,
            "category_name": null
        }));
        assert!(rendered.is_ok());
        if let Ok(text) = rendered {
            assert!(text.contains("too_short"));
            assert!(text.contains("Category:        -"));
        }
    }
}
