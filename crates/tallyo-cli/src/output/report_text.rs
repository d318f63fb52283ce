use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, get_i64};

pub fn render_category_report(data: &Value) -> io::Result<String> {
    let range = match (
        data.get("from").and_then(Value::as_str),
        data.get("to").and_then(Value::as_str),
    ) {
        (Some(from), Some(to)) => format!("{from} to {to}"),
        (Some(from), None) => format!("since {from}"),
        (None, Some(to)) => format!("through {to}"),
        (None, None) => "all time".to_string(),
    };

    let rows = format::rows_of(data);
    let mut lines = vec![format!("Spend by category ({range}):"), String::new()];
    if rows.is_empty() {
        lines.push("  No transactions in this range.".to_string());
        return Ok(lines.join("\n"));
    }

    let columns = [
        Column {
            name: "Category",
            align: Align::Left,
        },
        Column {
            name: "Txns",
            align: Align::Right,
        },
        Column {
            name: "Total",
            align: Align::Right,
        },
    ];
    let table_rows = rows
        .iter()
        .map(|row| {
            let name = row
                .get("category_name")
                .and_then(Value::as_str)
                .unwrap_or("(uncategorized)")
                .to_string();
            vec![
                name,
                get_i64(row, "txn_count").to_string(),
                format::format_amount(get_i64(row, "total_amount")),
            ]
        })
        .collect::<Vec<_>>();
    lines.extend(format::render_table(&columns, &table_rows));

    let txn_count = data.get("txn_count").and_then(Value::as_i64).unwrap_or(0);
    let total = data.get("total_amount").and_then(Value::as_i64).unwrap_or(0);
    lines.push(String::new());
    lines.push(format!(
        "Total: {} across {txn_count} transactions",
        format::format_amount(total)
    ));
    Ok(lines.join("\n"))
}
