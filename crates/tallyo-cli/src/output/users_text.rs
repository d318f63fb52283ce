use std::io;

use serde_json::Value;

use super::format::{self, Align, Column, get_str};

pub fn render_user_create(data: &Value) -> io::Result<String> {
    let data = data
        .as_object()
        .ok_or_else(|| io::Error::other("user create output requires an object"))?;

    let mut lines = vec!["User created.".to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("User ID:", get_str(data, "user_id")),
            ("Name:", get_str(data, "name")),
            ("Token ID:", get_str(data, "token_id")),
            ("Created:", format::format_timestamp(&get_str(data, "created_at"))),
        ],
        2,
    ));
    lines.push(String::new());
    lines.push("Bearer token (shown once, store it now):".to_string());
    lines.push(format!("  {}", get_str(data, "token")));
    lines.push(String::new());
    lines.push("Next:".to_string());
    lines.push("  export TALLYO_TOKEN=<token>".to_string());
    lines.push("  tallyo category add <name>".to_string());
    Ok(lines.join("\n"))
}

pub fn render_token_revoke(data: &Value) -> io::Result<String> {
    let data = data
        .as_object()
        .ok_or_else(|| io::Error::other("token revoke output requires an object"))?;

    let mut lines = vec!["Token revoked.".to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("Token ID:", get_str(data, "token_id")),
            ("Revoked:", format::format_timestamp(&get_str(data, "revoked_at"))),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_category_add(data: &Value) -> io::Result<String> {
    let category = data
        .get("category")
        .and_then(Value::as_object)
        .ok_or_else(|| io::Error::other("category add output requires category"))?;

    let mut lines = vec!["Category added.".to_string(), String::new()];
    lines.extend(format::key_value_rows(
        &[
            ("ID:", get_str(category, "category_id")),
            ("Name:", get_str(category, "name")),
        ],
        2,
    ));
    Ok(lines.join("\n"))
}

pub fn render_category_list(data: &Value) -> io::Result<String> {
    let rows = format::rows_of(data);
    if rows.is_empty() {
        return Ok("No categories yet.\n\nAdd one with `tallyo category add <name>`.".to_string());
    }

    let columns = [
        Column {
            name: "ID",
            align: Align::Left,
        },
        Column {
            name: "Name",
            align: Align::Left,
        },
    ];
    let table_rows = rows
        .iter()
        .map(|row| vec![get_str(row, "category_id"), get_str(row, "name")])
        .collect::<Vec<_>>();

    let mut lines = vec![format!("Categories ({}):", rows.len()), String::new()];
    lines.extend(format::render_table(&columns, &table_rows));
    Ok(lines.join("\n"))
}
