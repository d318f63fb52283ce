mod error_text;
mod format;
mod ingest_text;
mod json;
mod mode;
mod report_text;
mod transactions_text;
mod users_text;

use std::io;

use tallyo_client::{ClientError, SuccessEnvelope};

use crate::stdout_io::write_stdout_line;

pub use mode::{OutputMode, mode_for_command};

pub fn print_success(success: &SuccessEnvelope, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Text => render_text_success(success)?,
        OutputMode::Json => json::render_success_json(success)?,
    };
    write_stdout_line(&body)
}

pub fn print_failure(error: &ClientError, mode: OutputMode) -> io::Result<()> {
    let body = match mode {
        OutputMode::Json => json::render_error_json(error)?,
        OutputMode::Text => error_text::render_error(error),
    };
    write_stdout_line(&body)
}

fn render_text_success(success: &SuccessEnvelope) -> io::Result<String> {
    let data = &success.data;
    match success.command.as_str() {
        "user create" => users_text::render_user_create(data),
        "token revoke" => users_text::render_token_revoke(data),
        "category add" => users_text::render_category_add(data),
        "category list" => users_text::render_category_list(data),
        "ingest" => ingest_text::render_ingest(data),
        "txn list" => transactions_text::render_transaction_list(data),
        "txn review" => transactions_text::render_transaction_review(data),
        "vendor resolve" => transactions_text::render_vendor_resolve(data),
        "report categories" => report_text::render_category_report(data),
        _ => Err(io::Error::other(format!(
            "unsupported text output command `{}`",
            success.command
        ))),
    }
}
