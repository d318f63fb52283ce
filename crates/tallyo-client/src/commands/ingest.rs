use std::path::Path;

use crate::ClientResult;
use crate::commands::common::open_for_user;
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::IngestData;
use crate::ingest;
use crate::matching::MatchSettings;

#[derive(Debug, Default)]
pub struct IngestRunOptions<'a> {
    pub path: Option<String>,
    pub token: Option<String>,
    pub settings: MatchSettings,
    pub home_override: Option<&'a Path>,
    pub stdin_override: Option<String>,
}

pub fn run(path: Option<String>, token: Option<&str>) -> ClientResult<SuccessEnvelope> {
    run_with_options(IngestRunOptions {
        path,
        token: token.map(str::to_string),
        ..IngestRunOptions::default()
    })
}

#[doc(hidden)]
pub fn run_with_options(options: IngestRunOptions<'_>) -> ClientResult<SuccessEnvelope> {
    let (mut ledger, user) = open_for_user(options.home_override, options.token.as_deref())?;
    let execution = ingest::execute(
        &mut ledger,
        &user,
        options.path.as_deref(),
        options.stdin_override,
        &options.settings,
    )?;

    let message = if execution.summary.skipped > 0 {
        format!(
            "Ingest completed. {} rows inserted; {} already-ingested rows were skipped.",
            execution.summary.inserted, execution.summary.skipped
        )
    } else {
        format!(
            "Ingest completed. {} rows inserted.",
            execution.summary.inserted
        )
    };

    success(
        "ingest",
        IngestData {
            ingest_id: execution.ingest_id,
            user_id: user.user_id,
            message,
            source_used: execution.source_used,
            summary: execution.summary,
            rows: execution.rows,
        },
    )
}
