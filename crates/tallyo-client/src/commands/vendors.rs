use std::path::Path;

use crate::ClientResult;
use crate::commands::categories::category_name;
use crate::commands::common::{open_for_user, require_non_empty};
use crate::contracts::envelope::{SuccessEnvelope, success};
use crate::contracts::types::VendorResolveData;
use crate::matching::{MatchSettings, infer_category, resolve_vendor};

#[derive(Debug, Default)]
pub struct VendorResolveOptions<'a> {
    pub vendor: String,
    pub token: Option<String>,
    pub settings: MatchSettings,
    pub home_override: Option<&'a Path>,
}

pub fn resolve(vendor: &str, token: Option<&str>) -> ClientResult<SuccessEnvelope> {
    resolve_with_options(VendorResolveOptions {
        vendor: vendor.to_string(),
        token: token.map(str::to_string),
        ..VendorResolveOptions::default()
    })
}

/// Previews what ingesting `vendor` would assign, without writing anything.
#[doc(hidden)]
pub fn resolve_with_options(options: VendorResolveOptions<'_>) -> ClientResult<SuccessEnvelope> {
    // Trimmed like ingested vendors.
    let vendor = require_non_empty(&options.vendor, "Vendor", "vendor resolve")?;

    let (ledger, user) = open_for_user(options.home_override, options.token.as_deref())?;
    let connection = &ledger.connection;
    let db_path = ledger.db_path.as_path();

    let resolution = resolve_vendor(connection, db_path, &user.user_id, &vendor, &options.settings)?;
    let category_id = infer_category(connection, db_path, &vendor, &user.user_id, &options.settings)?;
    let category_name = match category_id.as_deref() {
        Some(id) => category_name(connection, db_path, &user.user_id, id)?,
        None => None,
    };

    success(
        "vendor resolve",
        VendorResolveData {
            vendor,
            display_vendor: resolution.display_vendor,
            resolution: resolution.source.as_str().to_string(),
            category_id,
            category_name,
        },
    )
}
