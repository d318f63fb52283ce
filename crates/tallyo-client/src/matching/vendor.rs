use std::path::Path;

use rusqlite::Connection;

use super::lookup::{first_exact_match, prefix_matches, upper_prefix};
use super::scorer::{MatchOptions, search};
use super::MatchSettings;
use crate::ClientResult;

/// Which step of resolution produced the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    ExactMatch,
    TooShort,
    NoPrefixCandidates,
    FuzzyMatch,
    NoFuzzyMatch,
}

impl ResolutionSource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExactMatch => "exact_match",
            Self::TooShort => "too_short",
            Self::NoPrefixCandidates => "no_prefix_candidates",
            Self::FuzzyMatch => "fuzzy_match",
            Self::NoFuzzyMatch => "no_fuzzy_match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorResolution {
    pub display_vendor: String,
    pub source: ResolutionSource,
}

impl VendorResolution {
    fn unchanged(vendor: &str, source: ResolutionSource) -> Self {
        Self {
            display_vendor: vendor.to_string(),
            source,
        }
    }
}

/// Resolves the display name for `vendor` from the user's prior transactions.
///
/// An exact (case-sensitive) vendor match wins. Otherwise vendors at least
/// `settings.prefix_len` characters long are fuzzy matched against prior
/// transactions sharing their uppercased prefix. Every miss falls back to the
/// raw vendor.
pub fn resolve_vendor(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
    vendor: &str,
    settings: &MatchSettings,
) -> ClientResult<VendorResolution> {
    if let Some(exact) = first_exact_match(connection, db_path, user_id, vendor)? {
        tracing::debug!(user_id, vendor, "display vendor from exact match");
        return Ok(VendorResolution {
            display_vendor: exact.display_name().to_string(),
            source: ResolutionSource::ExactMatch,
        });
    }

    if vendor.chars().count() < settings.prefix_len {
        return Ok(VendorResolution::unchanged(vendor, ResolutionSource::TooShort));
    }

    let prefix = upper_prefix(vendor, settings.prefix_len);
    let candidates = prefix_matches(connection, db_path, user_id, &prefix, settings.prefix_len)?;
    if candidates.is_empty() {
        return Ok(VendorResolution::unchanged(
            vendor,
            ResolutionSource::NoPrefixCandidates,
        ));
    }

    let options = MatchOptions {
        threshold: settings.display_threshold,
    };
    let ranked = search(vendor, &candidates, |candidate| candidate.vendor.as_str(), &options);
    match ranked.first() {
        Some(best) => {
            tracing::debug!(
                user_id,
                vendor,
                matched = %best.item.vendor,
                score = best.score,
                candidates = candidates.len(),
                "display vendor from fuzzy match"
            );
            Ok(VendorResolution {
                display_vendor: best.item.display_name().to_string(),
                source: ResolutionSource::FuzzyMatch,
            })
        }
        None => Ok(VendorResolution::unchanged(vendor, ResolutionSource::NoFuzzyMatch)),
    }
}

/// Display-name-only form of [`resolve_vendor`].
pub fn resolve_display_vendor(
    connection: &Connection,
    db_path: &Path,
    user_id: &str,
    vendor: &str,
    settings: &MatchSettings,
) -> ClientResult<String> {
    resolve_vendor(connection, db_path, user_id, vendor, settings)
        .map(|resolution| resolution.display_vendor)
}
