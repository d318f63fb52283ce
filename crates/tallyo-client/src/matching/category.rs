use std::path::Path;

use rusqlite::Connection;

use super::lookup::{first_reviewed_exact_match, reviewed_candidates};
use super::scorer::{MatchOptions, search};
use super::MatchSettings;
use crate::ClientResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryInference {
    /// A reviewed transaction with the identical vendor. Its category may be empty.
    ExactReviewed { category_id: Option<String> },
    FuzzyReviewed {
        category_id: Option<String>,
        matched_vendor: String,
    },
    NoInference,
}

impl CategoryInference {
    pub fn category_id(&self) -> Option<&str> {
        match self {
            Self::ExactReviewed { category_id } | Self::FuzzyReviewed { category_id, .. } => {
                category_id.as_deref()
            }
            Self::NoInference => None,
        }
    }

    pub fn into_category_id(self) -> Option<String> {
        match self {
            Self::ExactReviewed { category_id } | Self::FuzzyReviewed { category_id, .. } => {
                category_id
            }
            Self::NoInference => None,
        }
    }
}

pub fn infer_category_detailed(
    connection: &Connection,
    db_path: &Path,
    vendor: &str,
    user_id: &str,
    settings: &MatchSettings,
) -> ClientResult<CategoryInference> {
    if let Some(exact) = first_reviewed_exact_match(connection, db_path, user_id, vendor)? {
        return Ok(CategoryInference::ExactReviewed {
            category_id: exact.category_id,
        });
    }

    let reviewed = reviewed_candidates(connection, db_path, user_id)?;
    let options = MatchOptions {
        threshold: settings.category_threshold,
    };
    let ranked = search(vendor, &reviewed, |candidate| candidate.vendor.as_str(), &options);
    let Some(best) = ranked.first() else {
        tracing::debug!(user_id, vendor, reviewed = reviewed.len(), "no category inferred");
        return Ok(CategoryInference::NoInference);
    };

    tracing::debug!(
        user_id,
        vendor,
        matched = %best.item.vendor,
        score = best.score,
        "category from fuzzy reviewed match"
    );
    Ok(CategoryInference::FuzzyReviewed {
        category_id: best.item.category_id.clone(),
        matched_vendor: best.item.vendor.clone(),
    })
}

/// Infers a category for `vendor` from the user's reviewed transactions.
pub fn infer_category(
    connection: &Connection,
    db_path: &Path,
    vendor: &str,
    user_id: &str,
    settings: &MatchSettings,
) -> ClientResult<Option<String>> {
    infer_category_detailed(connection, db_path, vendor, user_id, settings)
        .map(CategoryInference::into_category_id)
}
