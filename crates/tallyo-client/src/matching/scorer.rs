//! Approximate string matching over keyed candidates.
//!
//! Scores are distances in `[0, 1]`: `0.0` is an exact match after
//! normalization, `1.0` shares nothing. Ranking is ascending by score and
//! stable, so equally scored candidates keep their input order.

use strsim::normalized_levenshtein;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchOptions {
    /// Highest score still reported as a match.
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch<'a, T> {
    pub item: &'a T,
    pub index: usize,
    pub score: f64,
}

pub fn search<'a, T, F>(
    query: &str,
    candidates: &'a [T],
    key: F,
    options: &MatchOptions,
) -> Vec<ScoredMatch<'a, T>>
where
    F: Fn(&T) -> &str,
{
    let normalized_query = normalize(query);
    if normalized_query.is_empty() {
        return Vec::new();
    }
    let sorted_query = sorted_tokens(&normalized_query);

    let mut matches = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            let score = distance(&normalized_query, &sorted_query, key(item));
            (score <= options.threshold).then_some(ScoredMatch { item, index, score })
        })
        .collect::<Vec<_>>();

    matches.sort_by(|left, right| left.score.total_cmp(&right.score));
    matches
}

/// Distance between a raw string pair, using the same normalization as [`search`].
pub fn score(query: &str, candidate: &str) -> f64 {
    let normalized_query = normalize(query);
    if normalized_query.is_empty() {
        return 1.0;
    }
    distance(&normalized_query, &sorted_tokens(&normalized_query), candidate)
}

fn distance(normalized_query: &str, sorted_query: &str, candidate: &str) -> f64 {
    let normalized_candidate = normalize(candidate);
    if normalized_candidate.is_empty() {
        return 1.0;
    }

    let whole = normalized_levenshtein(normalized_query, &normalized_candidate);
    let by_token = normalized_levenshtein(sorted_query, &sorted_tokens(&normalized_candidate));
    1.0 - whole.max(by_token)
}

/// Uppercases alphanumerics with Unicode rules and collapses every run of other
/// characters into one space.
fn normalize(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut pending_space = false;
    for character in value.chars() {
        if character.is_alphanumeric() {
            if pending_space && !output.is_empty() {
                output.push(' ');
            }
            pending_space = false;
            output.extend(character.to_uppercase());
        } else {
            pending_space = true;
        }
    }
    output
}

fn sorted_tokens(normalized: &str) -> String {
    let mut tokens = normalized.split(' ').collect::<Vec<_>>();
    tokens.sort_unstable();
    tokens.join(" ")
}
