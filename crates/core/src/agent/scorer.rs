//! Search result scoring.
//!
//! A candidate starts at [`BASE_SCORE`] and loses points for:
//! 1. Title edit distance to the query (the closer of title and original title)
//! 2. Its position in the remote result list
//! 3. Year distance, when both years are known; a year within one of the
//!    query earns [`YEAR_MATCH_BONUS`] instead
//!
//! The result is clamped at zero. There is no upper clamp: an exact title
//! and year at position 0 scores exactly 100.

use strsim::levenshtein;

use super::types::{Query, ScoredCandidate};
use crate::external_catalog::Candidate;

pub const BASE_SCORE: i64 = 90;
/// Deducted per position in the remote result order.
pub const POSITION_PENALTY: i64 = 5;
pub const YEAR_MATCH_BONUS: i64 = 10;
/// Deducted per year of difference beyond one.
pub const YEAR_PENALTY: i64 = 5;
/// Query years at or below this are ignored.
pub const MIN_PLAUSIBLE_YEAR: i32 = 1900;

/// Score one candidate at `position` in the remote result order.
pub fn score(candidate: &Candidate, query: &Query, position: usize) -> u32 {
    let name = query.name.to_lowercase();

    let mut distance = levenshtein(&candidate.title.to_lowercase(), &name);
    if let Some(original) = candidate
        .original_title
        .as_deref()
        .filter(|o| *o != candidate.title)
    {
        distance = distance.min(levenshtein(&original.to_lowercase(), &name));
    }

    let distance = i64::try_from(distance).unwrap_or(i64::MAX);
    let position = i64::try_from(position).unwrap_or(i64::MAX);

    let mut score = BASE_SCORE
        .saturating_sub(distance)
        .saturating_sub(POSITION_PENALTY.saturating_mul(position));

    let query_year = query.year.filter(|y| *y > MIN_PLAUSIBLE_YEAR);
    if let (Some(query_year), Some(release_year)) = (query_year, candidate.year) {
        let year_diff = (i64::from(query_year) - i64::from(release_year)).abs();
        if year_diff <= 1 {
            score = score.saturating_add(YEAR_MATCH_BONUS);
        } else {
            score = score.saturating_sub(YEAR_PENALTY * year_diff);
        }
    }

    u32::try_from(score.max(0)).unwrap_or(u32::MAX)
}

/// Score candidates in the order given, using each one's index as its
/// position. Does not sort.
pub fn score_candidates(candidates: &[Candidate], query: &Query) -> Vec<ScoredCandidate> {
    candidates
        .iter()
        .enumerate()
        .map(|(position, candidate)| ScoredCandidate {
            candidate: candidate.clone(),
            score: score(candidate, query, position),
        })
        .collect()
}
