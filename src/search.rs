// Relevance scoring for the search suggestion dropdown. Map/list visibility
// uses plain soft_match (see filters.rs); scoring only orders suggestions.

use crate::normalize::normalize_text;
use crate::place::Place;

/// The dropdown shows at most this many suggestions. The filtered set used
/// for the map is never truncated.
pub const MAX_SUGGESTIONS: usize = 5;

/// Cumulative relevance of `place` for `query`. Zero for a blank query
/// (no ranking signal); under a non-blank query, zero means non-matching
/// and callers drop the candidate.
pub fn relevance_score(place: &Place, query: &str) -> u32 {
    if query.trim().is_empty() {
        return 0;
    }
    let nq = normalize_text(query);
    let mut score = 0;

    if place.norm_title.contains(&nq) {
        score += 10;
    }
    if !place.norm_category.is_empty() && place.norm_category.contains(&nq) {
        score += 3;
    }
    if !place.norm_region.is_empty() && place.norm_region.contains(&nq) {
        score += 2;
    }
    if !place.norm_description.is_empty() && place.norm_description.contains(&nq) {
        score += 1;
    }

    // Prefix and exact boosts on the title stack on top of the contains hit.
    if place.norm_title.starts_with(&nq) {
        score += 6;
    }
    if place.norm_title == nq {
        score += 4;
    }

    score
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suggestion {
    /// Index into the full place list.
    pub index: usize,
    pub score: u32,
}

/// Rank `candidates` (indices into `places`, the currently visible set, so
/// places excluded by active filter pills never appear) and keep the best
/// five: drop zero scores, sort descending with the original relative order
/// as tie-break.
pub fn rank_suggestions(places: &[Place], candidates: &[usize], query: &str) -> Vec<Suggestion> {
    if query.trim().is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<Suggestion> = candidates
        .iter()
        .filter_map(|&index| {
            let score = relevance_score(&places[index], query);
            (score > 0).then_some(Suggestion { index, score })
        })
        .collect();

    // Stable sort keeps candidate order for equal scores.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(MAX_SUGGESTIONS);
    scored
}
