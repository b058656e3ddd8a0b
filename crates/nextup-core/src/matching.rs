//! Title scoring used to pick the right hit out of catalog search results.
//!
//! Scores fall in fixed bands so an exact title always outranks a decorated
//! one, which in turn outranks any substring match:
//!
//! ```text
//! 1.0        exact (case-insensitive)
//! 0.85-0.95  exact after stripping year/region tags, less stripping scores higher
//! 0.6-0.8    candidate contains the query, shorter candidates score higher
//! 0.6        query contains the candidate
//! 0.2-0.4    raw substring either way
//! 0.0        no overlap
//! ```

use regex::Regex;
use std::sync::OnceLock;

const NORMALIZED_EXACT: f64 = 0.95;
const MAX_NORMALIZATION_PENALTY: f64 = 0.1;

fn decoration_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"(?i)\(\s*(?:\d{4}|uk|us|american|british|original|reboot|remake)\s*\)").ok()
        })
        .as_ref()
}

/// Lower-cased title with year/region parentheticals removed and whitespace
/// collapsed.
pub fn normalize_title(title: &str) -> String {
    let stripped = match decoration_pattern() {
        Some(pattern) => pattern.replace_all(title, " ").into_owned(),
        None => title.to_string(),
    };
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Confidence in `[0, 1]` that `candidate` is the title being searched for.
pub fn score(search: &str, candidate: &str) -> f64 {
    let raw_search = search.trim().to_lowercase();
    let raw_candidate = candidate.trim().to_lowercase();
    if raw_search.is_empty() || raw_candidate.is_empty() {
        return 0.0;
    }

    if raw_search == raw_candidate {
        return 1.0;
    }

    let norm_search = normalize_title(search);
    let norm_candidate = normalize_title(candidate);

    if !norm_search.is_empty() && norm_search == norm_candidate {
        let raw_total = char_len(&raw_search) + char_len(&raw_candidate);
        let removed = raw_total.saturating_sub(char_len(&norm_search) * 2);
        let penalty = MAX_NORMALIZATION_PENALTY * removed as f64 / raw_total as f64;
        return NORMALIZED_EXACT - penalty.min(MAX_NORMALIZATION_PENALTY);
    }

    if !norm_search.is_empty() && !norm_candidate.is_empty() {
        if norm_candidate.contains(&norm_search) {
            let excess = char_len(&norm_candidate) - char_len(&norm_search);
            let ratio = excess as f64 / char_len(&norm_candidate) as f64;
            return 0.8 - 0.2 * ratio;
        }
        if norm_search.contains(&norm_candidate) {
            return 0.6;
        }
    }

    if raw_candidate.contains(&raw_search) || raw_search.contains(&raw_candidate) {
        let (a, b) = (char_len(&raw_search), char_len(&raw_candidate));
        let diff = a.abs_diff(b) as f64 / a.max(b) as f64;
        return 0.4 - 0.2 * diff;
    }

    0.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch<T> {
    pub item: T,
    pub score: f64,
}

/// Every item scored against `query`, best first. Equal scores keep their
/// original order.
pub fn rank<T, F>(query: &str, items: Vec<T>, title_of: F) -> Vec<ScoredMatch<T>>
where
    F: Fn(&T) -> &str,
{
    let mut scored: Vec<ScoredMatch<T>> = items
        .into_iter()
        .map(|item| {
            let score = score(query, title_of(&item));
            ScoredMatch { item, score }
        })
        .collect();
    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored
}

/// The best scoring item, if it reaches `threshold`.
pub fn best_match<T, F>(query: &str, items: Vec<T>, title_of: F, threshold: f64) -> Option<ScoredMatch<T>>
where
    F: Fn(&T) -> &str,
{
    rank(query, items, title_of)
        .into_iter()
        .next()
        .filter(|m| m.score >= threshold)
}
