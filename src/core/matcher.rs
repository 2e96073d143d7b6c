//! Approximate text matching for product search.
//!
//! Queries and candidates are compared after [`normalize`] (accents stripped,
//! lower-cased). A candidate matches when it contains the whole query, or when
//! any query word is similar enough to any candidate word according to
//! [`similarity_ratio`]. There is no index and no ranking; every call is
//! stateless.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Similarity ratio a word pair must reach to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.65;

/// Strips diacritics, lower-cases and trims `text`.
///
/// `"Samsúng "` and `"samsung"` normalize to the same string.
#[must_use]
pub fn normalize(text: &str) -> String {
    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped.trim().to_lowercase()
}

/// Ratio of matching characters between two strings, in `[0, 1]`.
///
/// Computed as `2 * M / (len(a) + len(b))`, where `M` is the total length of
/// the matching blocks found by repeatedly taking the longest common run of
/// characters and recursing on the pieces to its left and right. Two empty
/// strings are identical (ratio 1.0).
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    // Cast safety: character counts of search terms are far below 2^52
    #[allow(clippy::cast_precision_loss)]
    let ratio = (2 * matching_chars(&a, &b)) as f64 / total as f64;
    ratio
}

/// Returns true when `candidate` approximately matches `query`.
///
/// - An empty query or candidate (after normalization) never matches.
/// - A candidate containing the whole normalized query matches without
///   computing any similarity.
/// - Otherwise some query word and some candidate word must have a
///   [`similarity_ratio`] of at least `threshold`.
#[must_use]
pub fn fuzzy_match(query: &str, candidate: &str, threshold: f64) -> bool {
    let query = normalize(query);
    let candidate = normalize(candidate);

    if query.is_empty() || candidate.is_empty() {
        return false;
    }

    if candidate.contains(&query) {
        return true;
    }

    query.split_whitespace().any(|q| {
        candidate
            .split_whitespace()
            .any(|c| similarity_ratio(q, c) >= threshold)
    })
}

/// Total size of all matching blocks between `a` and `b`.
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    total
}

/// Longest common run in `a[alo..ahi]` and `b[blo..bhi]` as `(i, j, len)`.
///
/// Ties go to the run starting earliest in `a`, then earliest in `b`.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_len) = (alo, blo, 0);
    let width = bhi - blo + 1;
    // run[j - blo + 1] = length of the common run ending at (i, j)
    let mut prev = vec![0_usize; width];

    for i in alo..ahi {
        let mut run = vec![0_usize; width];
        for j in blo..bhi {
            if a[i] == b[j] {
                let len = prev[j - blo] + 1;
                run[j - blo + 1] = len;
                if len > best_len {
                    best_i = i + 1 - len;
                    best_j = j + 1 - len;
                    best_len = len;
                }
            }
        }
        prev = run;
    }

    (best_i, best_j, best_len)
}
