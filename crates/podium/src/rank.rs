//! Ranking by championship points.

use podium_data::EventResult;
use std::cmp::Reverse;

/// Keep the `n` results with the most championship points.
///
/// The sort is stable, so tied results keep their input order. Fewer than
/// `n` results are returned unchanged apart from ordering.
pub fn top_n(mut results: Vec<EventResult>, n: usize) -> Vec<EventResult> {
    results.sort_by_key(|r| Reverse(r.points_champ));
    results.truncate(n);
    results
}
