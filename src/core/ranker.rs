use crate::models::ScoredCandidate;

/// Score, sort, and truncate a candidate set.
///
/// Sort is descending by score and stable, so ties keep their original
/// input order. Ranks are 1-based over the truncated result. The limit is
/// validated at the request boundary before this runs.
pub fn rank_candidates<T, F>(candidates: Vec<T>, score_fn: F, limit: usize) -> Vec<ScoredCandidate<T>>
where
    F: Fn(&T) -> f64,
{
    let mut scored: Vec<(T, f64)> = candidates
        .into_iter()
        .map(|candidate| {
            let score = score_fn(&candidate);
            (candidate, score)
        })
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);

    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (candidate, score))| ScoredCandidate {
            candidate,
            score,
            rank: (idx + 1) as u32,
        })
        .collect()
}
