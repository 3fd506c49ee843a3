use std::collections::HashSet;

use crate::models::{ListingCandidate, MergedPreferences, RoommateCandidate};

/// Roommate score weights: budget alignment and tag overlap count equally.
const ROOMMATE_BUDGET_WEIGHT: f64 = 0.5;
const ROOMMATE_TAG_WEIGHT: f64 = 0.5;

/// Listing score weights: price fit dominates amenity overlap.
const LISTING_PRICE_WEIGHT: f64 = 0.7;
const LISTING_AMENITY_WEIGHT: f64 = 0.3;

/// Round to 3 decimal places, the precision the clients display and
/// compare against.
pub fn round_score(score: f64) -> f64 {
    (score * 1000.0).round() / 1000.0
}

/// Jaccard similarity over two tag sets; 0 when either side is empty.
fn jaccard(left: &[String], right: &[String]) -> f64 {
    let a: HashSet<&str> = left.iter().map(|t| t.as_str()).collect();
    let b: HashSet<&str> = right.iter().map(|t| t.as_str()).collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(&b).count() as f64;
    let union = a.union(&b).count() as f64;
    intersection / union
}

/// Compatibility score for a roommate candidate in [0,1].
///
/// score = round(0.5 * budget_score + 0.5 * tag_score, 3) where
/// budget_score = 1 - |avg_r - avg_c| / max(avg_r, avg_c). A candidate
/// with no budget averages to 0 and scores 0 on the budget component.
pub fn roommate_score(prefs: &MergedPreferences, candidate: &RoommateCandidate) -> f64 {
    let tag_score = jaccard(&prefs.lifestyle_tags, &candidate.lifestyle_tags);

    let budget_score = match prefs.budget_avg() {
        Some(avg_r) => {
            let avg_c =
                (candidate.budget_min.unwrap_or(0.0) + candidate.budget_max.unwrap_or(0.0)) / 2.0;
            let denom = avg_r.max(avg_c);
            if denom <= 0.0 {
                0.0
            } else {
                1.0 - (avg_r - avg_c).abs() / denom
            }
        }
        None => 0.0,
    };

    round_score(ROOMMATE_BUDGET_WEIGHT * budget_score + ROOMMATE_TAG_WEIGHT * tag_score)
}

/// Compatibility score for a rental listing.
///
/// score = round(0.7 * price_score + 0.3 * amenity_score, 3) where
/// price_score = 1 - |avg_r - price| / budget_max_r. Without a positive
/// numeric budget_max the price component is 0. Not clamped: a price far
/// outside the requester's budget can push the component negative.
pub fn listing_score(prefs: &MergedPreferences, listing: &ListingCandidate) -> f64 {
    let amenity_score = jaccard(&prefs.lifestyle_tags, &listing.amenities);

    let price_score = match (prefs.budget_avg(), prefs.budget_max_numeric()) {
        (Some(avg_r), Some(budget_max)) if budget_max > 0.0 => {
            1.0 - (avg_r - listing.price).abs() / budget_max
        }
        _ => 0.0,
    };

    round_score(LISTING_PRICE_WEIGHT * price_score + LISTING_AMENITY_WEIGHT * amenity_score)
}
