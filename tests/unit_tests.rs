// Unit tests for Roomly Algo

use roomly_algo::core::{
    from_profile, has_sufficient_preferences, listing_score, merge_preferences, rank_candidates,
    resolve_status, roommate_score, StatusInputs,
};
use roomly_algo::models::{
    BudgetValue, ListingCandidate, MergedPreferences, PreferenceDelta, PreferenceProfile,
    ProcessingStatus, RoommateCandidate,
};

fn profile(
    budget_min: Option<f64>,
    budget_max: Option<f64>,
    location: Option<&str>,
    tags: &[&str],
) -> PreferenceProfile {
    PreferenceProfile {
        user_id: "requester".to_string(),
        budget_min,
        budget_max,
        location_preference: location.map(str::to_string),
        lifestyle_tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn roommate(id: &str, budget_min: f64, budget_max: f64, tags: &[&str]) -> RoommateCandidate {
    RoommateCandidate {
        user_id: id.to_string(),
        budget_min: Some(budget_min),
        budget_max: Some(budget_max),
        location_preference: Some("CDMX".to_string()),
        lifestyle_tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

fn listing(id: i64, price: f64, amenities: &[&str]) -> ListingCandidate {
    ListingCandidate {
        id,
        price,
        location: Some("CDMX".to_string()),
        amenities: amenities.iter().map(|t| t.to_string()).collect(),
        available_from: None,
        available_to: None,
    }
}

#[test]
fn test_merge_empty_delta_is_idempotent() {
    let stored = profile(Some(1000.0), Some(2000.0), Some("CDMX"), &["gym", "quiet"]);
    let merged = merge_preferences(&stored, &PreferenceDelta::default());

    assert_eq!(merged, from_profile(&stored));
    assert_eq!(merged.budget_min, Some(BudgetValue::Int(1000)));
    assert_eq!(merged.budget_max, Some(BudgetValue::Int(2000)));
    assert_eq!(merged.location_preference, Some("CDMX".to_string()));
    assert_eq!(merged.lifestyle_tags, vec!["gym", "quiet"]);
}

#[test]
fn test_tag_merge_is_set_union() {
    let stored = profile(None, None, None, &["quiet", "gym", "gym"]);
    let delta = PreferenceDelta {
        lifestyle_tags: Some(vec![
            " gym ".to_string(),
            "pets".to_string(),
            "".to_string(),
        ]),
        ..Default::default()
    };

    let merged = merge_preferences(&stored, &delta);
    assert_eq!(merged.lifestyle_tags, vec!["gym", "pets", "quiet"]);
}

#[test]
fn test_sufficiency_monotonic_under_additive_deltas() {
    let stored = profile(Some(1000.0), None, Some("CDMX"), &[]);
    assert!(has_sufficient_preferences(&from_profile(&stored)));

    let additive_deltas = vec![
        PreferenceDelta::default(),
        PreferenceDelta {
            budget_max: Some(BudgetValue::Int(2200)),
            ..Default::default()
        },
        PreferenceDelta {
            lifestyle_tags: Some(vec!["gym".to_string()]),
            ..Default::default()
        },
        PreferenceDelta {
            budget_min: Some(BudgetValue::Int(900)),
            budget_max: Some(BudgetValue::Int(1800)),
            location_preference: Some("Monterrey".to_string()),
            lifestyle_tags: Some(vec!["pets".to_string()]),
            ..Default::default()
        },
    ];

    for delta in additive_deltas {
        assert!(
            has_sufficient_preferences(&merge_preferences(&stored, &delta)),
            "additive delta broke sufficiency: {:?}",
            delta
        );
    }
}

#[test]
fn test_status_table_is_complete() {
    // (extraction_success, merged_sufficient, had_existing) -> expected,
    // with translation_ok = true
    let cases = [
        (true, true, true, ProcessingStatus::Success),
        (true, true, false, ProcessingStatus::Success),
        (true, false, true, ProcessingStatus::InsufficientData),
        (true, false, false, ProcessingStatus::InsufficientData),
        (false, true, true, ProcessingStatus::FallbackToExisting),
        (false, false, true, ProcessingStatus::InsufficientData),
        (false, true, false, ProcessingStatus::Failed),
        (false, false, false, ProcessingStatus::Failed),
    ];

    for (extraction_success, merged_sufficient, had_existing, expected) in cases {
        let outcome = resolve_status(
            StatusInputs {
                translation_ok: true,
                extraction_success,
                merged_sufficient,
                had_existing_preferences: had_existing,
            },
            None,
        );
        assert_eq!(
            outcome.status, expected,
            "extraction={} sufficient={} existing={}",
            extraction_success, merged_sufficient, had_existing
        );
    }
}

#[test]
fn test_status_partial_only_differs_on_translation() {
    for extraction_success in [true, false] {
        for merged_sufficient in [true, false] {
            for had_existing in [true, false] {
                let ok = resolve_status(
                    StatusInputs {
                        translation_ok: true,
                        extraction_success,
                        merged_sufficient,
                        had_existing_preferences: had_existing,
                    },
                    None,
                );
                let failed = resolve_status(
                    StatusInputs {
                        translation_ok: false,
                        extraction_success,
                        merged_sufficient,
                        had_existing_preferences: had_existing,
                    },
                    None,
                );

                if ok.status == ProcessingStatus::Success {
                    assert_eq!(failed.status, ProcessingStatus::Partial);
                } else {
                    // Translation only matters on the success path
                    assert_eq!(ok.status, failed.status);
                }
            }
        }
    }
}

#[test]
fn test_roommate_score_worked_example() {
    let merged = from_profile(&profile(
        Some(1000.0),
        Some(2000.0),
        Some("CDMX"),
        &["gym", "quiet"],
    ));
    let candidate = roommate("r1", 1200.0, 1800.0, &["gym", "pets"]);

    assert_eq!(roommate_score(&merged, &candidate), 0.667);
}

#[test]
fn test_listing_score_worked_example() {
    let merged = from_profile(&profile(Some(1000.0), Some(2000.0), Some("CDMX"), &["gym"]));
    let candidate = listing(1, 1400.0, &["gym", "pool"]);

    assert_eq!(listing_score(&merged, &candidate), 0.815);
}

#[test]
fn test_zero_average_candidate_budget_is_not_a_division_error() {
    let merged = from_profile(&profile(Some(1000.0), Some(1500.0), None, &["gym"]));
    let candidate = roommate("r1", 0.0, 0.0, &["reading"]);

    assert_eq!(roommate_score(&merged, &candidate), 0.0);
}

#[test]
fn test_scoring_is_bit_for_bit_reproducible() {
    let merged = from_profile(&profile(
        Some(950.0),
        Some(1850.0),
        Some("CDMX"),
        &["gym", "quiet", "vegan"],
    ));
    let rm = roommate("r1", 1100.0, 1600.0, &["vegan", "music"]);
    let ls = listing(9, 1333.0, &["gym", "terrace"]);

    let baseline = (roommate_score(&merged, &rm), listing_score(&merged, &ls));
    for _ in 0..100 {
        assert_eq!(
            (roommate_score(&merged, &rm), listing_score(&merged, &ls)),
            baseline
        );
    }
}

#[test]
fn test_rank_orders_and_truncates() {
    let merged = from_profile(&profile(
        Some(1000.0),
        Some(2000.0),
        Some("CDMX"),
        &["gym", "quiet"],
    ));

    let candidates = vec![
        roommate("far", 4000.0, 6000.0, &[]),
        roommate("close", 1200.0, 1800.0, &["gym", "quiet"]),
        roommate("mid", 1000.0, 2000.0, &["gym"]),
    ];

    let ranked = rank_candidates(candidates, |c| roommate_score(&merged, c), 2);

    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].candidate.user_id, "close");
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].candidate.user_id, "mid");
    assert_eq!(ranked[1].rank, 2);
    assert!(ranked[0].score >= ranked[1].score);
}

#[test]
fn test_rank_tie_break_keeps_input_order() {
    let merged = from_profile(&profile(Some(1000.0), Some(2000.0), None, &["gym"]));

    // Identical candidates score identically; input order must survive
    let candidates = vec![
        roommate("first", 1500.0, 1500.0, &["gym"]),
        roommate("second", 1500.0, 1500.0, &["gym"]),
        roommate("third", 1500.0, 1500.0, &["gym"]),
    ];

    let ranked = rank_candidates(candidates, |c| roommate_score(&merged, c), 10);
    let ids: Vec<&str> = ranked.iter().map(|s| s.candidate.user_id.as_str()).collect();
    assert_eq!(ids, vec!["first", "second", "third"]);
}

#[test]
fn test_fallback_ranking_uses_stored_profile_unchanged() {
    // Extraction failed: the merged set degrades to the stored profile and
    // ranking proceeds against it.
    let stored = profile(Some(1000.0), Some(2000.0), Some("CDMX"), &["gym"]);
    let merged = merge_preferences(&stored, &PreferenceDelta::default());

    let outcome = resolve_status(
        StatusInputs {
            translation_ok: true,
            extraction_success: false,
            merged_sufficient: has_sufficient_preferences(&merged),
            had_existing_preferences: !stored.is_empty(),
        },
        Some("AI service unavailable, using existing preferences"),
    );

    assert_eq!(outcome.status, ProcessingStatus::FallbackToExisting);
    assert_eq!(
        outcome.fallback_reason.as_deref(),
        Some("AI service unavailable, using existing preferences")
    );

    let ranked = rank_candidates(
        vec![roommate("r1", 1200.0, 1800.0, &["gym"])],
        |c| roommate_score(&merged, c),
        5,
    );
    assert_eq!(ranked.len(), 1);
    assert!(ranked[0].score > 0.5);
}

#[test]
fn test_text_budget_keeps_signal_but_scores_defined() {
    // A budget that failed integer coercion still counts for sufficiency;
    // scoring reads it numerically when possible.
    let merged = MergedPreferences {
        budget_min: Some(BudgetValue::Text("1000.50".to_string())),
        budget_max: Some(BudgetValue::Text("roughly two thousand".to_string())),
        location_preference: Some("CDMX".to_string()),
        lifestyle_tags: vec!["gym".to_string()],
    };

    assert!(has_sufficient_preferences(&merged));
    assert_eq!(merged.budget_avg(), Some(1000.50));

    // budget_max is unusable as a price denominator: price component is 0
    let score = listing_score(&merged, &listing(1, 1000.0, &["gym"]));
    assert_eq!(score, 0.3);
}
