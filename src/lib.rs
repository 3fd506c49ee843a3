//! Roomly Algo - AI-assisted matching service for the Roomly housing app
//!
//! This library provides the preference-driven ranking engine used by the
//! Roomly app, together with the free-text enrichment pipeline (language
//! detection, preference extraction, merge, status classification, and
//! diagnostic localization) that can refine a requester's preferences
//! before scoring.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    has_sufficient_preferences, listing_score, merge_preferences, rank_candidates, roommate_score,
};
pub use crate::models::{
    EnrichmentDiagnostics, ListingCandidate, MergedPreferences, PreferenceDelta,
    PreferenceProfile, ProcessingStatus, RankMatchesRequest, RankMatchesResponse,
    RoommateCandidate, ScoredCandidate,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let profile = PreferenceProfile {
            user_id: "u1".to_string(),
            budget_min: Some(1000.0),
            location_preference: Some("CDMX".to_string()),
            ..Default::default()
        };
        let merged = merge_preferences(&profile, &PreferenceDelta::default());
        assert!(has_sufficient_preferences(&merged));
    }
}
