use serde::{Deserialize, Serialize};
use crate::models::domain::{
    EnrichmentDiagnostics, ListingCandidate, RoommateCandidate, ScoredCandidate,
};

/// Response for the rank matches endpoint.
///
/// Diagnostics are present only when enrichment was requested.
#[derive(Debug, Clone, Serialize)]
pub struct RankMatchesResponse {
    pub roommate_matches: Vec<ScoredCandidate<RoommateCandidate>>,
    pub listing_matches: Vec<ScoredCandidate<ListingCandidate>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<EnrichmentDiagnostics>,
}

impl RankMatchesResponse {
    /// Empty result set carrying only diagnostics, used when enrichment
    /// ends in a non-rankable state.
    pub fn diagnostics_only(diagnostics: EnrichmentDiagnostics) -> Self {
        Self {
            roommate_matches: vec![],
            listing_matches: vec![],
            diagnostics: Some(diagnostics),
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
