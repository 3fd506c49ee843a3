// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BudgetValue, EnrichmentDiagnostics, FallbackMode, ListingCandidate, MergedPreferences,
    PreferenceDelta, PreferenceProfile, ProcessingStatus, RoommateCandidate, ScoredCandidate,
};
pub use requests::RankMatchesRequest;
pub use responses::{ErrorResponse, HealthResponse, RankMatchesResponse};
