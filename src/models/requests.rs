use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to rank roommate and listing matches for a requester.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankMatchesRequest {
    #[validate(length(min = 1))]
    pub requester_id: String,
    /// Number of results per candidate class.
    #[serde(default = "default_result_limit")]
    #[validate(range(min = 1, max = 20))]
    pub result_limit: u16,
    /// When set, the free-text prompt runs through the enrichment
    /// pipeline before scoring.
    #[serde(default)]
    pub enable_enrichment: bool,
    #[serde(default)]
    pub free_text_prompt: Option<String>,
}

fn default_result_limit() -> u16 {
    5
}
