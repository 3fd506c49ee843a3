use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::{from_profile, listing_score, rank_candidates, roommate_score};
use crate::models::{
    ErrorResponse, HealthResponse, MergedPreferences, RankMatchesRequest, RankMatchesResponse,
};
use crate::services::{EnrichmentPipeline, SupabaseClient, SupabaseError};

/// Shared handler state: the profile/candidate source and the enrichment
/// pipeline, both process-wide.
#[derive(Clone)]
pub struct AppState {
    pub supabase: Arc<SupabaseClient>,
    pub enrichment: Arc<EnrichmentPipeline>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/rank", web::post().to(rank_matches));
}

async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

fn bad_request(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 400,
    })
}

fn dependency_failure(error: &str, message: String) -> HttpResponse {
    HttpResponse::BadGateway().json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: 502,
    })
}

/// Rank roommate and listing matches endpoint
///
/// POST /api/v1/matches/rank
///
/// Request body:
/// ```json
/// {
///   "requester_id": "string",
///   "result_limit": 5,
///   "enable_enrichment": true,
///   "free_text_prompt": "string"
/// }
/// ```
///
/// Candidates arrive pre-filtered from the query layer; this handler only
/// scores, ranks, and truncates. Enrichment failures degrade through the
/// processing-status machine and never surface as raw 5xx errors.
async fn rank_matches(
    state: web::Data<AppState>,
    req: web::Json<RankMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rank_matches request: {:?}", errors);
        return bad_request("validation_failed", errors.to_string());
    }

    let request_id = uuid::Uuid::new_v4();
    let requester_id = &req.requester_id;
    let limit = req.result_limit as usize;

    let prompt = req
        .free_text_prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());

    if req.enable_enrichment && prompt.is_none() {
        return bad_request(
            "validation_failed",
            "free_text_prompt is required when enrichment is enabled".to_string(),
        );
    }

    tracing::info!(
        "Ranking matches for requester {} (request {}, limit {}, enrichment: {})",
        requester_id,
        request_id,
        limit,
        req.enable_enrichment
    );

    // Fetch the stored preference profile
    let profile = match state.supabase.get_profile(requester_id).await {
        Ok(profile) => profile,
        Err(SupabaseError::NotFound(message)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "requester_not_found".to_string(),
                message,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch profile for {}: {}", requester_id, e);
            return dependency_failure("profile_source_error", e.to_string());
        }
    };

    // Resolve the preference set scoring runs against
    let (merged, diagnostics): (MergedPreferences, _) = if req.enable_enrichment {
        // prompt presence was validated above
        let Some(text) = prompt else {
            return bad_request(
                "validation_failed",
                "free_text_prompt is required when enrichment is enabled".to_string(),
            );
        };

        let result = state.enrichment.process_prompt(text, &profile).await;

        tracing::info!(
            "Enrichment for request {} resolved to {:?}",
            request_id,
            result.diagnostics.status
        );

        if !result.usable {
            // insufficient_data / failed: actionable diagnostics, no ranking
            return HttpResponse::UnprocessableEntity()
                .json(RankMatchesResponse::diagnostics_only(result.diagnostics));
        }

        (result.merged, Some(result.diagnostics))
    } else {
        if profile.is_empty() {
            return bad_request(
                "empty_profile",
                "requester profile has no preferences; provide a free-text prompt with enrichment enabled".to_string(),
            );
        }
        (from_profile(&profile), None)
    };

    // Fetch pre-filtered candidate sets
    let roommates = match state.supabase.query_roommates(requester_id, &merged).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to query roommates for {}: {}", requester_id, e);
            return dependency_failure("candidate_source_error", e.to_string());
        }
    };

    let listings = match state.supabase.query_listings(&merged).await {
        Ok(candidates) => candidates,
        Err(e) => {
            tracing::error!("Failed to query listings for {}: {}", requester_id, e);
            return dependency_failure("candidate_source_error", e.to_string());
        }
    };

    tracing::debug!(
        "Scoring {} roommates and {} listings for request {}",
        roommates.len(),
        listings.len(),
        request_id
    );

    let roommate_matches = rank_candidates(roommates, |c| roommate_score(&merged, c), limit);
    let listing_matches = rank_candidates(listings, |l| listing_score(&merged, l), limit);

    tracing::info!(
        "Returning {} roommate and {} listing matches for request {}",
        roommate_matches.len(),
        listing_matches.len(),
        request_id
    );

    HttpResponse::Ok().json(RankMatchesResponse {
        roommate_matches,
        listing_matches,
        diagnostics,
    })
}
