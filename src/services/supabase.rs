use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{ListingCandidate, MergedPreferences, PreferenceProfile, RoommateCandidate};

/// Errors that can occur when talking to the profile/candidate source
#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Table names on the Supabase side
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub user_profiles: String,
    pub properties: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            user_profiles: "user_profiles".to_string(),
            properties: "properties".to_string(),
        }
    }
}

/// Supabase PostgREST client
///
/// The query layer for the matching core: fetches the requester's
/// preference profile and candidate sets pre-filtered by the hard
/// constraints (location equality, budget/price overlap, availability).
/// The core itself never filters.
pub struct SupabaseClient {
    base_url: String,
    anon_key: String,
    client: Client,
    tables: SupabaseTables,
}

impl SupabaseClient {
    pub fn new(base_url: String, anon_key: String, tables: SupabaseTables) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            anon_key,
            client,
            tables,
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!(
            "{}/rest/v1/{}",
            self.base_url.trim_end_matches('/'),
            table
        )
    }

    async fn fetch_rows(&self, url: &str) -> Result<Vec<Value>, SupabaseError> {
        eprintln!("FETCH_URL: {}", url);
        let response = self
            .client
            .get(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await?;

        if !response.status().is_success() {
            let st = response.status();
            let body = response.text().await.unwrap_or_default();
            eprintln!("MISMATCH_BODY [{}]: {}", st, body);
            return Err(SupabaseError::ApiError(format!(
                "query failed: {}",
                st
            )));
        }

        let json: Value = response.json().await?;
        json.as_array()
            .cloned()
            .ok_or_else(|| SupabaseError::InvalidResponse("expected a row array".into()))
    }

    /// Fetch the stored preference profile for a requester.
    pub async fn get_profile(&self, user_id: &str) -> Result<PreferenceProfile, SupabaseError> {
        let url = format!(
            "{}?user_id=eq.{}&limit=1",
            self.rest_url(&self.tables.user_profiles),
            urlencoding::encode(user_id)
        );

        tracing::debug!("Fetching profile for user: {}", user_id);

        let rows = self.fetch_rows(&url).await?;
        let row = rows
            .first()
            .ok_or_else(|| SupabaseError::NotFound(format!("profile not found for user {}", user_id)))?;

        serde_json::from_value(row.clone())
            .map_err(|e| SupabaseError::InvalidResponse(format!("failed to parse profile: {}", e)))
    }

    /// Query roommate candidates whose location matches and whose budget
    /// range overlaps the requester's. Bounds missing from the merged
    /// preferences simply drop the corresponding filter.
    pub async fn query_roommates(
        &self,
        user_id: &str,
        prefs: &MergedPreferences,
    ) -> Result<Vec<RoommateCandidate>, SupabaseError> {
        let mut params = vec![format!("user_id=neq.{}", urlencoding::encode(user_id))];

        if let Some(location) = &prefs.location_preference {
            params.push(format!(
                "location_preference=eq.{}",
                urlencoding::encode(location)
            ));
        }
        if let Some(budget_min) = prefs.budget_min.as_ref().and_then(|b| b.numeric()) {
            params.push(format!("budget_max=gte.{}", budget_min));
        }
        if let Some(budget_max) = prefs.budget_max.as_ref().and_then(|b| b.numeric()) {
            params.push(format!("budget_min=lte.{}", budget_max));
        }

        let url = format!(
            "{}?{}",
            self.rest_url(&self.tables.user_profiles),
            params.join("&")
        );

        let rows = self.fetch_rows(&url).await?;
        let candidates: Vec<RoommateCandidate> = rows
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .filter(|c: &RoommateCandidate| c.user_id != user_id)
            .collect();

        tracing::debug!("Queried {} roommate candidates", candidates.len());

        Ok(candidates)
    }

    /// Query listings in the requester's location, within the budget/price
    /// overlap, and available now.
    pub async fn query_listings(
        &self,
        prefs: &MergedPreferences,
    ) -> Result<Vec<ListingCandidate>, SupabaseError> {
        let mut params = Vec::new();

        if let Some(location) = &prefs.location_preference {
            params.push(format!("location=eq.{}", urlencoding::encode(location)));
        }
        if let Some(budget_min) = prefs.budget_min.as_ref().and_then(|b| b.numeric()) {
            params.push(format!("price=gte.{}", budget_min));
        }
        if let Some(budget_max) = prefs.budget_max.as_ref().and_then(|b| b.numeric()) {
            params.push(format!("price=lte.{}", budget_max));
        }
        params.push(format!(
            "available_from=lte.{}",
            urlencoding::encode(&chrono::Utc::now().to_rfc3339())
        ));

        let url = format!(
            "{}?{}",
            self.rest_url(&self.tables.properties),
            params.join("&")
        );

        let rows = self.fetch_rows(&url).await?;
        let listings: Vec<ListingCandidate> = rows
            .iter()
            .filter_map(|row| serde_json::from_value(row.clone()).ok())
            .collect();

        tracing::debug!("Queried {} listing candidates", listings.len());

        Ok(listings)
    }
}
