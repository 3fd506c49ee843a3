use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stored preference profile for a requester.
///
/// Read-only input to the matching pipeline. Unknown columns coming back
/// from the profile source are ignored at this boundary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceProfile {
    pub user_id: String,
    #[serde(default)]
    pub budget_min: Option<f64>,
    #[serde(default)]
    pub budget_max: Option<f64>,
    #[serde(default)]
    pub location_preference: Option<String>,
    #[serde(default)]
    pub lifestyle_tags: Vec<String>,
}

impl PreferenceProfile {
    /// A profile is empty when none of the four preference fields carry a
    /// usable value. Distinguishes a cold-start requester from an
    /// established one.
    pub fn is_empty(&self) -> bool {
        self.budget_min.is_none()
            && self.budget_max.is_none()
            && self
                .location_preference
                .as_deref()
                .map_or(true, |l| l.trim().is_empty())
            && self.lifestyle_tags.is_empty()
    }
}

/// Numeric preference value as it arrives from the model.
///
/// Model output is not guaranteed to be an integer: budgets show up as
/// floats or quoted strings. Coercion keeps the signal instead of dropping
/// the field when the value does not parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BudgetValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl BudgetValue {
    /// Coerce to integer semantics where a fit is well-defined.
    /// Floats truncate; strings parse when they hold a plain integer;
    /// anything else is kept verbatim.
    pub fn coerced(self) -> BudgetValue {
        match self {
            BudgetValue::Int(v) => BudgetValue::Int(v),
            BudgetValue::Float(v) => BudgetValue::Int(v as i64),
            BudgetValue::Text(raw) => match raw.trim().parse::<i64>() {
                Ok(v) => BudgetValue::Int(v),
                Err(_) => BudgetValue::Text(raw),
            },
        }
    }

    /// Scoring view of the value. A string that survived coercion is read
    /// with a best-effort float parse; unparseable text yields no signal.
    pub fn numeric(&self) -> Option<f64> {
        match self {
            BudgetValue::Int(v) => Some(*v as f64),
            BudgetValue::Float(v) => Some(*v),
            BudgetValue::Text(raw) => raw.trim().parse::<f64>().ok(),
        }
    }
}

impl From<f64> for BudgetValue {
    fn from(v: f64) -> Self {
        if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            BudgetValue::Int(v as i64)
        } else {
            BudgetValue::Float(v)
        }
    }
}

/// Structured preference delta produced by one extraction call.
///
/// All fields are optional; in update mode an omitted field means "keep
/// existing". Unknown keys in the model payload are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceDelta {
    pub budget_min: Option<BudgetValue>,
    pub budget_max: Option<BudgetValue>,
    pub location_preference: Option<String>,
    pub lifestyle_tags: Option<Vec<String>>,
    pub confidence_scores: Option<HashMap<String, f64>>,
    pub estimated_fields: Option<Vec<String>>,
    pub missing_critical_info: Option<Vec<String>>,
    pub suggestions: Option<Vec<String>>,
}

/// The merged preference set consumed by the scoring engine.
///
/// Produced by `core::prefs::merge_preferences`; never written back to the
/// profile source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedPreferences {
    pub budget_min: Option<BudgetValue>,
    pub budget_max: Option<BudgetValue>,
    pub location_preference: Option<String>,
    pub lifestyle_tags: Vec<String>,
}

impl MergedPreferences {
    /// Mean of the numerically-present budget bounds. A single bound is
    /// its own average; no numeric bound means no budget signal.
    pub fn budget_avg(&self) -> Option<f64> {
        let bounds: Vec<f64> = [&self.budget_min, &self.budget_max]
            .into_iter()
            .filter_map(|b| b.as_ref().and_then(BudgetValue::numeric))
            .collect();
        if bounds.is_empty() {
            None
        } else {
            Some(bounds.iter().sum::<f64>() / bounds.len() as f64)
        }
    }

    /// Numeric upper budget bound, used as the price-score denominator.
    pub fn budget_max_numeric(&self) -> Option<f64> {
        self.budget_max.as_ref().and_then(BudgetValue::numeric)
    }
}

/// Terminal outcome of one enrichment run. Assigned once per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    Success,
    Partial,
    InsufficientData,
    FallbackToExisting,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackMode {
    ExistingPreferences,
}

/// Candidate roommate, pre-filtered by the query layer on location and
/// budget overlap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoommateCandidate {
    pub user_id: String,
    #[serde(default)]
    pub budget_min: Option<f64>,
    #[serde(default)]
    pub budget_max: Option<f64>,
    #[serde(default)]
    pub location_preference: Option<String>,
    #[serde(default)]
    pub lifestyle_tags: Vec<String>,
}

/// Candidate rental listing, pre-filtered by the query layer on location,
/// price range, and availability window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingCandidate {
    pub id: i64,
    pub price: f64,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub available_from: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub available_to: Option<chrono::DateTime<chrono::Utc>>,
}

/// A candidate plus its compatibility score and stable 1-based rank.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate<T> {
    #[serde(flatten)]
    pub candidate: T,
    pub score: f64,
    pub rank: u32,
}

/// Diagnostics attached to a response when enrichment was requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentDiagnostics {
    pub status: ProcessingStatus,
    pub suggestions: Vec<String>,
    pub missing_critical_info: Vec<String>,
    pub confidence_scores: HashMap<String, f64>,
    pub estimated_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_mode: Option<FallbackMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation_note: Option<String>,
}
