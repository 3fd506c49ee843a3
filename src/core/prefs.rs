use std::collections::BTreeSet;

use crate::models::{BudgetValue, MergedPreferences, PreferenceDelta, PreferenceProfile};

/// Canonical form for location values: trimmed and upper-cased.
/// Empty-after-trim collapses to None.
pub fn normalize_location(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_uppercase())
    }
}

/// Combine stored preferences with an extraction delta.
///
/// Field rules:
/// 1. budget_min/budget_max: delta value replaces current when present
/// 2. location: trimmed delta value replaces current when non-empty
/// 3. lifestyle_tags: de-duplicated union of trimmed tags, blanks dropped,
///    lexicographic order
///
/// Pure; never touches persisted state. Merging an empty delta reproduces
/// the stored profile.
pub fn merge_preferences(
    current: &PreferenceProfile,
    delta: &PreferenceDelta,
) -> MergedPreferences {
    let budget_min = delta
        .budget_min
        .clone()
        .or_else(|| current.budget_min.map(BudgetValue::from));
    let budget_max = delta
        .budget_max
        .clone()
        .or_else(|| current.budget_max.map(BudgetValue::from));

    let location_preference = delta
        .location_preference
        .as_deref()
        .and_then(normalize_location)
        .or_else(|| {
            current
                .location_preference
                .as_deref()
                .and_then(normalize_location)
        });

    let lifestyle_tags: BTreeSet<String> = current
        .lifestyle_tags
        .iter()
        .chain(delta.lifestyle_tags.iter().flatten())
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty())
        .collect();

    MergedPreferences {
        budget_min,
        budget_max,
        location_preference,
        lifestyle_tags: lifestyle_tags.into_iter().collect(),
    }
}

/// View of a stored profile as a merged preference set (no delta applied).
pub fn from_profile(profile: &PreferenceProfile) -> MergedPreferences {
    merge_preferences(profile, &PreferenceDelta::default())
}

/// Minimum signal needed for scoring to be meaningful: at least one budget
/// bound, and either a location or at least one lifestyle tag.
///
/// Gates both extraction adequacy and fallback eligibility.
pub fn has_sufficient_preferences(prefs: &MergedPreferences) -> bool {
    let has_budget = prefs.budget_min.is_some() || prefs.budget_max.is_some();
    let has_where = prefs.location_preference.is_some() || !prefs.lifestyle_tags.is_empty();
    has_budget && has_where
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with(
        budget_min: Option<f64>,
        budget_max: Option<f64>,
        location: Option<&str>,
        tags: &[&str],
    ) -> PreferenceProfile {
        PreferenceProfile {
            user_id: "u1".to_string(),
            budget_min,
            budget_max,
            location_preference: location.map(str::to_string),
            lifestyle_tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_empty_delta_is_identity() {
        let profile = profile_with(Some(1000.0), Some(2000.0), Some("CDMX"), &["gym", "quiet"]);
        let merged = merge_preferences(&profile, &PreferenceDelta::default());

        assert_eq!(merged.budget_min, Some(BudgetValue::Int(1000)));
        assert_eq!(merged.budget_max, Some(BudgetValue::Int(2000)));
        assert_eq!(merged.location_preference, Some("CDMX".to_string()));
        assert_eq!(merged.lifestyle_tags, vec!["gym", "quiet"]);
    }

    #[test]
    fn test_delta_budget_overrides_current() {
        let profile = profile_with(Some(1000.0), Some(2000.0), None, &[]);
        let delta = PreferenceDelta {
            budget_max: Some(BudgetValue::Int(2500)),
            ..Default::default()
        };
        let merged = merge_preferences(&profile, &delta);

        assert_eq!(merged.budget_min, Some(BudgetValue::Int(1000)));
        assert_eq!(merged.budget_max, Some(BudgetValue::Int(2500)));
    }

    #[test]
    fn test_delta_location_overrides_when_non_empty() {
        let profile = profile_with(None, None, Some("CDMX"), &[]);

        let delta = PreferenceDelta {
            location_preference: Some("  monterrey  ".to_string()),
            ..Default::default()
        };
        let merged = merge_preferences(&profile, &delta);
        assert_eq!(merged.location_preference, Some("MONTERREY".to_string()));

        // Blank delta location keeps the stored one
        let delta = PreferenceDelta {
            location_preference: Some("   ".to_string()),
            ..Default::default()
        };
        let merged = merge_preferences(&profile, &delta);
        assert_eq!(merged.location_preference, Some("CDMX".to_string()));
    }

    #[test]
    fn test_tag_merge_is_deduplicated_sorted_union() {
        let profile = profile_with(None, None, None, &["quiet", " gym "]);
        let delta = PreferenceDelta {
            lifestyle_tags: Some(vec![
                "gym".to_string(),
                "pets".to_string(),
                "   ".to_string(),
            ]),
            ..Default::default()
        };
        let merged = merge_preferences(&profile, &delta);

        assert_eq!(merged.lifestyle_tags, vec!["gym", "pets", "quiet"]);
    }

    #[test]
    fn test_sufficiency_requires_budget_and_where() {
        // Budget only
        let prefs = MergedPreferences {
            budget_min: Some(BudgetValue::Int(1000)),
            ..Default::default()
        };
        assert!(!has_sufficient_preferences(&prefs));

        // Location only
        let prefs = MergedPreferences {
            location_preference: Some("CDMX".to_string()),
            ..Default::default()
        };
        assert!(!has_sufficient_preferences(&prefs));

        // Budget + location
        let prefs = MergedPreferences {
            budget_max: Some(BudgetValue::Int(2000)),
            location_preference: Some("CDMX".to_string()),
            ..Default::default()
        };
        assert!(has_sufficient_preferences(&prefs));

        // Budget + tags
        let prefs = MergedPreferences {
            budget_min: Some(BudgetValue::Int(1000)),
            lifestyle_tags: vec!["gym".to_string()],
            ..Default::default()
        };
        assert!(has_sufficient_preferences(&prefs));
    }

    #[test]
    fn test_text_budget_counts_as_present() {
        let prefs = MergedPreferences {
            budget_min: Some(BudgetValue::Text("around 1000".to_string())),
            lifestyle_tags: vec!["gym".to_string()],
            ..Default::default()
        };
        assert!(has_sufficient_preferences(&prefs));
    }

    #[test]
    fn test_sufficiency_monotonic_under_additive_delta() {
        let profile = profile_with(Some(1000.0), None, Some("CDMX"), &[]);
        assert!(has_sufficient_preferences(&from_profile(&profile)));

        let delta = PreferenceDelta {
            budget_max: Some(BudgetValue::Int(1800)),
            lifestyle_tags: Some(vec!["pets".to_string()]),
            ..Default::default()
        };
        assert!(has_sufficient_preferences(&merge_preferences(
            &profile, &delta
        )));
    }
}
