use std::sync::Arc;

use serde_json::Value;

use crate::core::{has_sufficient_preferences, merge_preferences, resolve_status, StatusInputs};
use crate::models::{
    EnrichmentDiagnostics, MergedPreferences, PreferenceDelta, PreferenceProfile, ProcessingStatus,
};
use crate::services::ai::{extract_text, WorkersAiClient};

/// Schema instructions appended to every extraction prompt.
const FORMAT_INSTRUCTIONS: &str = r#"Respond ONLY with a JSON object using these keys (set a key to null or omit it when you cannot determine it):
{
  "budget_min": <integer>,
  "budget_max": <integer>,
  "location_preference": <string>,
  "lifestyle_tags": [<string>, ...],
  "confidence_scores": {"<field>": <number between 0 and 1>, ...},
  "estimated_fields": [<string>, ...],
  "missing_critical_info": [<string>, ...],
  "suggestions": [<string>, ...]
}
No prose before or after the JSON."#;

/// Outcome of language detection + translation.
#[derive(Debug, Clone)]
pub struct TranslationOutcome {
    /// English working copy, or the original text when the call failed.
    pub text: String,
    pub ok: bool,
    /// Lower-cased language code or readable name; None when unknown.
    pub source_language: Option<String>,
}

/// Outcome of one preference extraction call.
#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    pub delta: PreferenceDelta,
    pub success: bool,
    pub error: Option<String>,
}

impl ExtractionOutcome {
    fn failure(kind: &str, had_existing: bool) -> Self {
        let error = if had_existing {
            format!("{}, using existing preferences", kind)
        } else {
            format!("{} and no existing preferences available", kind)
        };
        Self {
            delta: PreferenceDelta::default(),
            success: false,
            error: Some(error),
        }
    }
}

/// Result of a full enrichment run.
#[derive(Debug, Clone)]
pub struct EnrichmentResult {
    /// Preference set scoring should run against.
    pub merged: MergedPreferences,
    pub diagnostics: EnrichmentDiagnostics,
    /// Whether the resolved status permits ranking to proceed.
    pub usable: bool,
}

/// Free-text enrichment pipeline: translate, extract, merge, classify,
/// localize. Each stage converts its own failures into degraded outcomes;
/// nothing here returns an error to the caller.
pub struct EnrichmentPipeline {
    ai: Arc<WorkersAiClient>,
}

impl EnrichmentPipeline {
    pub fn new(ai: Arc<WorkersAiClient>) -> Self {
        Self { ai }
    }

    /// Detect the prompt language and produce an English working copy.
    ///
    /// The model is asked for compact JSON `{"lang","text"}`. A plain-text
    /// answer still counts as a successful translation with an unknown
    /// source language. Call failure returns the original text unmodified.
    pub async fn translate_to_english(&self, text: &str) -> TranslationOutcome {
        let prompt = format!(
            "Detect the language of the INPUT and translate it to English only if needed. \
             Respond ONLY as compact JSON with keys 'lang' and 'text', where 'lang' is the INPUT \
             language (ISO 639-1 like 'en', 'es' preferred; if unsure, write a readable name), \
             and 'text' is the English text or the original text if already English.\n\
             Example: {{\"lang\":\"es\",\"text\":\"hello\"}}\n\nINPUT:\n{}",
            text
        );

        let Some(answer) = self.ai.generate(self.ai.translation_model(), &prompt).await else {
            tracing::warn!("language detection failed, using original text");
            return TranslationOutcome {
                text: text.to_string(),
                ok: false,
                source_language: None,
            };
        };

        if let Some(parsed) = parse_json_payload(&answer) {
            if let Some(translated) = parsed.get("text").and_then(Value::as_str) {
                let source_language = parsed
                    .get("lang")
                    .and_then(Value::as_str)
                    .map(|l| l.trim().to_lowercase())
                    .filter(|l| !l.is_empty());
                return TranslationOutcome {
                    text: translated.to_string(),
                    ok: true,
                    source_language,
                };
            }
        }

        // Model answered in plain text rather than the requested JSON
        TranslationOutcome {
            text: answer,
            ok: true,
            source_language: None,
        }
    }

    /// Extract a preference delta from English free text.
    ///
    /// Update mode (existing preferences) asks only for fields the text
    /// explicitly changes; cold-start mode asks the model to fill all four
    /// fields and flag what it estimated. Numeric fields are coerced to
    /// integer semantics where a fit exists; otherwise the raw value rides
    /// along so the signal is not lost.
    pub async fn extract_preferences(
        &self,
        english_text: &str,
        current: &PreferenceProfile,
    ) -> ExtractionOutcome {
        let had_existing = !current.is_empty();
        let prompt = if had_existing {
            update_prompt(current, english_text)
        } else {
            cold_start_prompt(english_text)
        };

        // Three distinguishable failure modes: the call itself failing, a
        // response with no usable text, and text that does not parse into
        // the delta schema.
        let body = match self.ai.run_model(self.ai.llm_model(), &prompt).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("preference extraction call failed: {}", e);
                return ExtractionOutcome::failure("AI service unavailable", had_existing);
            }
        };

        let Some(answer) = extract_text(&body) else {
            tracing::warn!("extraction response had no usable text");
            return ExtractionOutcome::failure("Malformed AI response", had_existing);
        };

        match parse_delta(&answer) {
            Some(mut delta) => {
                delta.budget_min = delta.budget_min.take().map(|v| v.coerced());
                delta.budget_max = delta.budget_max.take().map(|v| v.coerced());
                ExtractionOutcome {
                    delta,
                    success: true,
                    error: None,
                }
            }
            None => {
                tracing::warn!("model output did not match the preference schema: {}", answer);
                ExtractionOutcome::failure("AI parsing failed", had_existing)
            }
        }
    }

    /// Translate a list of diagnostic strings into the requester's
    /// language.
    ///
    /// No-op for an empty list, a blank target, or English. The model
    /// answer is accepted only when it is a same-length all-string array;
    /// anything else keeps the original list. Never loses data, never
    /// errors.
    pub async fn localize_list(&self, items: &[String], target_language: &str) -> Vec<String> {
        let target = target_language.trim();
        if items.is_empty() || target.is_empty() || is_english(target) {
            return items.to_vec();
        }

        let array = Value::from(items.to_vec()).to_string();
        let prompt = format!(
            "Translate EACH item in the following JSON array into the target language.\n\
             Target language code or name: {}\n\
             Return ONLY a JSON array of strings, same order, no extra commentary.\n\nArray:\n{}",
            target, array
        );

        let Some(answer) = self.ai.generate(self.ai.translation_model(), &prompt).await else {
            return items.to_vec();
        };

        match parse_json_payload(&answer)
            .and_then(|v| serde_json::from_value::<Vec<String>>(v).ok())
        {
            Some(translated) if translated.len() == items.len() => translated,
            _ => items.to_vec(),
        }
    }

    /// Run the full pipeline for one request.
    ///
    /// Stages are dependency-ordered; the two localization calls are
    /// independent of each other and run concurrently.
    pub async fn process_prompt(
        &self,
        prompt: &str,
        current: &PreferenceProfile,
    ) -> EnrichmentResult {
        let translation = self.translate_to_english(prompt).await;
        let mut translation_note = (!translation.ok)
            .then(|| "language detection failed; used the original text".to_string());

        let had_existing = !current.is_empty();
        let extraction = self.extract_preferences(&translation.text, current).await;
        let merged = merge_preferences(current, &extraction.delta);

        let outcome = resolve_status(
            StatusInputs {
                translation_ok: translation.ok,
                extraction_success: extraction.success,
                merged_sufficient: has_sufficient_preferences(&merged),
                had_existing_preferences: had_existing,
            },
            extraction.error.as_deref(),
        );

        let mut suggestions = extraction.delta.suggestions.clone().unwrap_or_default();
        let mut missing_critical_info = extraction
            .delta
            .missing_critical_info
            .clone()
            .unwrap_or_default();

        if let Some(lang) = translation
            .source_language
            .as_deref()
            .filter(|l| !is_english(l))
        {
            if !suggestions.is_empty() || !missing_critical_info.is_empty() {
                let (localized_suggestions, localized_missing) = tokio::join!(
                    self.localize_list(&suggestions, lang),
                    self.localize_list(&missing_critical_info, lang),
                );
                suggestions = localized_suggestions;
                missing_critical_info = localized_missing;

                let note = format!("diagnostics translated back to '{}'", lang);
                translation_note = Some(match translation_note {
                    Some(existing) => format!("{} {}", existing, note),
                    None => note,
                });
            }
        }

        let usable = matches!(
            outcome.status,
            ProcessingStatus::Success
                | ProcessingStatus::Partial
                | ProcessingStatus::FallbackToExisting
        );

        EnrichmentResult {
            merged,
            usable,
            diagnostics: EnrichmentDiagnostics {
                status: outcome.status,
                suggestions,
                missing_critical_info,
                confidence_scores: extraction.delta.confidence_scores.clone().unwrap_or_default(),
                estimated_fields: extraction.delta.estimated_fields.clone().unwrap_or_default(),
                fallback_mode: outcome.fallback_mode,
                fallback_reason: outcome.fallback_reason,
                error: extraction.error,
                translation_note,
            },
        }
    }
}

fn is_english(lang: &str) -> bool {
    lang.trim().to_lowercase().starts_with("en")
}

fn update_prompt(current: &PreferenceProfile, user_prompt: &str) -> String {
    let not_set = "not set".to_string();
    format!(
        "You are an AI assistant that intelligently updates housing preferences based on user queries.\n\n\
         CURRENT USER PREFERENCES (from database):\n\
         - Budget: {} - {}\n\
         - Location: {}\n\
         - Lifestyle tags: {:?}\n\n\
         TASK: Based on the user's new query below, determine what preferences should be UPDATED or ADDED.\n\
         - If the user mentions a new budget, OVERRIDE the existing budget\n\
         - If the user mentions a new location, OVERRIDE the existing location\n\
         - If the user mentions new amenities/lifestyle, ADD to existing lifestyle tags (avoid duplicates)\n\
         - Provide confidence scores (0-1) for each field\n\
         - List which fields were estimated vs explicitly mentioned\n\
         - Suggest missing critical information\n\n\
         User query: {}\n\n{}\n\n\
         Analyze the query and return the updated preferences:",
        current
            .budget_min
            .map(|v| v.to_string())
            .unwrap_or_else(|| not_set.clone()),
        current
            .budget_max
            .map(|v| v.to_string())
            .unwrap_or_else(|| not_set.clone()),
        current.location_preference.as_deref().unwrap_or("not set"),
        current.lifestyle_tags,
        user_prompt,
        FORMAT_INSTRUCTIONS
    )
}

fn cold_start_prompt(user_prompt: &str) -> String {
    format!(
        "You are an AI assistant that extracts complete housing preferences from user queries and \
         provides intelligent defaults for missing information.\n\n\
         USER PROFILE STATUS: Empty (no existing preferences in database)\n\n\
         TASK: Extract ALL housing preferences from the user query below. For missing critical \
         information, provide reasonable estimates. Be explicit about what is estimated.\n\
         - Include: budget_min, budget_max, location_preference, lifestyle_tags\n\
         - Provide confidence_scores (0-1) per field\n\
         - Mark estimated_fields\n\
         - List missing_critical_info and provide helpful suggestions\n\n\
         User query: {}\n\n{}\n\n\
         Extract complete preferences with intelligent gap filling:",
        user_prompt, FORMAT_INSTRUCTIONS
    )
}

/// Locate and parse a JSON payload inside model output: direct JSON,
/// fenced code block, or the widest brace/bracket span.
fn parse_json_payload(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str(trimmed) {
        return Some(value);
    }

    let unfenced = strip_code_fence(trimmed);
    if let Ok(value) = serde_json::from_str(unfenced) {
        return Some(value);
    }

    let start = trimmed.find(['{', '['])?;
    let end = trimmed.rfind(['}', ']'])?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let mut inner = text.trim();
    if let Some(stripped) = inner.strip_prefix("```") {
        inner = stripped.strip_prefix("json").unwrap_or(stripped).trim_start();
    }
    if let Some(stripped) = inner.strip_suffix("```") {
        inner = stripped.trim_end();
    }
    inner
}

/// Parse model output into a schema-validated preference delta.
fn parse_delta(text: &str) -> Option<PreferenceDelta> {
    let payload = parse_json_payload(text)?;
    if !payload.is_object() {
        return None;
    }
    serde_json::from_value(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BudgetValue;

    #[test]
    fn test_parse_delta_direct_json() {
        let delta = parse_delta(r#"{"budget_min": 1000, "lifestyle_tags": ["gym"]}"#).unwrap();
        assert_eq!(delta.budget_min, Some(BudgetValue::Int(1000)));
        assert_eq!(delta.lifestyle_tags, Some(vec!["gym".to_string()]));
    }

    #[test]
    fn test_parse_delta_fenced_json() {
        let text = "```json\n{\"budget_max\": 2500}\n```";
        let delta = parse_delta(text).unwrap();
        assert_eq!(delta.budget_max, Some(BudgetValue::Int(2500)));
    }

    #[test]
    fn test_parse_delta_embedded_in_prose() {
        let text = "Here are the preferences you asked for:\n{\"location_preference\": \"CDMX\"}\nHope that helps!";
        let delta = parse_delta(text).unwrap();
        assert_eq!(delta.location_preference, Some("CDMX".to_string()));
    }

    #[test]
    fn test_parse_delta_rejects_non_object() {
        assert!(parse_delta("[1, 2, 3]").is_none());
        assert!(parse_delta("not json at all").is_none());
        assert!(parse_delta("").is_none());
    }

    #[test]
    fn test_parse_delta_ignores_unknown_keys() {
        let delta = parse_delta(r#"{"budget_min": 900, "mood": "optimistic"}"#).unwrap();
        assert_eq!(delta.budget_min, Some(BudgetValue::Int(900)));
    }

    #[test]
    fn test_is_english_variants() {
        assert!(is_english("en"));
        assert!(is_english("EN-US"));
        assert!(is_english("English"));
        assert!(!is_english("es"));
        assert!(!is_english("fr"));
    }

    #[test]
    fn test_extraction_failure_wording() {
        let with_existing = ExtractionOutcome::failure("AI service unavailable", true);
        assert_eq!(
            with_existing.error.as_deref(),
            Some("AI service unavailable, using existing preferences")
        );

        let cold = ExtractionOutcome::failure("AI parsing failed", false);
        assert_eq!(
            cold.error.as_deref(),
            Some("AI parsing failed and no existing preferences available")
        );
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("```json\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("```\n[]\n```"), "[]");
        assert_eq!(strip_code_fence("{}"), "{}");
    }
}
