use crate::models::{FallbackMode, ProcessingStatus};

/// Observed pipeline facts the resolver classifies.
#[derive(Debug, Clone, Copy)]
pub struct StatusInputs {
    pub translation_ok: bool,
    pub extraction_success: bool,
    /// Sufficiency of the merged preference set (stored profile alone when
    /// extraction failed, since a failed extraction merges an empty delta).
    pub merged_sufficient: bool,
    pub had_existing_preferences: bool,
}

/// Resolved processing state plus fallback metadata.
#[derive(Debug, Clone)]
pub struct StatusOutcome {
    pub status: ProcessingStatus,
    pub fallback_mode: Option<FallbackMode>,
    pub fallback_reason: Option<String>,
}

/// Classify one enrichment run into its terminal processing status.
///
/// Runs once per request; the returned state is never revised. A failed
/// extraction is not automatically fatal: a requester with enough stored
/// signal falls back to the stored profile, and only a failed extraction
/// over an empty profile is fatal to the request. `upstream_error` (the
/// extractor's failure text) takes precedence as the fallback reason.
pub fn resolve_status(inputs: StatusInputs, upstream_error: Option<&str>) -> StatusOutcome {
    let mut fallback_mode = None;
    let mut fallback_reason: Option<String> = upstream_error
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .map(str::to_string);

    let status = if inputs.extraction_success {
        if inputs.merged_sufficient {
            if inputs.translation_ok {
                ProcessingStatus::Success
            } else {
                ProcessingStatus::Partial
            }
        } else {
            ProcessingStatus::InsufficientData
        }
    } else if inputs.had_existing_preferences {
        if inputs.merged_sufficient {
            fallback_mode = Some(FallbackMode::ExistingPreferences);
            fallback_reason
                .get_or_insert_with(|| "extraction failed; using existing preferences".to_string());
            ProcessingStatus::FallbackToExisting
        } else {
            fallback_reason.get_or_insert_with(|| {
                "extraction failed and existing preferences are insufficient".to_string()
            });
            ProcessingStatus::InsufficientData
        }
    } else {
        fallback_reason.get_or_insert_with(|| {
            "extraction failed and no existing preferences available".to_string()
        });
        ProcessingStatus::Failed
    };

    StatusOutcome {
        status,
        fallback_mode,
        fallback_reason,
    }
}
