// Service exports
pub mod ai;
pub mod enrichment;
pub mod supabase;

pub use ai::{extract_text, AiError, WorkersAiClient};
pub use enrichment::{
    EnrichmentPipeline, EnrichmentResult, ExtractionOutcome, TranslationOutcome,
};
pub use supabase::{SupabaseClient, SupabaseError, SupabaseTables};
