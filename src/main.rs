mod config;
mod core;
mod models;
mod routes;
mod services;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use tracing::info;

use crate::config::Settings;
use crate::routes::matches::AppState;
use crate::services::{EnrichmentPipeline, SupabaseClient, SupabaseTables, WorkersAiClient};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                e.to_string(),
            ));
        }
    };

    init_logging(&settings);

    info!("starting roomly-algo {}", env!("CARGO_PKG_VERSION"));

    let tables = SupabaseTables {
        user_profiles: settings.supabase.user_profiles_table.clone(),
        properties: settings.supabase.properties_table.clone(),
    };
    let supabase = Arc::new(SupabaseClient::new(
        settings.supabase.endpoint.clone(),
        settings.supabase.anon_key.clone(),
        tables,
    ));

    let ai = Arc::new(WorkersAiClient::new(
        settings.ai.run_endpoint(),
        settings.ai.api_token.clone(),
        settings.ai.llm_model.clone(),
        settings.ai.resolved_translation_model(),
        settings.ai.timeout_secs,
    ));
    let enrichment = Arc::new(EnrichmentPipeline::new(ai));

    info!(
        "clients ready (profile source: {}, model: {}, timeout: {}s)",
        settings.supabase.endpoint, settings.ai.llm_model, settings.ai.timeout_secs
    );

    let app_state = AppState {
        supabase,
        enrichment,
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(routes::json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(routes::query_payload_error))
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}

/// Structured logs default to JSON; `pretty` switches to the human-readable
/// form. LOG_LEVEL / LOG_FORMAT override the configured values.
fn init_logging(settings: &Settings) {
    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| settings.logging.level.clone());
    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(level))
        .with_target(false);

    if format == "pretty" {
        builder.pretty().init();
    } else {
        builder.init();
    }
}
