use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Service settings, resolved once at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub supabase: SupabaseSettings,
    pub ai: AiSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseSettings {
    pub endpoint: String,
    pub anon_key: String,
    #[serde(default = "default_profiles_table")]
    pub user_profiles_table: String,
    #[serde(default = "default_properties_table")]
    pub properties_table: String,
}

fn default_profiles_table() -> String {
    "user_profiles".to_string()
}
fn default_properties_table() -> String {
    "properties".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiSettings {
    pub account_id: String,
    pub api_token: String,
    /// Full run endpoint override; when absent it is derived from the
    /// account id.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,
    /// Separate model for language detection/translation; defaults to the
    /// main model.
    #[serde(default)]
    pub translation_model: Option<String>,
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

impl AiSettings {
    /// Resolved Workers AI run endpoint.
    pub fn run_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://api.cloudflare.com/client/v4/accounts/{}/ai/run",
                self.account_id
            )
        })
    }

    pub fn resolved_translation_model(&self) -> String {
        self.translation_model
            .clone()
            .unwrap_or_else(|| self.llm_model.clone())
    }
}

fn default_llm_model() -> String {
    "@cf/openai/gpt-oss-120b".to_string()
}
fn default_ai_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Layered load: config/default.toml, then config/local.toml, then
    /// ROOMLY_-prefixed environment variables with `__` separators (e.g.
    /// ROOMLY_SERVER__PORT maps to server.port). Later sources win.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            // local.toml holds development overrides and is not committed
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("ROOMLY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings = substitute_env_vars(settings)?;

        settings.try_deserialize()
    }

    /// Load from an explicit config file, keeping the env overrides.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("ROOMLY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Pull secrets from their conventional plain environment variables when
/// set, so deployments can keep using SUPABASE_URL / CLOUDFLARE_API_TOKEN
/// style naming.
fn substitute_env_vars(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let supabase_endpoint = env::var("SUPABASE_URL")
        .or_else(|_| env::var("ROOMLY_SUPABASE__ENDPOINT"))
        .ok();
    let supabase_anon_key = env::var("SUPABASE_ANON_KEY")
        .or_else(|_| env::var("ROOMLY_SUPABASE__ANON_KEY"))
        .ok();
    let cf_account_id = env::var("CLOUDFLARE_ACCOUNT_ID")
        .or_else(|_| env::var("ROOMLY_AI__ACCOUNT_ID"))
        .ok();
    let cf_api_token = env::var("CLOUDFLARE_API_TOKEN")
        .or_else(|_| env::var("ROOMLY_AI__API_TOKEN"))
        .ok();
    let llm_model = env::var("LLM_MODEL").ok();

    let mut builder = Config::builder().add_source(settings);

    if let Some(endpoint) = supabase_endpoint {
        builder = builder.set_override("supabase.endpoint", endpoint)?;
    }
    if let Some(anon_key) = supabase_anon_key {
        builder = builder.set_override("supabase.anon_key", anon_key)?;
    }
    if let Some(account_id) = cf_account_id {
        builder = builder.set_override("ai.account_id", account_id)?;
    }
    if let Some(api_token) = cf_api_token {
        builder = builder.set_override("ai.api_token", api_token)?;
    }
    if let Some(model) = llm_model {
        builder = builder.set_override("ai.llm_model", model)?;
    }

    builder.build()
}
