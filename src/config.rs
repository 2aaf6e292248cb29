use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::providers::{post_response_schema, SYSTEM_PROMPT};

/// Process-wide settings, loaded once at startup
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Spreadsheet webhook receiving exported posts
    #[serde(default = "default_webhook_url")]
    pub webhook_url: String,
    /// System instruction sent with every generation call
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Output schema the model must follow for generation
    #[serde(default = "post_response_schema")]
    pub response_schema: Value,
    /// Base URL of the extraction/generation endpoints used by clients
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Address the endpoint server listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Largest request body the endpoints accept, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// How long a finished export status stays visible, in seconds
    #[serde(default = "default_export_status_window_secs")]
    pub export_status_window_secs: u64,
    /// Generative model settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Configuration for the Gemini API
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key (can also be set via GOOGLE_API_KEY or API_KEY)
    pub api_key: Option<String>,
    /// Model used for post generation
    #[serde(default = "default_model")]
    pub model: String,
    /// Model used for text extraction from images
    #[serde(default = "default_model")]
    pub vision_model: String,
    /// Base URL for API endpoint (for proxies and tests)
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            vision_model: default_model(),
            base_url: default_gemini_base_url(),
            temperature: default_temperature(),
        }
    }
}

impl GeminiConfig {
    /// Configured key, or the GOOGLE_API_KEY / API_KEY environment variables.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .or_else(|| std::env::var("API_KEY").ok())
            .filter(|key| !key.trim().is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            webhook_url: default_webhook_url(),
            system_prompt: default_system_prompt(),
            response_schema: post_response_schema(),
            api_base_url: default_api_base_url(),
            bind_address: default_bind_address(),
            max_body_bytes: default_max_body_bytes(),
            export_status_window_secs: default_export_status_window_secs(),
            gemini: GeminiConfig::default(),
        }
    }
}

// Default value functions
fn default_webhook_url() -> String {
    "https://hook.eu2.make.com/jo52w67and9w23pahdk86vdbiaqtzfcd".to_string()
}

fn default_system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

fn default_api_base_url() -> String {
    "http://127.0.0.1:3000/api".to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_max_body_bytes() -> usize {
    6 * 1024 * 1024
}

fn default_export_status_window_secs() -> u64 {
    3
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_POST__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_POST__GEMINI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    pub fn export_status_window(&self) -> Duration {
        Duration::from_secs(self.export_status_window_secs)
    }

    /// Full URL of one of the extraction/generation endpoints.
    pub fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Load configuration from file and environment variables
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE_POST__GEMINI__MODEL
        .add_source(
            Environment::with_prefix("RECIPE_POST")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
