//! Model-facing steps shared by the endpoint server and the builder API.

pub mod image;
pub mod text;

use crate::config::AppConfig;

/// Prompt contract for post generation.
#[derive(Debug, Clone)]
pub struct GenerationContract {
    pub system_prompt: String,
    pub response_schema: serde_json::Value,
}

impl From<&AppConfig> for GenerationContract {
    fn from(config: &AppConfig) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            response_schema: config.response_schema.clone(),
        }
    }
}
