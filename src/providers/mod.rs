mod google;
mod prompt;

pub use google::GoogleProvider;
pub use prompt::{
    build_generation_text, missing_hashtags, post_response_schema, EXTRACTION_INSTRUCTION,
    MANDATORY_HASHTAGS, POST_CONTENT_KEY, SYSTEM_PROMPT,
};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PostError;
use crate::model::ImagePayload;

/// What a model call is for; providers may route each to a different model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    ExtractText,
    GeneratePost,
}

/// One piece of user content, in the order it is sent.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    Image(ImagePayload),
}

/// A single-turn request to a generative model
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub task: Task,
    pub parts: Vec<Part>,
    pub system_instruction: Option<String>,
    /// When set, the model must answer with JSON matching this schema
    pub response_schema: Option<Value>,
}

impl ModelRequest {
    pub fn new(task: Task, parts: Vec<Part>) -> Self {
        Self {
            task,
            parts,
            system_instruction: None,
            response_schema: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }
}

/// Seam between the pipelines and a concrete AI vendor
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Get the provider name (e.g., "google")
    fn provider_name(&self) -> &str;

    /// Run one request and return the reply text verbatim
    async fn generate(&self, request: ModelRequest) -> Result<String, PostError>;
}
