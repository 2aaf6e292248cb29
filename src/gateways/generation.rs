use log::{debug, info};
use reqwest::Client;
use serde::Serialize;

use super::failure_from_response;
use crate::error::PostError;
use crate::model::{ImagePayload, PostContent};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
    images: &'a [ImagePayload],
}

/// Client for the post generation endpoint
#[derive(Debug, Clone)]
pub struct GenerationGateway {
    client: Client,
    endpoint: String,
}

impl GenerationGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Generate a post from recipe text and zero or more encoded images.
    ///
    /// The returned post is already sanitized; it is not retried on failure.
    pub async fn generate_post(
        &self,
        text: &str,
        images: &[ImagePayload],
    ) -> Result<PostContent, PostError> {
        debug!(
            "Requesting post generation from {} ({} chars, {} image(s))",
            self.endpoint,
            text.len(),
            images.len()
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(&GenerateRequest { text, images })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from_response(response).await);
        }

        let body = response.text().await?;
        let post: PostContent = serde_json::from_str(&body)
            .map_err(|e| PostError::SchemaViolation(e.to_string()))?;

        let post = post.sanitized();
        post.validate()?;
        info!("Received post {}", post.number);

        Ok(post)
    }
}
