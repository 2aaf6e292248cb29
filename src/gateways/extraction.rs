use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::failure_from_response;
use crate::error::PostError;
use crate::model::ImagePayload;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractRequest<'a> {
    image: &'a str,
    mime_type: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractResponse {
    extracted_text: String,
}

/// Client for the text extraction endpoint
#[derive(Debug, Clone)]
pub struct ExtractionGateway {
    client: Client,
    endpoint: String,
}

impl ExtractionGateway {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one normalized image and return the text found on it, verbatim.
    pub async fn extract_text(&self, image: &ImagePayload) -> Result<String, PostError> {
        debug!("Requesting text extraction from {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&ExtractRequest {
                image: &image.data,
                mime_type: &image.mime_type,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(failure_from_response(response).await);
        }

        let body = response.text().await?;
        let parsed: ExtractResponse = serde_json::from_str(&body)
            .map_err(|e| PostError::SchemaViolation(format!("extraction response: {}", e)))?;

        Ok(parsed.extracted_text)
    }
}
