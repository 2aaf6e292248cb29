use log::{info, warn};
use reqwest::Client;
use serde::Serialize;

use crate::error::PostError;
use crate::model::PostContent;

#[derive(Debug, Serialize)]
struct ExportPayload<'a> {
    post_content: &'a PostContent,
}

/// Client for the spreadsheet webhook
#[derive(Debug, Clone)]
pub struct ExportGateway {
    client: Client,
    webhook_url: String,
}

impl ExportGateway {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            webhook_url: webhook_url.into(),
        }
    }

    pub fn webhook_url(&self) -> &str {
        &self.webhook_url
    }

    /// Post the full record under `post_content`. Any 2xx is success.
    pub async fn export(&self, post: &PostContent) -> Result<(), PostError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&ExportPayload { post_content: post })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Webhook rejected post {}: {} {}", post.number, status, body);
            return Err(PostError::Export {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                body,
            });
        }

        info!("Exported post {} to webhook", post.number);
        Ok(())
    }
}
