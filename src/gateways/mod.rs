//! HTTP clients for the extraction/generation endpoints and the export webhook.

mod export;
mod extraction;
mod generation;

pub use export::ExportGateway;
pub use extraction::ExtractionGateway;
pub use generation::GenerationGateway;

use log::warn;
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::error::PostError;

/// Path of the text extraction endpoint, relative to the API base URL
pub const EXTRACT_TEXT_PATH: &str = "extract-text-from-image";
/// Path of the post generation endpoint, relative to the API base URL
pub const GENERATE_POST_PATH: &str = "generate-post";

/// All outbound gateways a session needs
#[derive(Debug, Clone)]
pub struct Gateways {
    pub extraction: ExtractionGateway,
    pub generation: GenerationGateway,
    pub export: ExportGateway,
}

impl Gateways {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            extraction: ExtractionGateway::new(config.endpoint_url(EXTRACT_TEXT_PATH)),
            generation: GenerationGateway::new(config.endpoint_url(GENERATE_POST_PATH)),
            export: ExportGateway::new(config.webhook_url.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Turn a failed endpoint response into the richest error available.
async fn failure_from_response(response: Response) -> PostError {
    let status = response.status();
    match response.text().await {
        Ok(body) => failure_from_body(status, &body),
        Err(e) => e.into(),
    }
}

/// Prefer the structured `error` field, then the raw body; an empty body
/// (or a gateway timeout) most likely means the upstream call timed out.
fn failure_from_body(status: StatusCode, body: &str) -> PostError {
    warn!("Endpoint returned {}: {}", status, body);

    if status == StatusCode::GATEWAY_TIMEOUT || body.trim().is_empty() {
        return PostError::TimeoutLikely;
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.trim().is_empty() => PostError::Gateway(parsed.error),
        _ => PostError::Gateway(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_error_field_wins() {
        let err = failure_from_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "Failed to generate post: quota"}"#,
        );
        assert_eq!(err.to_string(), "Failed to generate post: quota");
    }

    #[test]
    fn test_raw_body_fallback() {
        let err = failure_from_body(StatusCode::BAD_GATEWAY, "<html>Bad gateway</html>");
        assert!(matches!(err, PostError::Gateway(ref body) if body == "<html>Bad gateway</html>"));
    }

    #[test]
    fn test_empty_body_is_timeout() {
        let err = failure_from_body(StatusCode::INTERNAL_SERVER_ERROR, "  ");
        assert!(matches!(err, PostError::TimeoutLikely));
    }

    #[test]
    fn test_gateway_timeout_status_is_timeout() {
        let err = failure_from_body(StatusCode::GATEWAY_TIMEOUT, "upstream timed out");
        assert!(matches!(err, PostError::TimeoutLikely));
    }

    #[test]
    fn test_gateways_from_config() {
        let mut config = AppConfig::default();
        config.api_base_url = "http://localhost:8080/api".to_string();
        config.webhook_url = "http://localhost:9090/hook".to_string();

        let gateways = Gateways::from_config(&config);
        assert_eq!(
            gateways.extraction.endpoint(),
            "http://localhost:8080/api/extract-text-from-image"
        );
        assert_eq!(
            gateways.generation.endpoint(),
            "http://localhost:8080/api/generate-post"
        );
        assert_eq!(gateways.export.webhook_url(), "http://localhost:9090/hook");
    }
}
