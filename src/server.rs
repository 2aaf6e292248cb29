//! HTTP endpoints holding the AI credential: text extraction and post generation.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use log::{error, info, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::PostError;
use crate::gateways::{EXTRACT_TEXT_PATH, GENERATE_POST_PATH};
use crate::model::ImagePayload;
use crate::pipelines::{self, GenerationContract};
use crate::providers::{GenerativeModel, GoogleProvider};

/// MIME type assumed when an extraction request does not name one.
pub const DEFAULT_EXTRACTION_MIME_TYPE: &str = "image/jpeg";

const MISSING_KEY_MESSAGE: &str = "API key is not configured on the server.";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractTextBody {
    image: Option<String>,
    mime_type: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractTextResponse {
    extracted_text: String,
}

#[derive(Debug, Deserialize)]
struct GeneratePostBody {
    #[serde(default)]
    text: String,
    #[serde(default)]
    images: Vec<ImagePayload>,
}

/// Request body limit applied unless the configuration says otherwise.
pub const DEFAULT_BODY_LIMIT: usize = 6 * 1024 * 1024;

/// Shared handler state; `model` is absent when no API key is configured.
#[derive(Clone)]
pub struct AppState {
    model: Option<Arc<dyn GenerativeModel>>,
    contract: Arc<GenerationContract>,
    body_limit: usize,
}

impl AppState {
    pub fn new(model: Option<Arc<dyn GenerativeModel>>, contract: GenerationContract) -> Self {
        Self {
            model,
            contract: Arc::new(contract),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    pub fn with_body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = bytes;
        self
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let model: Option<Arc<dyn GenerativeModel>> = match GoogleProvider::new(&config.gemini) {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => {
                warn!("{}; endpoints will refuse all requests", e);
                None
            }
        };
        Self::new(model, GenerationContract::from(config)).with_body_limit(config.max_body_bytes)
    }

    fn model(&self) -> Result<&dyn GenerativeModel, PostError> {
        self.model
            .as_deref()
            .ok_or_else(|| PostError::Configuration(MISSING_KEY_MESSAGE.to_string()))
    }
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn parse_body<T: DeserializeOwned>(body: Result<Bytes, BytesRejection>) -> Result<T, Response> {
    let body = body.map_err(|rejection| {
        let status = rejection.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            warn!("Rejected request body: {}", rejection.body_text());
            error_response(status, "Request body is too large.")
        } else {
            error_response(status, rejection.body_text())
        }
    })?;
    if body.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "Request body is missing.",
        ));
    }
    serde_json::from_slice(&body).map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", e),
        )
    })
}

async fn method_not_allowed(State(state): State<AppState>) -> Response {
    // A missing credential outranks the method check
    if let Err(e) = state.model() {
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed")
}

async fn extract_text_from_image(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let model = match state.model() {
        Ok(model) => model,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let request: ExtractTextBody = match parse_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    let Some(data) = request.image.filter(|image| !image.is_empty()) else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Image data is missing from the request.",
        );
    };
    // Accept a whole data URI as well as a bare base64 payload
    let mut payload = if data.starts_with("data:") {
        match ImagePayload::from_data_uri(&data) {
            Ok(payload) => payload,
            Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
        }
    } else {
        ImagePayload::new(DEFAULT_EXTRACTION_MIME_TYPE, data)
    };
    if let Some(mime_type) = request.mime_type {
        payload.mime_type = mime_type;
    }

    info!("Extracting text from {} image", payload.mime_type);
    match pipelines::image::extract_text(model, payload).await {
        Ok(extracted_text) => Json(ExtractTextResponse { extracted_text }).into_response(),
        Err(e) => {
            error!("Error extracting text from image: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to extract text: {}", e),
            )
        }
    }
}

async fn generate_post(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let model = match state.model() {
        Ok(model) => model,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };

    let request: GeneratePostBody = match parse_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    if request.text.trim().is_empty() && request.images.is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Recipe text or images are required.",
        );
    }

    info!(
        "Generating post from {} chars and {} image(s)",
        request.text.len(),
        request.images.len()
    );
    match pipelines::text::generate_post(model, &state.contract, &request.text, request.images)
        .await
    {
        Ok(post) => Json(post).into_response(),
        Err(e) => {
            error!("Error generating post: {}", e);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate post: {}", e),
            )
        }
    }
}

/// Routes, mounted under `/api`.
pub fn router(state: AppState) -> Router {
    let body_limit = state.body_limit;
    Router::new()
        .route(
            &format!("/api/{}", EXTRACT_TEXT_PATH),
            post(extract_text_from_image).fallback(method_not_allowed),
        )
        .route(
            &format!("/api/{}", GENERATE_POST_PATH),
            post(generate_post).fallback(method_not_allowed),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind to the configured address and serve until the process stops.
pub async fn serve(config: &AppConfig) -> Result<(), PostError> {
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(AppState::from_config(config))).await?;
    Ok(())
}
