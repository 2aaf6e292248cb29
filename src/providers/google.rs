use crate::config::GeminiConfig;
use crate::error::PostError;
use crate::providers::{GenerativeModel, ModelRequest, Part, Task};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

pub struct GoogleProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    vision_model: String,
    temperature: f32,
}

impl GoogleProvider {
    /// Create a new Google Gemini provider from configuration
    pub fn new(config: &GeminiConfig) -> Result<Self, PostError> {
        // Try config first, then fall back to environment variables
        let api_key = config.resolve_api_key().ok_or_else(|| {
            PostError::Configuration(
                "GOOGLE_API_KEY not found in config or environment".to_string(),
            )
        })?;

        Ok(Self::with_api_key(api_key, config))
    }

    pub fn with_api_key(api_key: impl Into<String>, config: &GeminiConfig) -> Self {
        GoogleProvider {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            vision_model: config.vision_model.clone(),
            temperature: config.temperature,
        }
    }

    fn model_for(&self, task: Task) -> &str {
        match task {
            Task::ExtractText => &self.vision_model,
            Task::GeneratePost => &self.model,
        }
    }
}

fn request_body(request: &ModelRequest, temperature: f32) -> Value {
    let parts: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            Part::Text(text) => json!({ "text": text }),
            Part::Image(image) => json!({
                "inlineData": {
                    "mimeType": image.mime_type,
                    "data": image.data,
                }
            }),
        })
        .collect();

    let mut generation_config = json!({ "temperature": temperature });
    if let Some(schema) = &request.response_schema {
        generation_config["responseMimeType"] = json!("application/json");
        generation_config["responseSchema"] = schema.clone();
    }

    let mut body = json!({
        "contents": [{ "role": "user", "parts": parts }],
        "generationConfig": generation_config,
    });
    if let Some(instruction) = &request.system_instruction {
        body["systemInstruction"] = json!({ "parts": [{ "text": instruction }] });
    }

    body
}

#[async_trait]
impl GenerativeModel for GoogleProvider {
    fn provider_name(&self) -> &str {
        "google"
    }

    async fn generate(&self, request: ModelRequest) -> Result<String, PostError> {
        let model = self.model_for(request.task);
        // Google Gemini API endpoint
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );
        debug!(
            "Sending {:?} request with {} part(s) to {}",
            request.task,
            request.parts.len(),
            model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", &self.api_key)])
            .json(&request_body(&request, self.temperature))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(PostError::Gateway(format!(
                "Gemini API error ({}): {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;
        debug!("{:?}", response_body);

        let text = response_body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                PostError::Gateway("Failed to extract content from Gemini response".to_string())
            })?
            .to_string();

        Ok(text)
    }
}
