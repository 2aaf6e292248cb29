use thiserror::Error;

/// Shown to the user when an upstream call most likely timed out.
pub const TIMEOUT_ADVICE: &str = "Время ожидания ответа от сервера истекло. Это может случиться со сложными рецептами. Пожалуйста, попробуйте еще раз.";

/// Errors that can occur while turning a recipe into a post
#[derive(Error, Debug)]
pub enum PostError {
    /// Missing credential or unusable server configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Required input was empty; raised before any network call
    #[error("{0}")]
    Validation(String),

    /// The selected image could not be decoded or re-encoded
    #[error("Failed to process image: {0}")]
    MediaProcessing(String),

    /// An AI call or one of our endpoints rejected the request
    #[error("{0}")]
    Gateway(String),

    /// The AI reply did not match the declared post schema
    #[error("Invalid JSON structure in AI response: {0}")]
    SchemaViolation(String),

    /// Failure with an empty body, or a gateway timeout status
    #[error("The server returned an empty response, the request possibly timed out")]
    TimeoutLikely,

    /// The spreadsheet webhook answered with a non-success status
    #[error("Ошибка сервера: {status} {status_text}. {body}")]
    Export {
        status: u16,
        status_text: String,
        body: String,
    },

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// Transport-level failure
    #[error("Request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// Malformed JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file access failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file or environment could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl From<image::ImageError> for PostError {
    fn from(err: image::ImageError) -> Self {
        PostError::MediaProcessing(err.to_string())
    }
}

impl PostError {
    /// Text to show next to the control that triggered the failed operation.
    pub fn user_message(&self) -> String {
        match self {
            PostError::TimeoutLikely => TIMEOUT_ADVICE.to_string(),
            other => other.to_string(),
        }
    }
}
