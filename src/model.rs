use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PostError;

/// One generated Instagram post.
///
/// Field names on the wire are the Russian keys the prompt and the
/// spreadsheet expect; every field is required when deserializing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostContent {
    /// Recipe identifier taken from the source
    #[serde(rename = "Номер")]
    pub number: String,
    #[serde(rename = "Заголовок")]
    pub title: String,
    /// Ingredients and steps, one list item per line
    #[serde(rename = "Рецепт")]
    pub recipe: String,
    #[serde(rename = "Совет")]
    pub tip: String,
    /// Estimated nutrition per serving
    #[serde(rename = "ДопИнфа")]
    pub nutrition: String,
    #[serde(rename = "Диеты")]
    pub diets: String,
    /// Prompt for the post illustration
    #[serde(rename = "Промпт")]
    pub image_prompt: String,
    #[serde(rename = "Хэштеги")]
    pub hashtags: String,
}

impl PostContent {
    pub fn get(&self, field: PostField) -> &str {
        match field {
            PostField::Number => &self.number,
            PostField::Title => &self.title,
            PostField::Recipe => &self.recipe,
            PostField::Tip => &self.tip,
            PostField::Nutrition => &self.nutrition,
            PostField::Diets => &self.diets,
            PostField::ImagePrompt => &self.image_prompt,
            PostField::Hashtags => &self.hashtags,
        }
    }

    pub(crate) fn get_mut(&mut self, field: PostField) -> &mut String {
        match field {
            PostField::Number => &mut self.number,
            PostField::Title => &mut self.title,
            PostField::Recipe => &mut self.recipe,
            PostField::Tip => &mut self.tip,
            PostField::Nutrition => &mut self.nutrition,
            PostField::Diets => &mut self.diets,
            PostField::ImagePrompt => &mut self.image_prompt,
            PostField::Hashtags => &mut self.hashtags,
        }
    }

    /// Check the guarantees a freshly generated post must satisfy.
    ///
    /// Every field must be non-blank and the nutrition estimate must carry
    /// at least one number; "on request" style answers are rejected.
    pub fn validate(&self) -> Result<(), PostError> {
        for field in PostField::ALL {
            if self.get(field).trim().is_empty() {
                return Err(PostError::SchemaViolation(format!(
                    "field '{}' is empty",
                    field.key()
                )));
            }
        }

        if !self.nutrition.chars().any(|c| c.is_ascii_digit()) {
            return Err(PostError::SchemaViolation(format!(
                "field '{}' has no numeric values: {}",
                PostField::Nutrition.key(),
                self.nutrition
            )));
        }

        Ok(())
    }

    /// Normalize line breaks in the multi-line fields.
    pub fn sanitized(mut self) -> Self {
        for field in PostField::MULTILINE {
            let value = self.get_mut(field);
            *value = sanitize_text(value);
        }
        self
    }
}

/// Addressable fields of a [`PostContent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostField {
    Number,
    Title,
    Recipe,
    Tip,
    Nutrition,
    Diets,
    ImagePrompt,
    Hashtags,
}

impl PostField {
    pub const ALL: [PostField; 8] = [
        PostField::Number,
        PostField::Title,
        PostField::Recipe,
        PostField::Tip,
        PostField::Nutrition,
        PostField::Diets,
        PostField::ImagePrompt,
        PostField::Hashtags,
    ];

    /// Fields whose line breaks are normalized after generation
    pub const MULTILINE: [PostField; 2] = [PostField::Recipe, PostField::Tip];

    /// JSON key used by the prompt, the endpoints and the webhook
    pub fn key(&self) -> &'static str {
        match self {
            PostField::Number => "Номер",
            PostField::Title => "Заголовок",
            PostField::Recipe => "Рецепт",
            PostField::Tip => "Совет",
            PostField::Nutrition => "ДопИнфа",
            PostField::Diets => "Диеты",
            PostField::ImagePrompt => "Промпт",
            PostField::Hashtags => "Хэштеги",
        }
    }
}

impl fmt::Display for PostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for PostField {
    type Err = PostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| PostError::Validation(format!("Unknown post field: {}", s)))
    }
}

/// Convert `<br>` tags and literal `\n` escapes into real newlines.
///
/// Applying it twice gives the same result as applying it once.
pub fn sanitize_text(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(c) = rest.chars().next() {
        if let Some(len) = br_tag_len(rest) {
            output.push('\n');
            rest = &rest[len..];
        } else if rest.starts_with("\\n") {
            output.push('\n');
            rest = &rest[2..];
        } else {
            output.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    output
}

/// Byte length of a `<br>`, `<br/>` or `<br />` tag (any case) at the start of `s`.
fn br_tag_len(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    if bytes.len() < 4 || bytes[0] != b'<' || !bytes[1..3].eq_ignore_ascii_case(b"br") {
        return None;
    }

    let mut i = 3;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i < bytes.len() && bytes[i] == b'/' {
        i += 1;
    }
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }

    (i < bytes.len() && bytes[i] == b'>').then_some(i + 1)
}

/// An image ready for transport: MIME type plus base64 payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    pub mime_type: String,
    pub data: String,
}

impl ImagePayload {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Split a `data:<mime>;base64,<payload>` URI into its parts.
    pub fn from_data_uri(uri: &str) -> Result<Self, PostError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| PostError::MediaProcessing("not a data URI".to_string()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| PostError::MediaProcessing("data URI has no payload".to_string()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| PostError::MediaProcessing("data URI is not base64".to_string()))?;

        Ok(Self::new(mime_type, data))
    }
}

/// Status of one kind of operation (extraction, generation, export).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Success,
    Error(String),
}

impl RequestState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, RequestState::InFlight)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            RequestState::Error(message) => Some(message),
            _ => None,
        }
    }
}
