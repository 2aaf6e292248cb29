use std::path::PathBuf;

use crate::config::AppConfig;
use crate::model::PostContent;
use crate::pipelines::{self, GenerationContract};
use crate::providers::GoogleProvider;
use crate::{media, PostError};

/// Represents the input source for a recipe
#[derive(Debug, Clone)]
pub enum InputSource {
    /// Use plain recipe text
    Text(String),
    /// Use an image file (its text is extracted first)
    Image(PathBuf),
}

/// Represents the desired output
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputMode {
    /// Generate a full post (default)
    #[default]
    Post,
    /// Only extract text from the image
    ExtractOnly,
}

/// Result of a generation run
#[derive(Debug, Clone)]
pub enum GenerationResult {
    /// Structured post
    Post(PostContent),
    /// Text extracted from an image
    Text(String),
}

/// Builder for configuring and running a generation directly against Gemini
#[derive(Debug, Default)]
pub struct PostGeneratorBuilder {
    source: Option<InputSource>,
    mode: OutputMode,
    config: Option<AppConfig>,
    api_key: Option<String>,
    model: Option<String>,
}

impl PostGeneratorBuilder {
    /// Set the input source to plain text
    ///
    /// # Example
    /// ```
    /// use recipe_post::PostGenerator;
    ///
    /// let builder = PostGenerator::builder()
    ///     .text("Рецепт №12: салат из свёклы с черносливом");
    /// ```
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.source = Some(InputSource::Text(text.into()));
        self
    }

    /// Set the input source to an image file
    ///
    /// The image is normalized, its text extracted by the vision model,
    /// then the text is turned into a post.
    ///
    /// # Example
    /// ```
    /// use recipe_post::PostGenerator;
    ///
    /// let builder = PostGenerator::builder()
    ///     .image("/path/to/book-page.jpg");
    /// ```
    pub fn image(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = Some(InputSource::Image(path.into()));
        self
    }

    /// Stop after text extraction (image input only)
    pub fn extract_only(mut self) -> Self {
        self.mode = OutputMode::ExtractOnly;
        self
    }

    /// Use this configuration instead of loading one from file/environment
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the API key directly instead of relying on config or environment
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the Gemini model used for both calls
    ///
    /// # Example
    /// ```
    /// use recipe_post::PostGenerator;
    ///
    /// let builder = PostGenerator::builder()
    ///     .text("Рецепт №3: омлет на пару")
    ///     .model("gemini-2.5-pro");
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Build and run the generation
    ///
    /// # Errors
    /// Returns `PostError` if:
    /// - No input source was specified, or the text is empty
    /// - `extract_only()` was combined with text input
    /// - No API key is available
    /// - The image cannot be read or normalized
    /// - A model call fails or the reply violates the post schema
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_post::PostGenerator;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let result = PostGenerator::builder()
    ///     .text("Рецепт №12: ...")
    ///     .build()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<GenerationResult, PostError> {
        // Validate before touching config or network
        let source = self.source.ok_or_else(|| {
            PostError::Builder("No input source specified. Use .text() or .image()".to_string())
        })?;

        if let (InputSource::Text(_), OutputMode::ExtractOnly) = (&source, self.mode) {
            return Err(PostError::Builder(
                "Cannot use extract_only() with text input. Only images have text to extract."
                    .to_string(),
            ));
        }
        if let InputSource::Text(text) = &source {
            if text.trim().is_empty() {
                return Err(PostError::Validation(
                    "Recipe text cannot be empty".to_string(),
                ));
            }
        }

        let mut config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };
        if let Some(key) = self.api_key {
            config.gemini.api_key = Some(key);
        }
        if let Some(model) = self.model {
            config.gemini.vision_model = model.clone();
            config.gemini.model = model;
        }

        let provider = GoogleProvider::new(&config.gemini)?;
        let contract = GenerationContract::from(&config);

        let text = match source {
            InputSource::Text(text) => text,
            InputSource::Image(path) => {
                let payload = media::normalize_file(&path).await?;
                let text = pipelines::image::extract_text(&provider, payload).await?;
                if let OutputMode::ExtractOnly = self.mode {
                    return Ok(GenerationResult::Text(text));
                }
                if text.trim().is_empty() {
                    return Err(PostError::Validation(
                        "No text detected in image".to_string(),
                    ));
                }
                text
            }
        };

        let post = pipelines::text::generate_post(&provider, &contract, &text, Vec::new()).await?;
        Ok(GenerationResult::Post(post))
    }
}

/// Main entry point for the builder API
pub struct PostGenerator;

impl PostGenerator {
    /// Creates a new builder
    ///
    /// # Example
    /// ```
    /// use recipe_post::PostGenerator;
    ///
    /// let builder = PostGenerator::builder();
    /// ```
    pub fn builder() -> PostGeneratorBuilder {
        PostGeneratorBuilder::default()
    }
}
