pub mod builder;
pub mod config;
pub mod editor;
pub mod error;
pub mod gateways;
pub mod media;
pub mod model;
pub mod pipelines;
pub mod providers;
pub mod server;
pub mod session;

use std::path::Path;

pub use builder::{GenerationResult, InputSource, OutputMode, PostGenerator, PostGeneratorBuilder};
pub use config::AppConfig;
pub use error::PostError;
pub use gateways::{ExportGateway, ExtractionGateway, Gateways, GenerationGateway};
pub use model::{ImagePayload, PostContent, PostField, RequestState};
pub use session::{InputMode, Session};

/// Generate a post from recipe text using configuration from file/environment.
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let post = recipe_post::generate_post_from_text("Рецепт №12: ...").await?;
/// println!("{}", post.title);
/// # Ok(())
/// # }
/// ```
pub async fn generate_post_from_text(text: &str) -> Result<PostContent, PostError> {
    match PostGenerator::builder().text(text).build().await? {
        GenerationResult::Post(post) => Ok(post),
        GenerationResult::Text(_) => Err(PostError::Builder(
            "Unexpected text result for text input".to_string(),
        )),
    }
}

/// Extract the text printed on a recipe image.
pub async fn extract_text_from_image(path: impl AsRef<Path>) -> Result<String, PostError> {
    match PostGenerator::builder()
        .image(path.as_ref())
        .extract_only()
        .build()
        .await?
    {
        GenerationResult::Text(text) => Ok(text),
        GenerationResult::Post(_) => Err(PostError::Builder(
            "Unexpected post result for extract-only run".to_string(),
        )),
    }
}
