use log::debug;

use crate::error::PostError;
use crate::model::ImagePayload;
use crate::providers::{GenerativeModel, ModelRequest, Part, Task, EXTRACTION_INSTRUCTION};

/// Ask a vision model for the text visible on one image.
///
/// The reply is returned verbatim; no trimming or validation is applied.
pub async fn extract_text(
    model: &dyn GenerativeModel,
    image: ImagePayload,
) -> Result<String, PostError> {
    let request = ModelRequest::new(
        Task::ExtractText,
        vec![
            Part::Text(EXTRACTION_INSTRUCTION.to_string()),
            Part::Image(image),
        ],
    );

    let text = model.generate(request).await?;
    debug!("Extracted text from image: {} characters", text.len());

    Ok(text)
}
