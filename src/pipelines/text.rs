use log::{debug, info, warn};
use serde::Deserialize;

use super::GenerationContract;
use crate::error::PostError;
use crate::model::{ImagePayload, PostContent};
use crate::providers::{
    build_generation_text, missing_hashtags, GenerativeModel, ModelRequest, Part, Task,
};

/// Shape the model is told to answer with.
#[derive(Debug, Deserialize)]
struct ModelReply {
    post_content: PostContent,
}

/// Generate a post from recipe text and optional inline images.
///
/// Images are sent first, in order, followed by the wrapped text.
pub async fn generate_post(
    model: &dyn GenerativeModel,
    contract: &GenerationContract,
    text: &str,
    images: Vec<ImagePayload>,
) -> Result<PostContent, PostError> {
    let mut parts: Vec<Part> = images.into_iter().map(Part::Image).collect();
    parts.push(Part::Text(build_generation_text(text)));

    let request = ModelRequest::new(Task::GeneratePost, parts)
        .with_system_instruction(contract.system_prompt.clone())
        .with_response_schema(contract.response_schema.clone());

    let reply = model.generate(request).await?;
    debug!("Model reply: {}", reply);

    let post = parse_post_reply(&reply)?;
    info!(
        "Generated post {} using {}",
        post.number,
        model.provider_name()
    );

    Ok(post)
}

/// Validate a raw model reply and turn it into a sanitized post.
pub fn parse_post_reply(reply: &str) -> Result<PostContent, PostError> {
    let value: serde_json::Value = serde_json::from_str(reply)
        .map_err(|e| PostError::SchemaViolation(format!("reply is not JSON: {}", e)))?;

    if value.get(crate::providers::POST_CONTENT_KEY).is_none() {
        return Err(PostError::SchemaViolation(
            "missing 'post_content' object".to_string(),
        ));
    }

    let reply: ModelReply =
        serde_json::from_value(value).map_err(|e| PostError::SchemaViolation(e.to_string()))?;

    let post = reply.post_content.sanitized();
    post.validate()?;

    let missing = missing_hashtags(&post.hashtags);
    if !missing.is_empty() {
        warn!("Post {} lacks mandatory hashtags: {}", post.number, missing.join(" "));
    }

    Ok(post)
}
