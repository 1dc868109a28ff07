//! Generation request normalization and upstream payload construction.
//!
//! Clients reach the generation endpoint in two shapes (JSON with data-URL
//! strings, multipart with raw file uploads). Both are folded into one
//! [`GenerationInput`] before anything upstream-specific happens.

pub mod extract;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};

/// The image-capable model every generation request targets.
pub const MODEL_ID: &str = "google/gemini-2.5-flash-image";

/// Hard cap on images per request; extras are silently dropped.
pub const MAX_IMAGES: usize = 9;

/// Uniform internal representation of a generation request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationInput {
    pub prompt: String,
    pub image_data_urls: Vec<String>,
}

impl GenerationInput {
    /// Build from a JSON body `{prompt?, images?}`. Non-string entries in
    /// `images` are dropped rather than rejected.
    pub fn from_json(body: &Value) -> Self {
        let prompt = body
            .get("prompt")
            .and_then(Value::as_str)
            .unwrap_or("")
            .trim()
            .to_string();
        let image_data_urls = body
            .get("images")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Self { prompt, image_data_urls }
    }

    /// A request with neither a usable prompt nor any image has nothing to
    /// send upstream.
    pub fn validate(&self) -> AppResult<()> {
        if self.prompt.is_empty() && self.image_data_urls.is_empty() {
            return Err(AppError::InvalidInput(
                "Provide a prompt or at least one image.".to_string(),
            ));
        }
        Ok(())
    }
}

/// A raw uploaded file from a multipart `images` field.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Encode one uploaded file as a `data:<mime>;base64,...` URL. Parts without
/// a content type are assumed to be PNG.
pub fn file_to_data_url(bytes: &[u8], content_type: Option<&str>) -> String {
    let mime = content_type.filter(|c| !c.is_empty()).unwrap_or("image/png");
    format!("data:{};base64,{}", mime, BASE64.encode(bytes))
}

/// Convert uploaded files to data-URLs, at most [`MAX_IMAGES`] of them.
/// Encoding runs concurrently across files; result order matches upload
/// order.
pub async fn files_to_data_urls(files: Vec<UploadedImage>) -> Vec<String> {
    let tasks: Vec<_> = files
        .into_iter()
        .take(MAX_IMAGES)
        .map(|file| {
            tokio::task::spawn_blocking(move || {
                file_to_data_url(&file.bytes, file.content_type.as_deref())
            })
        })
        .collect();

    futures::future::join_all(tasks)
        .await
        .into_iter()
        .filter_map(Result::ok)
        .collect()
}

/// Build the upstream chat-completion payload for a normalized input.
///
/// The upstream rejects empty text parts, so an image-only request sends a
/// single space as its prompt.
pub fn build_chat_completion_request(input: &GenerationInput) -> Value {
    let mut content = vec![json!({
        "type": "text",
        "text": if input.prompt.is_empty() { " " } else { input.prompt.as_str() },
    })];
    for url in input.image_data_urls.iter().take(MAX_IMAGES) {
        content.push(json!({
            "type": "image_url",
            "image_url": { "url": url },
        }));
    }

    json!({
        "model": MODEL_ID,
        "messages": [{ "role": "user", "content": content }],
        "modalities": ["image", "text"],
    })
}
