//! Image generation endpoint.
//!
//! Accepts JSON (`{prompt?, images?}` with data-URL strings) or multipart
//! (`prompt` text field + up to 9 `images` file parts), forwards one
//! chat-completion request to the AI router, and answers with the extracted
//! image URLs.

use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use banana_core::generate::{
    build_chat_completion_request, extract, files_to_data_urls, GenerationInput, UploadedImage,
    MAX_IMAGES,
};
use banana_core::AppError;

use super::error::ApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct GenerateResponse {
    pub images: Vec<String>,
}

/// POST /api/generate
pub async fn handle_generate(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<GenerateResponse>, ApiError> {
    if !state.inner.openrouter.has_api_key() {
        return Err(AppError::Config("Missing OPENROUTER_API_KEY".to_string()).into());
    }

    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let input = if content_type.contains("application/json") {
        input_from_json(request).await?
    } else if content_type.contains("multipart/form-data") {
        input_from_multipart(&state, request).await?
    } else {
        return Err(AppError::UnsupportedMediaType.into());
    };

    input.validate().map_err(ApiError::from)?;

    info!(
        "[generate] prompt_len={} images={}",
        input.prompt.len(),
        input.image_data_urls.len()
    );

    let payload = build_chat_completion_request(&input);
    let response = state.inner.openrouter.chat_completion(&payload).await?;

    let images = extract::extract_image_urls(&response);
    if images.is_empty() {
        return Err(AppError::NoImages {
            debug: extract::debug_snapshot(&response),
        }
        .into());
    }

    info!("[generate] extracted {} image(s)", images.len());
    Ok(Json(GenerateResponse { images }))
}

async fn input_from_json(request: Request) -> Result<GenerationInput, ApiError> {
    // Raw body reads do not go through the extractor body limit; enforce the
    // same cap here.
    let bytes = axum::body::to_bytes(request.into_body(), crate::router::MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, "Request body too large.")
                .detail(e.to_string())
        })?;
    let body: Value = serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::bad_request("Invalid JSON body."))?;
    Ok(GenerationInput::from_json(&body))
}

async fn input_from_multipart(
    state: &AppState,
    request: Request,
) -> Result<GenerationInput, ApiError> {
    let mut multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| ApiError::bad_request("Invalid multipart body.").detail(e.to_string()))?;

    let mut prompt = String::new();
    let mut files: Vec<UploadedImage> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request("Multipart error.").detail(e.to_string()))?
    {
        match field.name().unwrap_or("") {
            "prompt" => {
                prompt = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request("Prompt read error.").detail(e.to_string()))?
                    .trim()
                    .to_string();
            }
            "images" => {
                // Extra uploads past the cap are consumed and dropped.
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request("Image read error.").detail(e.to_string()))?;
                if files.len() < MAX_IMAGES {
                    files.push(UploadedImage {
                        bytes: bytes.to_vec(),
                        content_type,
                    });
                }
            }
            _ => {}
        }
    }

    let image_data_urls = files_to_data_urls(files).await;
    Ok(GenerationInput { prompt, image_data_urls })
}
