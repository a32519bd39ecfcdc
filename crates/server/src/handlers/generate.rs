//! # Prompt Generation Handler

use super::{AppError, AppState};
use crate::types::{GeneratePromptRequest, GeneratePromptResponse, PromptMetadata};
use axum::{extract::State, Json};
use axum_extra::extract::WithRejection;
use tracing::info;

/// Writes a new extraction prompt from a task description: `{query, temperature?}`.
pub async fn generate_prompt_handler(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<GeneratePromptRequest>, AppError>,
) -> Result<Json<GeneratePromptResponse>, AppError> {
    let query = payload.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("'query' must not be empty.".to_string()));
    }
    if let Some(temperature) = payload.temperature {
        if !(0.0..=1.0).contains(&temperature) {
            return Err(AppError::BadRequest(format!(
                "'temperature' must be between 0.0 and 1.0, got {temperature}."
            )));
        }
    }

    info!(query = %query, "Received prompt generation request");
    let generated = app_state
        .generator
        .generate_extraction_prompt(query, payload.temperature)
        .await;
    info!(source = ?generated.source, "Generated extraction prompt");

    Ok(Json(GeneratePromptResponse {
        prompt: generated.prompt,
        metadata: PromptMetadata {
            query: query.to_string(),
            source: generated.source,
            model: generated.model,
            temperature: payload.temperature,
        },
    }))
}
