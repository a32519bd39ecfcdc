//! # Extraction Handlers
//!
//! Endpoints that assemble extraction prompts and run them against the
//! configured AI provider.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::AssembleResponse;
use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::{Multipart, WithRejection};
use metaprompt::{assemble, load_bytes, DocumentType, ExtractionRequest, ExtractionResult};
use serde_json::json;
use tracing::{info, warn};

/// Extracts structured data from document text: `{documentType, content}`.
pub async fn extract_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    WithRejection(Json(payload), _): WithRejection<Json<ExtractionRequest>, AppError>,
) -> Result<Json<ApiResponse<ExtractionResult>>, AppError> {
    info!(
        kind = %payload.document_type,
        chars = payload.content.chars().count(),
        "Received extraction request"
    );
    run_extraction(&app_state, debug_params, payload).await
}

/// Extracts structured data from an uploaded file.
///
/// Image uploads are sent to the model as an attachment. Expects the multipart fields `file` and `documentType`.
pub async fn extract_file_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ExtractionResult>>, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut document_type: Option<DocumentType> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.txt").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read upload: {e}")))?;
                info!(file_name = %file_name, bytes = bytes.len(), "Received document upload");
                file = Some((file_name, bytes.to_vec()));
            }
            "documentType" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid documentType: {e}")))?;
                document_type = Some(DocumentType::new(text));
            }
            _ => warn!("Ignoring unknown multipart field: {}", name),
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::BadRequest("Missing multipart field 'file'.".to_string()))?;
    let document_type = document_type.ok_or_else(|| {
        AppError::BadRequest("Missing multipart field 'documentType'.".to_string())
    })?;

    let document = load_bytes(&file_name, &bytes)?;
    let request = match document.image {
        Some(image) => ExtractionRequest::from_image(document_type, image),
        None => ExtractionRequest::new(document_type, document.content),
    };
    run_extraction(&app_state, debug_params, request).await
}

/// Returns the prompt that `/extract` would send, without calling the provider.
pub async fn assemble_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    WithRejection(Json(payload), _): WithRejection<Json<ExtractionRequest>, AppError>,
) -> Result<Json<ApiResponse<AssembleResponse>>, AppError> {
    let prompt = assemble(&app_state.store, &payload.document_type, &payload.content)?;
    let debug_info = Some(json!({ "documentType": prompt.document_type() }));
    Ok(wrap_response(
        AssembleResponse {
            prompt: prompt.into_string(),
        },
        debug_params,
        debug_info,
    ))
}

async fn run_extraction(
    app_state: &AppState,
    debug_params: Query<DebugParams>,
    request: ExtractionRequest,
) -> Result<Json<ApiResponse<ExtractionResult>>, AppError> {
    let (outcome, lifecycle) = app_state
        .extractor
        .run(&request)
        .await
        .map_err(|failure| AppError::Prompt(failure.error))?;

    let debug_info = if debug_params.debug.unwrap_or(false) {
        Some(json!({
            "requestId": outcome.request_id,
            "model": app_state.extractor.client().model(),
            "trail": lifecycle.trail(),
            "rawResponse": outcome.raw_response,
        }))
    } else {
        None
    };
    Ok(wrap_response(outcome.result, debug_params, debug_info))
}
