use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use agenthub_types::ChatThreadRequest;
use crate::{
    error::{ApiError, ApiResult},
    models::{ChatRequestBody, ChatResponseBody},
    state::AppState,
};

pub(crate) const NO_IMAGES: &str = "No images provided for analysis";

/// Convert the body and reject requests without images
pub(crate) fn image_request(body: ChatRequestBody) -> ApiResult<ChatThreadRequest> {
    let request = ChatThreadRequest::from(body);
    if request.images().is_empty() {
        return Err(ApiError::BadRequest(NO_IMAGES.to_string()));
    }
    Ok(request)
}

/// Run one chat turn against the hosted agent
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequestBody,
    responses(
        (status = 200, description = "Aggregated agent reply", body = ChatResponseBody),
        (status = 400, description = "Empty message"),
        (status = 500, description = "Agent failure")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> ApiResult<Json<ChatResponseBody>> {
    let Json(body) = payload?;
    let request = ChatThreadRequest::from(body);
    tracing::info!(
        thread_id = ?request.thread_id,
        has_file = request.file.is_some(),
        "Chat request received"
    );

    let result = state.chat_agent.run_chat(&request).await?;
    Ok(Json(result.into()))
}

/// Analyze equipment images and return the full answer
#[utoipa::path(
    post,
    path = "/image-analysis",
    request_body = ChatRequestBody,
    responses(
        (status = 200, description = "Analysis result", body = ChatResponseBody),
        (status = 400, description = "No images provided")
    ),
    tag = "image-analysis"
)]
pub async fn image_analysis(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> ApiResult<Json<ChatResponseBody>> {
    let Json(body) = payload?;
    let request = image_request(body)?;
    tracing::info!(images = request.images().len(), "Image analysis request received");

    let result = state.image_agent.analyze_images(&request).await;
    Ok(Json(result.into()))
}
