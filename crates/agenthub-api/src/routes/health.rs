use axum::Json;

use crate::models::{RootResponse, StatusResponse};

/// Service status
#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Service is running", body = StatusResponse)
    ),
    tag = "health"
)]
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "healthy".to_string(),
        message: "Service is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Index of the available endpoints
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Endpoint index", body = RootResponse)
    ),
    tag = "health"
)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Agent Hub API".to_string(),
        status_endpoint: "/status".to_string(),
        chat_endpoint: "/chat".to_string(),
        image_analysis_endpoint: "/image-analysis".to_string(),
        image_analysis_stream_endpoint: "/image-analysis-stream".to_string(),
        docs: "/docs".to_string(),
    })
}
