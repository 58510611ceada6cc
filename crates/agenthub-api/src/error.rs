use agenthub_agents::AgentError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0:#}")]
    Agent(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::InvalidRequest(message) => ApiError::BadRequest(message),
            AgentError::Configuration(message) => ApiError::Config(message),
            AgentError::Remote(e) => ApiError::Agent(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::Agent(_) | ApiError::Config(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Internal server error: {}", self),
                )
            }
        };

        let body = Json(json!({
            "detail": detail
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    async fn detail(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        value["detail"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_invalid_request_maps_to_bad_request() {
        let err = ApiError::from(AgentError::InvalidRequest("No messages found in request.".into()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(detail(response).await, "No messages found in request.");
    }

    #[tokio::test]
    async fn test_remote_failure_keeps_context_chain() {
        let remote = anyhow::anyhow!("Azure AI Agents API error (404 Not Found): missing")
            .context("Failed to start agent run");
        let response = ApiError::from(AgentError::Remote(remote)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            detail(response).await,
            "Internal server error: Failed to start agent run: Azure AI Agents API error (404 Not Found): missing"
        );
    }
}
