use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::Config,
    handlers::stream,
    middleware::logging,
    models::{
        AnalysisChunkBody, ChatRequestBody, ChatResponseBody, FileBody, ImageFileBody,
        RootResponse, SourceBody, StatusResponse,
    },
    routes::{chat, health},
    state::AppState,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(OpenApi)]
#[openapi(
    info(title = "Agent Hub API", description = "Chat and image analysis over Azure AI agents"),
    paths(
        health::root,
        health::status,
        chat::chat,
        chat::image_analysis,
        stream::image_analysis_stream,
    ),
    components(schemas(
        ChatRequestBody,
        ImageFileBody,
        ChatResponseBody,
        SourceBody,
        FileBody,
        StatusResponse,
        RootResponse,
        AnalysisChunkBody,
    )),
    tags(
        (name = "health", description = "Liveness and endpoint index"),
        (name = "chat", description = "Agent chat with file search"),
        (name = "image-analysis", description = "Equipment label analysis")
    )
)]
pub struct ApiDoc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health
        .route("/", get(health::root))
        .route("/status", get(health::status))
        // Chat
        .route("/chat", post(chat::chat))
        // Image analysis
        .route("/image-analysis", post(chat::image_analysis))
        .route("/image-analysis-stream", post(stream::image_analysis_stream));

    Router::new()
        .merge(api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors.allow_origin(Any)
        } else {
            let parsed_origins: Vec<axum::http::HeaderValue> = config.cors.origins
                .iter()
                .filter_map(|o| o.parse::<axum::http::HeaderValue>().ok())
                .collect();

            cors.allow_origin(parsed_origins)
        }
    } else {
        CorsLayer::permissive()
    }
}
