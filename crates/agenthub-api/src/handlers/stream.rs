use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, Sse},
    Json,
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use agenthub_agents::ImageAnalysisAgent;
use agenthub_types::{AnalysisChunk, ChatThreadRequest};
use crate::{
    error::ApiResult,
    models::{AnalysisChunkBody, ChatRequestBody},
    routes::chat::image_request,
    state::AppState,
};

const CHUNK_BUFFER: usize = 64;

/// Analyze equipment images, streaming text as it is generated
#[utoipa::path(
    post,
    path = "/image-analysis-stream",
    request_body = ChatRequestBody,
    responses(
        (status = 200, description = "Stream of analysis chunks", content_type = "text/event-stream", body = AnalysisChunkBody),
        (status = 400, description = "No images provided")
    ),
    tag = "image-analysis"
)]
pub async fn image_analysis_stream(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChatRequestBody>, JsonRejection>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Json(body) = payload?;
    let request = image_request(body)?;
    tracing::info!(images = request.images().len(), "Streaming image analysis request received");

    let chunks = ReceiverStream::new(spawn_analysis(Arc::clone(&state.image_agent), request));

    let sse_stream = chunks.map(|chunk| {
        let event = Event::default().json_data(&chunk).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode analysis chunk");
            Event::default().comment("encoding error")
        });
        Ok::<Event, Infallible>(event)
    });

    Ok(Sse::new(sse_stream))
}

/// Run the analysis in its own task, forwarding fragments over a bounded channel
///
/// The task stops pulling from the model as soon as the receiver is dropped.
/// When the fragments run out, a final `end` chunk carries the full text.
pub fn spawn_analysis(
    agent: Arc<ImageAnalysisAgent>,
    request: ChatThreadRequest,
) -> mpsc::Receiver<AnalysisChunk> {
    let (tx, rx) = mpsc::channel(CHUNK_BUFFER);

    tokio::spawn(async move {
        let mut fragments = agent.analyze_images_stream(request);
        let mut full_response = String::new();

        loop {
            let fragment = tokio::select! {
                _ = tx.closed() => {
                    tracing::info!("Client disconnected, stopping image analysis");
                    return;
                }
                next = fragments.next() => next,
            };

            let Some(fragment) = fragment else {
                break;
            };

            full_response.push_str(&fragment);
            if tx.send(AnalysisChunk::text(fragment)).await.is_err() {
                return;
            }
        }

        let _ = tx.send(AnalysisChunk::end(full_response)).await;
    });

    rx
}
