use std::pin::Pin;
use std::sync::Arc;

use agenthub_llm::{ChatClient, ChatRequest, ContentPart, Message, StreamEvent};
use agenthub_types::{ChatThreadRequest, RequestResult};
use futures::{Stream, StreamExt};

use crate::aggregator::format_function_call;
use crate::file_resolver::FileResolver;

pub const SYSTEM_PROMPT_FILE: &str = "image_analysis_system_prompt.txt";

pub const DEFAULT_INSTRUCTION: &str = "Please analyze the provided images and extract any serial numbers, model numbers, or part numbers from equipment labels.";

const NO_IMAGES_MESSAGE: &str = "No images provided for analysis.";

/// Vision agent extracting identifiers from equipment photos
///
/// Talks to a chat-completion deployment directly; there is no remote
/// thread, so results carry the caller's thread id or a local one.
#[derive(Clone)]
pub struct ImageAnalysisAgent {
    chat_client: Arc<dyn ChatClient>,
    deployment: String,
    resolver: FileResolver,
    system_prompt: String,
}

impl ImageAnalysisAgent {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        deployment: impl Into<String>,
        resolver: FileResolver,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            chat_client,
            deployment: deployment.into(),
            resolver,
            system_prompt: system_prompt.into(),
        }
    }

    /// System prompt plus one user message holding the instruction and every
    /// image that resolved, in input order
    pub async fn build_messages(&self, request: &ChatThreadRequest) -> Vec<Message> {
        let mut instruction = if request.message.trim().is_empty() {
            DEFAULT_INSTRUCTION.to_string()
        } else {
            request.message.clone()
        };

        let mut images = Vec::new();
        for file in request.images() {
            if let Some(image) = self.resolver.resolve(file).await {
                images.push(ContentPart::image(&image.media_type, &image.bytes));
            }
        }

        let requested = request.images().len();
        if images.len() < requested {
            tracing::warn!(requested, resolved = images.len(), "Some images could not be resolved");
        }

        if !images.is_empty() {
            instruction.push_str(&format!(
                "\n\nI have provided {} image(s) for analysis. Please examine each image carefully and extract any visible serial numbers, model numbers, part numbers, or other identifying information from equipment labels or nameplates.",
                images.len()
            ));
        }

        let mut parts = Vec::with_capacity(images.len() + 1);
        parts.push(ContentPart::text(instruction));
        parts.extend(images);

        vec![Message::system(self.system_prompt.clone()), Message::human(parts)]
    }

    fn chat_request(&self, messages: Vec<Message>) -> ChatRequest {
        ChatRequest::new(self.deployment.clone(), messages)
    }

    /// Non-streaming analysis
    ///
    /// Remote failures are reported in the result content rather than raised.
    pub async fn analyze_images(&self, request: &ChatThreadRequest) -> RequestResult {
        if request.images().is_empty() {
            return RequestResult::text(NO_IMAGES_MESSAGE, "");
        }

        let thread_id = request
            .thread_id
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| format!("thread_{}", uuid::Uuid::new_v4()));

        let messages = self.build_messages(request).await;
        tracing::info!(deployment = %self.deployment, images = request.images().len(), "Running image analysis");

        match self.chat_client.chat(self.chat_request(messages)).await {
            Ok(response) => {
                let mut result = RequestResult::text(response.content.unwrap_or_default(), thread_id);
                result.intermediate_steps = response
                    .tool_calls
                    .iter()
                    .map(|call| format_function_call(call.name(), call.arguments()))
                    .collect();
                result
            }
            Err(e) => {
                tracing::error!(error = %e, "Image analysis failed");
                RequestResult::text(format!("Error during image analysis: {}", e), thread_id)
            }
        }
    }

    /// Streaming analysis yielding text fragments as the model produces them
    ///
    /// A failure ends the stream with a single error fragment.
    pub fn analyze_images_stream(
        &self,
        request: ChatThreadRequest,
    ) -> Pin<Box<dyn Stream<Item = String> + Send>> {
        let agent = self.clone();

        Box::pin(async_stream::stream! {
            let messages = agent.build_messages(&request).await;
            tracing::info!(deployment = %agent.deployment, images = request.images().len(), "Streaming image analysis");

            let mut events = match agent.chat_client.chat_stream(agent.chat_request(messages)).await {
                Ok(events) => events,
                Err(e) => {
                    tracing::error!(error = %e, "Image analysis stream failed to start");
                    yield format!("Error during image analysis: {}", e);
                    return;
                }
            };

            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::Message { content }) if !content.is_empty() => yield content,
                    Ok(StreamEvent::Done { .. }) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Image analysis stream failed");
                        yield format!("Error during image analysis: {}", e);
                        break;
                    }
                }
            }
        })
    }
}
