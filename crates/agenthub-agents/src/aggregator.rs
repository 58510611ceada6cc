use agenthub_types::{AgentStreamEvent, FileReference, RequestResult, Source};
use anyhow::Result;
use futures::{Stream, StreamExt};

/// Text recorded for each function call made during a run
pub fn format_function_call(name: &str, arguments: &str) -> String {
    format!("Function Call: {} with arguments: {}", name, arguments)
}

/// Folds agent stream events into a single [`RequestResult`]
///
/// Events are applied in arrival order. The thread id is trailing-value-wins:
/// every event carrying one overwrites the value captured so far.
#[derive(Debug, Default)]
pub struct StreamAggregator {
    content: String,
    code_content: String,
    sources: Vec<Source>,
    files: Vec<FileReference>,
    intermediate_steps: Vec<String>,
    thread_id: Option<String>,
}

impl StreamAggregator {
    pub fn new(thread_id: Option<String>) -> Self {
        Self {
            thread_id,
            ..Default::default()
        }
    }

    pub fn push(&mut self, event: AgentStreamEvent) {
        if let Some(thread_id) = event.thread_id() {
            self.thread_id = Some(thread_id.to_string());
        }

        match event {
            AgentStreamEvent::Content { content, annotations, file_ids, code, .. } => {
                if code {
                    self.code_content.push_str(&content);
                } else {
                    self.content.push_str(&content);
                }
                self.sources.extend(annotations.into_iter().map(Source::from));
                self.files.extend(file_ids.into_iter().map(FileReference::new));
            }
            AgentStreamEvent::FunctionCall { name, arguments, .. } => {
                self.intermediate_steps.push(format_function_call(&name, &arguments));
            }
            AgentStreamEvent::Done { .. } => {}
        }
    }

    /// Surrounding whitespace is stripped from `code_content`; `content` is kept as streamed
    pub fn finish(self) -> RequestResult {
        RequestResult {
            content: self.content,
            sources: self.sources,
            files: self.files,
            intermediate_steps: self.intermediate_steps,
            thread_id: self.thread_id.unwrap_or_default(),
            code_content: self.code_content.trim().to_string(),
        }
    }
}

/// Drain `stream` into a [`RequestResult`]; the first stream error aborts the fold
pub async fn aggregate<S>(stream: S, thread_id: Option<String>) -> Result<RequestResult>
where
    S: Stream<Item = Result<AgentStreamEvent>>,
{
    let mut stream = Box::pin(stream);
    let mut aggregator = StreamAggregator::new(thread_id);
    let mut events = 0usize;

    while let Some(event) = stream.next().await {
        aggregator.push(event?);
        events += 1;
    }

    tracing::debug!(events, "Agent stream aggregated");
    Ok(aggregator.finish())
}
