// SSE parsing for Azure AI Agents run streams
//
// Each `data:` line carries a JSON object whose `object` field names the
// event kind (thread.message.delta, thread.run.step.delta, ...).

use std::pin::Pin;

use agenthub_llm::buffer_utils::{parse_sse_stream, SseLineParser};
use agenthub_types::{AgentStreamEvent, Annotation};
use anyhow::Result;
use futures::Stream;
use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;

/// Stateful parser for agent run events
///
/// Remembers the last thread id seen on the wire and stamps it on every
/// event it emits, including the final `Done`.
pub struct AgentsSseParser {
    thread_id: Option<String>,
}

impl AgentsSseParser {
    pub fn new(thread_id: impl Into<String>) -> Self {
        Self {
            thread_id: Some(thread_id.into()),
        }
    }

    fn stamp(&self, event: AgentStreamEvent) -> AgentStreamEvent {
        match &self.thread_id {
            Some(id) => event.with_thread_id(id.clone()),
            None => event,
        }
    }
}

impl SseLineParser for AgentsSseParser {
    type Event = AgentStreamEvent;

    fn parse_data_line(&mut self, data: &str) -> Result<Vec<AgentStreamEvent>> {
        let value: Value = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse agent event: {}", e))?;

        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error");
            anyhow::bail!("Agent stream error: {}", message);
        }

        if let Some(thread_id) = value.get("thread_id").and_then(Value::as_str) {
            self.thread_id = Some(thread_id.to_string());
        }

        let object = value.get("object").and_then(Value::as_str).unwrap_or_default();
        let events = match object {
            "thread.message.delta" => {
                let chunk: MessageDeltaChunk = serde_json::from_value(value)?;
                chunk.into_events()
            }
            "thread.run.step.delta" => {
                let chunk: RunStepDeltaChunk = serde_json::from_value(value)?;
                chunk.delta.step_details.map(StepDetails::code_events).unwrap_or_default()
            }
            "thread.run.step" => {
                let step: RunStep = serde_json::from_value(value)?;
                if step.status == "completed" {
                    step.step_details.map(StepDetails::function_events).unwrap_or_default()
                } else {
                    Vec::new()
                }
            }
            "thread.run" => {
                let run: Run = serde_json::from_value(value)?;
                run.check_status()?;
                Vec::new()
            }
            _ => Vec::new(),
        };

        Ok(events.into_iter().map(|e| self.stamp(e)).collect())
    }

    fn done_event(&self) -> Option<AgentStreamEvent> {
        Some(self.stamp(AgentStreamEvent::Done { thread_id: None }))
    }
}

pub fn parse_agent_sse_stream(
    response: Response,
    thread_id: impl Into<String>,
) -> Pin<Box<dyn Stream<Item = Result<AgentStreamEvent>> + Send>> {
    parse_sse_stream(response, AgentsSseParser::new(thread_id))
}

// ============================================================================
// EVENT PAYLOADS
// ============================================================================

#[derive(Debug, Deserialize)]
struct MessageDeltaChunk {
    delta: MessageDelta,
}

#[derive(Debug, Default, Deserialize)]
struct MessageDelta {
    #[serde(default)]
    content: Vec<MessageDeltaContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum MessageDeltaContent {
    Text {
        #[serde(default)]
        text: Option<TextDelta>,
    },
    ImageFile {
        #[serde(default)]
        image_file: Option<FileRef>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct TextDelta {
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    annotations: Vec<AnnotationDelta>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnnotationDelta {
    FileCitation {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        start_index: Option<i64>,
        #[serde(default)]
        end_index: Option<i64>,
    },
    UrlCitation {
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        start_index: Option<i64>,
        #[serde(default)]
        end_index: Option<i64>,
        #[serde(default)]
        url_citation: Option<UrlCitation>,
    },
    FilePath {
        #[serde(default)]
        file_path: Option<FileRef>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct UrlCitation {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    #[serde(default)]
    file_id: Option<String>,
}

impl MessageDeltaChunk {
    fn into_events(self) -> Vec<AgentStreamEvent> {
        let mut events = Vec::new();

        for item in self.delta.content {
            match item {
                MessageDeltaContent::Text { text: Some(text) } => {
                    let mut annotations = Vec::new();
                    let mut file_ids = Vec::new();

                    for annotation in text.annotations {
                        match annotation {
                            AnnotationDelta::FileCitation { text, start_index, end_index } => {
                                annotations.push(Annotation {
                                    quote: text,
                                    start_index,
                                    end_index,
                                    ..Default::default()
                                });
                            }
                            AnnotationDelta::UrlCitation { text, start_index, end_index, url_citation } => {
                                let (url, title) = url_citation
                                    .map(|c| (c.url, c.title))
                                    .unwrap_or_default();
                                annotations.push(Annotation {
                                    quote: text,
                                    title,
                                    url,
                                    start_index,
                                    end_index,
                                });
                            }
                            AnnotationDelta::FilePath { file_path } => {
                                file_ids.extend(file_path.and_then(|f| f.file_id));
                            }
                            AnnotationDelta::Unknown => {}
                        }
                    }

                    events.push(AgentStreamEvent::Content {
                        thread_id: None,
                        content: text.value.unwrap_or_default(),
                        annotations,
                        file_ids,
                        code: false,
                    });
                }
                MessageDeltaContent::ImageFile { image_file } => {
                    if let Some(file_id) = image_file.and_then(|f| f.file_id) {
                        events.push(AgentStreamEvent::Content {
                            thread_id: None,
                            content: String::new(),
                            annotations: Vec::new(),
                            file_ids: vec![file_id],
                            code: false,
                        });
                    }
                }
                MessageDeltaContent::Text { text: None } | MessageDeltaContent::Unknown => {}
            }
        }

        events
    }
}

#[derive(Debug, Deserialize)]
struct RunStepDeltaChunk {
    delta: RunStepDelta,
}

#[derive(Debug, Deserialize)]
struct RunStepDelta {
    #[serde(default)]
    step_details: Option<StepDetails>,
}

#[derive(Debug, Deserialize)]
struct RunStep {
    #[serde(default)]
    status: String,
    #[serde(default)]
    step_details: Option<StepDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StepDetails {
    ToolCalls {
        #[serde(default)]
        tool_calls: Vec<ToolCallDetail>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolCallDetail {
    CodeInterpreter {
        #[serde(default)]
        code_interpreter: Option<CodeInterpreterDetail>,
    },
    Function {
        #[serde(default)]
        function: Option<FunctionDetail>,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct CodeInterpreterDetail {
    #[serde(default)]
    input: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FunctionDetail {
    #[serde(default)]
    name: String,
    #[serde(default)]
    arguments: String,
}

impl StepDetails {
    fn tool_calls(self) -> Vec<ToolCallDetail> {
        match self {
            StepDetails::ToolCalls { tool_calls } => tool_calls,
            StepDetails::Unknown => Vec::new(),
        }
    }

    /// Code-interpreter input fragments
    fn code_events(self) -> Vec<AgentStreamEvent> {
        self.tool_calls()
            .into_iter()
            .filter_map(|call| match call {
                ToolCallDetail::CodeInterpreter { code_interpreter } => code_interpreter
                    .and_then(|c| c.input)
                    .filter(|input| !input.is_empty())
                    .map(AgentStreamEvent::code),
                _ => None,
            })
            .collect()
    }

    /// Function calls of a completed step
    fn function_events(self) -> Vec<AgentStreamEvent> {
        self.tool_calls()
            .into_iter()
            .filter_map(|call| match call {
                ToolCallDetail::Function { function: Some(f) } => {
                    Some(AgentStreamEvent::function_call(f.name, f.arguments))
                }
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct Run {
    #[serde(default)]
    status: String,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    #[serde(default)]
    message: String,
}

impl Run {
    fn check_status(&self) -> Result<()> {
        match self.status.as_str() {
            "failed" | "cancelled" | "expired" => {
                let reason = self
                    .last_error
                    .as_ref()
                    .map(|e| e.message.as_str())
                    .unwrap_or("no error details");
                anyhow::bail!("Agent run {}: {}", self.status, reason)
            }
            // No local tools are registered, so a tool-output request cannot be served
            "requires_action" => anyhow::bail!("Agent run requires tool outputs, which are not supported"),
            _ => Ok(()),
        }
    }
}
