use anyhow::Result;
use reqwest::Response;
use serde::{Deserialize, Serialize};

use crate::buffer_utils::{parse_sse_stream, SseLineParser};
use crate::traits::ChatEventStream;

/// Incremental output of a streamed chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Text fragment, never empty
    Message {
        content: String,
    },

    /// Partial function call; fragments sharing an `index` belong together
    ToolCall {
        index: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        arguments: Option<String>,
    },

    Done {
        #[serde(skip_serializing_if = "Option::is_none")]
        finish_reason: Option<String>,
    },
}

/// One `chat.completion.chunk` payload
///
/// Azure leads with a chunk that only carries prompt filter results, so
/// `choices` may be empty. Envelope fields (id, model, created) are ignored.
#[derive(Debug, Deserialize)]
struct ChatStreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCallDelta>,
}

#[derive(Debug, Deserialize)]
struct ToolCallDelta {
    index: u32,
    id: Option<String>,
    function: Option<FunctionDelta>,
}

#[derive(Debug, Deserialize)]
struct FunctionDelta {
    name: Option<String>,
    arguments: Option<String>,
}

impl ChatStreamChunk {
    fn into_stream_events(self) -> Vec<StreamEvent> {
        let Some(choice) = self.choices.into_iter().next() else {
            return Vec::new();
        };

        let mut events: Vec<StreamEvent> = choice
            .delta
            .content
            .filter(|c| !c.is_empty())
            .map(|content| StreamEvent::Message { content })
            .into_iter()
            .collect();

        events.extend(choice.delta.tool_calls.into_iter().map(|tc| {
            let (name, arguments) = tc.function.map_or((None, None), |f| (f.name, f.arguments));
            StreamEvent::ToolCall { index: tc.index, id: tc.id, name, arguments }
        }));

        if let Some(reason) = choice.finish_reason {
            events.push(StreamEvent::Done { finish_reason: Some(reason) });
        }

        events
    }
}

/// Parser for `chat/completions` SSE lines
pub struct ChatSseParser;

impl SseLineParser for ChatSseParser {
    type Event = StreamEvent;

    fn parse_data_line(&mut self, data: &str) -> Result<Vec<StreamEvent>> {
        let chunk: ChatStreamChunk = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e))?;
        Ok(chunk.into_stream_events())
    }

    fn done_event(&self) -> Option<StreamEvent> {
        Some(StreamEvent::Done { finish_reason: None })
    }
}

pub fn parse_chat_sse_stream(response: Response) -> ChatEventStream {
    parse_sse_stream(response, ChatSseParser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_with_content_and_finish() {
        let mut parser = ChatSseParser;
        let events = parser
            .parse_data_line(r#"{"id":"c1","object":"chat.completion.chunk","created":1,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"Serial"},"finish_reason":"stop"}]}"#)
            .unwrap();

        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], StreamEvent::Message { content } if content == "Serial"));
        assert!(matches!(&events[1], StreamEvent::Done { finish_reason: Some(r) } if r == "stop"));
    }

    #[test]
    fn test_prompt_filter_chunk_without_choices() {
        let mut parser = ChatSseParser;
        let events = parser
            .parse_data_line(r#"{"id":"","object":"","created":0,"model":"","prompt_filter_results":[]}"#)
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_invalid_chunk_is_error() {
        let mut parser = ChatSseParser;
        assert!(parser.parse_data_line("not json").is_err());
    }
}
