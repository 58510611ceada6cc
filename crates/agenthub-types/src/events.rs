use serde::{Deserialize, Serialize};

/// Raw citation fragment as delivered by the agent stream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_index: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_index: Option<i64>,
}

/// Event streamed back by a hosted agent run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentStreamEvent {
    /// Text delta plus whatever citations and file references rode along with it
    Content {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        #[serde(default)]
        content: String,
        #[serde(default)]
        annotations: Vec<Annotation>,
        #[serde(default)]
        file_ids: Vec<String>,
        /// Set when the fragment is generated code rather than answer text
        #[serde(default)]
        code: bool,
    },

    /// Tool/function invocation made by the agent while answering
    FunctionCall {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
        name: String,
        arguments: String,
    },

    /// Run finished
    Done {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thread_id: Option<String>,
    },
}

impl AgentStreamEvent {
    /// Plain answer text
    pub fn text(content: impl Into<String>) -> Self {
        Self::Content {
            thread_id: None,
            content: content.into(),
            annotations: Vec::new(),
            file_ids: Vec::new(),
            code: false,
        }
    }

    /// Generated code fragment
    pub fn code(content: impl Into<String>) -> Self {
        Self::Content {
            thread_id: None,
            content: content.into(),
            annotations: Vec::new(),
            file_ids: Vec::new(),
            code: true,
        }
    }

    pub fn function_call(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self::FunctionCall {
            thread_id: None,
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Self::Content { thread_id, .. }
            | Self::FunctionCall { thread_id, .. }
            | Self::Done { thread_id } => thread_id.as_deref(),
        }
    }

    /// Stamp the event with the conversation handle it belongs to
    pub fn with_thread_id(mut self, id: impl Into<String>) -> Self {
        match &mut self {
            Self::Content { thread_id, .. }
            | Self::FunctionCall { thread_id, .. }
            | Self::Done { thread_id } => *thread_id = Some(id.into()),
        }
        self
    }
}

/// Wire chunk of the image-analysis event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisChunk {
    Text {
        content: String,
    },

    /// Final chunk; `content` is always empty
    End {
        content: String,
        full_response: String,
    },
}

impl AnalysisChunk {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { content: content.into() }
    }

    pub fn end(full_response: impl Into<String>) -> Self {
        Self::End {
            content: String::new(),
            full_response: full_response.into(),
        }
    }
}
