pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod config;
pub mod azure_openai;

pub use traits::{ChatClient, ChatEventStream, ChatRequest, ChatResponse, ChatOptions, TokenUsage};

pub use streaming::StreamEvent;
pub use buffer_utils::{CircularLineBuffer, SseLineParser};
pub use azure_openai::AzureOpenAIClient;
pub use config::{AzureConfig, ClientFactory};
pub use types::{Message, Role, Content, ContentPart, ImageUrl, ToolCall};
