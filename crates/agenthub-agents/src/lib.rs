pub mod error;
pub mod services;
pub mod credential;
pub mod azure;
pub mod prompts;
pub mod file_resolver;
pub mod vector_store;
pub mod aggregator;
pub mod chat_agent;
pub mod image_agent;

pub use error::{AgentError, Result};
pub use services::{
    AgentBackend, AgentEventStream, AgentRunner, BlobContent, BlobStore, FileService,
    ThreadInfo, ThreadService, VectorStoreService,
};
pub use credential::{StaticTokenCredential, TokenCredential};
pub use azure::{AzureAgentsClient, AzureBlobStore, BlobConnection, BlobCredential};
pub use prompts::PromptLoader;
pub use file_resolver::{FileResolver, ResolvedImage};
pub use vector_store::{BindOutcome, VectorStoreBinder};
pub use aggregator::{aggregate, format_function_call, StreamAggregator};
pub use chat_agent::{ChatAgentService, ChatAgentServiceBuilder};
pub use image_agent::ImageAnalysisAgent;

// Re-export the data model so callers need a single dependency
pub use agenthub_types::{
    AgentStreamEvent, AnalysisChunk, Annotation, ChatThreadRequest, FileReference, ImageFile,
    RequestResult, Source,
};
