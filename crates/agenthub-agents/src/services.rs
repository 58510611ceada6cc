//! Capability interfaces over the remote agent platform and storage
//!
//! Each capability is a small trait so the agents can be driven by the Azure
//! adapters in production and by in-memory fakes in tests.

use std::pin::Pin;

use agenthub_types::{AgentStreamEvent, FileReference};
use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;

/// Stream of events produced by one agent run
pub type AgentEventStream = Pin<Box<dyn Stream<Item = Result<AgentStreamEvent>> + Send>>;

/// Conversation thread as seen by the binder
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: String,
    /// Vector stores attached to the thread's file-search tool
    pub vector_store_ids: Vec<String>,
}

/// Raw blob payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobContent {
    pub bytes: Vec<u8>,
    /// Content type reported by the store, if any
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ThreadService: Send + Sync {
    /// Create a thread whose file-search tool uses the given vector stores
    async fn create_thread(&self, vector_store_ids: &[String]) -> Result<ThreadInfo>;

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadInfo>;

    /// Replace the thread's file-search vector stores
    async fn update_thread(&self, thread_id: &str, vector_store_ids: &[String]) -> Result<ThreadInfo>;
}

#[async_trait]
pub trait VectorStoreService: Send + Sync {
    /// Create a vector store over `file_ids` and wait until it is usable.
    /// Returns the new store id.
    async fn create_vector_store(&self, name: &str, file_ids: &[String]) -> Result<String>;

    /// Add a file to an existing store and wait for indexing
    async fn add_file(&self, vector_store_id: &str, file_id: &str) -> Result<()>;
}

#[async_trait]
pub trait FileService: Send + Sync {
    /// Upload a document for use by agents
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<FileReference>;
}

#[async_trait]
pub trait AgentRunner: Send + Sync {
    /// Post `message` to the thread (creating one when `thread_id` is None)
    /// and stream the agent's reply
    async fn invoke_stream(
        &self,
        agent_id: &str,
        thread_id: Option<&str>,
        message: &str,
    ) -> Result<AgentEventStream>;
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn download(&self, blob_name: &str) -> Result<BlobContent>;
}

/// Everything the chat agent needs from the agent platform
pub trait AgentBackend: ThreadService + VectorStoreService + FileService + AgentRunner {}

// Blanket impl: anything covering all four capabilities is a backend
impl<T> AgentBackend for T where T: ThreadService + VectorStoreService + FileService + AgentRunner {}
