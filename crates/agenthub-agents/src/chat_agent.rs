use std::sync::Arc;

use agenthub_types::{ChatThreadRequest, FileReference, RequestResult};
use anyhow::Context;

use crate::aggregator::aggregate;
use crate::error::{AgentError, Result};
use crate::services::{
    AgentBackend, AgentRunner, BlobStore, FileService, ThreadService, VectorStoreService,
};
use crate::vector_store::VectorStoreBinder;

/// Chat agent backed by a hosted agent with file search
///
/// One call runs one turn: optionally attach a document to the thread's
/// vector store, post the message, and fold the streamed reply.
pub struct ChatAgentService {
    agent_id: String,
    runner: Arc<dyn AgentRunner>,
    files: Arc<dyn FileService>,
    binder: VectorStoreBinder,
    blob_store: Option<Arc<dyn BlobStore>>,
}

impl ChatAgentService {
    pub fn builder() -> ChatAgentServiceBuilder {
        ChatAgentServiceBuilder::default()
    }

    pub fn agent_id(&self) -> &str {
        &self.agent_id
    }

    pub async fn run_chat(&self, request: &ChatThreadRequest) -> Result<RequestResult> {
        if request.message.is_empty() {
            return Err(AgentError::InvalidRequest("No messages found in request.".to_string()));
        }

        let mut thread_id = request.thread_id.clone().filter(|t| !t.is_empty());

        if let Some(blob_name) = request.file.as_deref().filter(|f| !f.is_empty()) {
            if let Some(file) = self.upload_from_blob(blob_name).await {
                let outcome = self.binder.bind(&file.id, thread_id.as_deref()).await;
                if let Some(bound) = outcome.thread_id() {
                    thread_id = Some(bound.to_string());
                }
            }
        }

        tracing::info!(agent_id = %self.agent_id, thread_id = ?thread_id, "Invoking chat agent");

        let stream = self
            .runner
            .invoke_stream(&self.agent_id, thread_id.as_deref(), &request.message)
            .await
            .context("Failed to start agent run")?;

        let result = aggregate(stream, thread_id).await?;

        tracing::info!(
            thread_id = %result.thread_id,
            content_len = result.content.len(),
            sources = result.sources.len(),
            steps = result.intermediate_steps.len(),
            "Chat turn completed"
        );
        Ok(result)
    }

    /// Copy a blob into the agent file store; failures are logged and skipped
    async fn upload_from_blob(&self, blob_name: &str) -> Option<FileReference> {
        let Some(store) = &self.blob_store else {
            tracing::warn!(blob = blob_name, "File supplied but blob storage is not configured");
            return None;
        };

        let blob = match store.download(blob_name).await {
            Ok(blob) => blob,
            Err(e) => {
                tracing::error!(blob = blob_name, error = %e, "Failed to download file for chat");
                return None;
            }
        };

        let file_name = blob_name.rsplit('/').next().unwrap_or(blob_name);
        match self.files.upload_file(file_name, blob.bytes).await {
            Ok(file) => {
                tracing::info!(blob = blob_name, file_id = %file.id, "Uploaded file to agent service");
                Some(file)
            }
            Err(e) => {
                tracing::error!(blob = blob_name, error = %e, "Failed to upload file to agent service");
                None
            }
        }
    }
}

/// Builder for ChatAgentService
#[derive(Default)]
pub struct ChatAgentServiceBuilder {
    agent_id: Option<String>,
    runner: Option<Arc<dyn AgentRunner>>,
    files: Option<Arc<dyn FileService>>,
    threads: Option<Arc<dyn ThreadService>>,
    vector_stores: Option<Arc<dyn VectorStoreService>>,
    blob_store: Option<Arc<dyn BlobStore>>,
}

impl ChatAgentServiceBuilder {
    pub fn agent_id(mut self, agent_id: impl Into<String>) -> Self {
        self.agent_id = Some(agent_id.into());
        self
    }

    /// Use one backend for every agent-platform capability
    pub fn backend<B: AgentBackend + 'static>(mut self, backend: Arc<B>) -> Self {
        self.runner = Some(backend.clone());
        self.files = Some(backend.clone());
        self.threads = Some(backend.clone());
        self.vector_stores = Some(backend);
        self
    }

    pub fn runner(mut self, runner: Arc<dyn AgentRunner>) -> Self {
        self.runner = Some(runner);
        self
    }

    pub fn files(mut self, files: Arc<dyn FileService>) -> Self {
        self.files = Some(files);
        self
    }

    pub fn threads(mut self, threads: Arc<dyn ThreadService>) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn vector_stores(mut self, vector_stores: Arc<dyn VectorStoreService>) -> Self {
        self.vector_stores = Some(vector_stores);
        self
    }

    pub fn blob_store(mut self, blob_store: Option<Arc<dyn BlobStore>>) -> Self {
        self.blob_store = blob_store;
        self
    }

    pub fn build(self) -> Result<ChatAgentService> {
        let missing = |what: &str| AgentError::Configuration(format!("{} is required", what));

        let agent_id = self
            .agent_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| missing("Agent id"))?;
        let runner = self.runner.ok_or_else(|| missing("Agent runner"))?;
        let files = self.files.ok_or_else(|| missing("File service"))?;
        let threads = self.threads.ok_or_else(|| missing("Thread service"))?;
        let vector_stores = self.vector_stores.ok_or_else(|| missing("Vector store service"))?;

        Ok(ChatAgentService {
            agent_id,
            runner,
            files,
            binder: VectorStoreBinder::new(threads, vector_stores),
            blob_store: self.blob_store,
        })
    }
}
