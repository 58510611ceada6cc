// In-memory fakes for the agent capability traits
#![allow(dead_code)]

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Mutex;

use agenthub_agents::{
    AgentEventStream, AgentRunner, AgentStreamEvent, BlobContent, BlobStore, FileReference,
    FileService, ThreadInfo, ThreadService, VectorStoreService,
};
use agenthub_llm::{ChatClient, ChatRequest, ChatResponse, StreamEvent};
use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;

/// Agent platform double recording every call it receives
#[derive(Default)]
pub struct FakeBackend {
    pub threads: Mutex<HashMap<String, Vec<String>>>,
    pub calls: Mutex<Vec<String>>,
    pub reply: Mutex<Vec<AgentStreamEvent>>,
    pub invocations: Mutex<Vec<(Option<String>, String)>>,
    pub fail_get_thread: bool,
    pub fail_create_store: bool,
    pub fail_upload: bool,
    pub fail_run: bool,
    pub next_id: Mutex<u32>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thread(self, thread_id: &str, vector_store_ids: &[&str]) -> Self {
        self.threads.lock().unwrap().insert(
            thread_id.to_string(),
            vector_store_ids.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    pub fn with_reply(self, events: Vec<AgentStreamEvent>) -> Self {
        *self.reply.lock().unwrap() = events;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stores_of(&self, thread_id: &str) -> Option<Vec<String>> {
        self.threads.lock().unwrap().get(thread_id).cloned()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn next(&self, prefix: &str) -> String {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        format!("{}_{}", prefix, id)
    }
}

#[async_trait]
impl ThreadService for FakeBackend {
    async fn create_thread(&self, vector_store_ids: &[String]) -> Result<ThreadInfo> {
        let id = self.next("thread");
        self.record(format!("create_thread {:?}", vector_store_ids));
        self.threads.lock().unwrap().insert(id.clone(), vector_store_ids.to_vec());
        Ok(ThreadInfo {
            id,
            vector_store_ids: vector_store_ids.to_vec(),
        })
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadInfo> {
        self.record(format!("get_thread {}", thread_id));
        if self.fail_get_thread {
            anyhow::bail!("thread lookup unavailable");
        }
        let stores = self
            .stores_of(thread_id)
            .ok_or_else(|| anyhow::anyhow!("thread {} not found", thread_id))?;
        Ok(ThreadInfo {
            id: thread_id.to_string(),
            vector_store_ids: stores,
        })
    }

    async fn update_thread(&self, thread_id: &str, vector_store_ids: &[String]) -> Result<ThreadInfo> {
        self.record(format!("update_thread {} {:?}", thread_id, vector_store_ids));
        self.threads
            .lock()
            .unwrap()
            .insert(thread_id.to_string(), vector_store_ids.to_vec());
        Ok(ThreadInfo {
            id: thread_id.to_string(),
            vector_store_ids: vector_store_ids.to_vec(),
        })
    }
}

#[async_trait]
impl VectorStoreService for FakeBackend {
    async fn create_vector_store(&self, name: &str, file_ids: &[String]) -> Result<String> {
        self.record(format!("create_vector_store {} {:?}", name, file_ids));
        if self.fail_create_store {
            anyhow::bail!("vector store quota exceeded");
        }
        Ok(self.next("vs"))
    }

    async fn add_file(&self, vector_store_id: &str, file_id: &str) -> Result<()> {
        self.record(format!("add_file {} {}", vector_store_id, file_id));
        Ok(())
    }
}

#[async_trait]
impl FileService for FakeBackend {
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<FileReference> {
        self.record(format!("upload_file {} {}", file_name, bytes.len()));
        if self.fail_upload {
            anyhow::bail!("upload rejected");
        }
        Ok(FileReference::new(self.next("file")))
    }
}

#[async_trait]
impl AgentRunner for FakeBackend {
    async fn invoke_stream(
        &self,
        _agent_id: &str,
        thread_id: Option<&str>,
        message: &str,
    ) -> Result<AgentEventStream> {
        self.invocations
            .lock()
            .unwrap()
            .push((thread_id.map(str::to_string), message.to_string()));
        if self.fail_run {
            anyhow::bail!("agent unavailable");
        }

        let events: Vec<Result<AgentStreamEvent>> =
            self.reply.lock().unwrap().clone().into_iter().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

/// Blob store backed by a map; unknown names fail like a 404
#[derive(Default)]
pub struct FakeBlobStore {
    pub blobs: HashMap<String, BlobContent>,
    pub downloads: Mutex<Vec<String>>,
}

impl FakeBlobStore {
    pub fn with_blob(mut self, name: &str, bytes: &[u8], content_type: Option<&str>) -> Self {
        self.blobs.insert(
            name.to_string(),
            BlobContent {
                bytes: bytes.to_vec(),
                content_type: content_type.map(str::to_string),
            },
        );
        self
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn download(&self, blob_name: &str) -> Result<BlobContent> {
        self.downloads.lock().unwrap().push(blob_name.to_string());
        self.blobs
            .get(blob_name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Blob download of '{}' failed (404 Not Found)", blob_name))
    }
}

/// Chat-completion double returning canned text
#[derive(Default)]
pub struct FakeChatClient {
    pub reply: String,
    pub fragments: Vec<String>,
    pub fail: bool,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl FakeChatClient {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            ..Default::default()
        }
    }

    pub fn streaming(fragments: &[&str]) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn last_request(&self) -> ChatRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl ChatClient for FakeChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            anyhow::bail!("Azure OpenAI API error (503 Service Unavailable): busy");
        }
        Ok(ChatResponse {
            content: Some(self.reply.clone()),
            tool_calls: Vec::new(),
            usage: None,
            finish_reason: Some("stop".to_string()),
            raw: serde_json::Value::Null,
        })
    }

    async fn chat_stream(
        &self,
        request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        self.requests.lock().unwrap().push(request);
        if self.fail {
            anyhow::bail!("Azure OpenAI API error (503 Service Unavailable): busy");
        }

        let mut events: Vec<Result<StreamEvent>> = self
            .fragments
            .iter()
            .map(|f| Ok(StreamEvent::Message { content: f.clone() }))
            .collect();
        events.push(Ok(StreamEvent::Done {
            finish_reason: Some("stop".to_string()),
        }));
        Ok(Box::pin(futures::stream::iter(events)))
    }
}
