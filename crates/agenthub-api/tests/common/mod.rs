#![allow(dead_code)]

use std::pin::Pin;
use std::sync::Arc;

use agenthub_agents::{
    AgentEventStream, AgentRunner, AgentStreamEvent, ChatAgentService, FileReference, FileResolver,
    FileService, ImageAnalysisAgent, ThreadInfo, ThreadService, VectorStoreService,
};
use agenthub_api::{build_router, config::Config, state::AppState};
use agenthub_llm::{ChatClient, ChatRequest, ChatResponse, StreamEvent};
use anyhow::Result;
use async_trait::async_trait;
use axum::Router;
use futures::Stream;

/// Agent backend replying with a fixed event script
pub struct ScriptedBackend {
    pub reply: Vec<AgentStreamEvent>,
    pub fail: bool,
}

#[async_trait]
impl ThreadService for ScriptedBackend {
    async fn create_thread(&self, vector_store_ids: &[String]) -> Result<ThreadInfo> {
        Ok(ThreadInfo {
            id: "thread_created".to_string(),
            vector_store_ids: vector_store_ids.to_vec(),
        })
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadInfo> {
        Ok(ThreadInfo {
            id: thread_id.to_string(),
            vector_store_ids: Vec::new(),
        })
    }

    async fn update_thread(&self, thread_id: &str, vector_store_ids: &[String]) -> Result<ThreadInfo> {
        Ok(ThreadInfo {
            id: thread_id.to_string(),
            vector_store_ids: vector_store_ids.to_vec(),
        })
    }
}

#[async_trait]
impl VectorStoreService for ScriptedBackend {
    async fn create_vector_store(&self, _name: &str, _file_ids: &[String]) -> Result<String> {
        Ok("vs_1".to_string())
    }

    async fn add_file(&self, _vector_store_id: &str, _file_id: &str) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl FileService for ScriptedBackend {
    async fn upload_file(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<FileReference> {
        Ok(FileReference::new("file_1"))
    }
}

#[async_trait]
impl AgentRunner for ScriptedBackend {
    async fn invoke_stream(
        &self,
        _agent_id: &str,
        _thread_id: Option<&str>,
        _message: &str,
    ) -> Result<AgentEventStream> {
        if self.fail {
            anyhow::bail!("Azure AI Agents API error (500 Internal Server Error): upstream down");
        }
        let events: Vec<Result<AgentStreamEvent>> = self.reply.iter().cloned().map(Ok).collect();
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

/// Vision model double streaming fixed fragments
pub struct ScriptedVision {
    pub fragments: Vec<String>,
}

#[async_trait]
impl ChatClient for ScriptedVision {
    async fn chat(&self, _request: ChatRequest) -> Result<ChatResponse> {
        Ok(ChatResponse {
            content: Some(self.fragments.concat()),
            tool_calls: Vec::new(),
            usage: None,
            finish_reason: Some("stop".to_string()),
            raw: serde_json::Value::Null,
        })
    }

    async fn chat_stream(
        &self,
        _request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>> {
        let events: Vec<Result<StreamEvent>> = self
            .fragments
            .iter()
            .map(|f| Ok(StreamEvent::Message { content: f.clone() }))
            .collect();
        Ok(Box::pin(futures::stream::iter(events)))
    }
}

pub fn test_config() -> Config {
    toml::from_str(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0
        [cors]
        enabled = false
        origins = []
        [logging]
        level = "debug"
        format = "pretty"
        "#,
    )
    .unwrap()
}

pub fn app_with(backend: ScriptedBackend, fragments: &[&str]) -> Router {
    let chat_agent = ChatAgentService::builder()
        .agent_id("asst_test")
        .backend(Arc::new(backend))
        .build()
        .unwrap();

    let vision = Arc::new(ScriptedVision {
        fragments: fragments.iter().map(|f| f.to_string()).collect(),
    });
    let image_agent = ImageAnalysisAgent::new(vision, "gpt-4o", FileResolver::new(None), "Find serials.");

    build_router(Arc::new(AppState::new(test_config(), chat_agent, image_agent)))
}

pub fn app() -> Router {
    app_with(
        ScriptedBackend {
            reply: vec![AgentStreamEvent::text("Model X-200").with_thread_id("thread_9")],
            fail: false,
        },
        &["SN-", "42"],
    )
}
