// Azure AI Agents REST client

use std::sync::Arc;
use std::time::Duration;

use agenthub_types::FileReference;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::stream::parse_agent_sse_stream;
use crate::credential::TokenCredential;
use crate::services::{
    AgentEventStream, AgentRunner, FileService, ThreadInfo, ThreadService, VectorStoreService,
};

const DEFAULT_API_VERSION: &str = "v1";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
const DEFAULT_POLL_ATTEMPTS: u32 = 60;

/// Client for a hosted Azure AI Agents project
///
/// - URL: {endpoint}/{resource}?api-version={api_version}
/// - Auth header: `Authorization: Bearer <token>` from the configured credential
pub struct AzureAgentsClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_version: String,
    credential: Arc<dyn TokenCredential>,
    poll_interval: Duration,
    poll_attempts: u32,
}

impl AzureAgentsClient {
    pub fn builder() -> AzureAgentsClientBuilder {
        AzureAgentsClientBuilder::default()
    }

    fn build_url(&self, path: &str) -> String {
        format!("{}/{}?api-version={}", self.endpoint, path, self.api_version)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let token = self
            .credential
            .get_token()
            .await
            .context("Failed to acquire access token")?;

        let response = request
            .bearer_auth(token)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Azure AI Agents API error ({}): {}", status, error_text);
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        self.send(request)
            .await?
            .json()
            .await
            .context("Failed to parse response")
    }

    async fn wait_for_vector_store(&self, mut store: VectorStoreObject) -> Result<VectorStoreObject> {
        let mut attempts = 0;
        while store.status == "in_progress" && attempts < self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;
            attempts += 1;
            store = self
                .send_json(self.http_client.get(self.build_url(&format!("vector_stores/{}", store.id))))
                .await?;
        }

        if store.status == "in_progress" {
            tracing::warn!(vector_store_id = %store.id, attempts, "Vector store still indexing, continuing");
        }
        Ok(store)
    }

    async fn wait_for_vector_store_file(
        &self,
        vector_store_id: &str,
        mut file: VectorStoreFileObject,
    ) -> Result<VectorStoreFileObject> {
        let mut attempts = 0;
        while file.status == "in_progress" && attempts < self.poll_attempts {
            tokio::time::sleep(self.poll_interval).await;
            attempts += 1;
            let path = format!("vector_stores/{}/files/{}", vector_store_id, file.id);
            file = self.send_json(self.http_client.get(self.build_url(&path))).await?;
        }

        if file.status == "failed" || file.status == "cancelled" {
            let reason = file
                .last_error
                .as_ref()
                .map(|e| e.message.as_str())
                .unwrap_or("no error details");
            anyhow::bail!("Indexing of file {} {}: {}", file.id, file.status, reason);
        }
        Ok(file)
    }
}

/// Builder for AzureAgentsClient
#[derive(Default)]
pub struct AzureAgentsClientBuilder {
    endpoint: Option<String>,
    api_version: Option<String>,
    credential: Option<Arc<dyn TokenCredential>>,
    poll_interval: Option<Duration>,
    poll_attempts: Option<u32>,
}

impl AzureAgentsClientBuilder {
    /// Project endpoint, e.g. "https://my-hub.services.ai.azure.com/api/projects/my-project"
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn credential(mut self, credential: Arc<dyn TokenCredential>) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Delay between status polls while vector stores index
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = Some(interval);
        self
    }

    pub fn poll_attempts(mut self, attempts: u32) -> Self {
        self.poll_attempts = Some(attempts);
        self
    }

    pub fn build(self) -> Result<AzureAgentsClient> {
        let endpoint = self
            .endpoint
            .filter(|e| !e.is_empty())
            .context("Endpoint is required")?;
        let credential = self.credential.context("Credential is required")?;

        let http_client = reqwest::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(AzureAgentsClient {
            http_client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            credential,
            poll_interval: self.poll_interval.unwrap_or(DEFAULT_POLL_INTERVAL),
            poll_attempts: self.poll_attempts.unwrap_or(DEFAULT_POLL_ATTEMPTS),
        })
    }
}

// ============================================================================
// TRAIT IMPLEMENTATIONS
// ============================================================================

#[async_trait]
impl ThreadService for AzureAgentsClient {
    async fn create_thread(&self, vector_store_ids: &[String]) -> Result<ThreadInfo> {
        let body = ThreadUpdate::with_vector_stores(vector_store_ids);
        let thread: ThreadObject = self
            .send_json(self.http_client.post(self.build_url("threads")).json(&body))
            .await?;

        tracing::debug!(thread_id = %thread.id, "Created thread");
        Ok(thread.into())
    }

    async fn get_thread(&self, thread_id: &str) -> Result<ThreadInfo> {
        let thread: ThreadObject = self
            .send_json(self.http_client.get(self.build_url(&format!("threads/{}", thread_id))))
            .await?;
        Ok(thread.into())
    }

    async fn update_thread(&self, thread_id: &str, vector_store_ids: &[String]) -> Result<ThreadInfo> {
        let body = ThreadUpdate::with_vector_stores(vector_store_ids);
        let thread: ThreadObject = self
            .send_json(
                self.http_client
                    .post(self.build_url(&format!("threads/{}", thread_id)))
                    .json(&body),
            )
            .await?;
        Ok(thread.into())
    }
}

#[async_trait]
impl VectorStoreService for AzureAgentsClient {
    async fn create_vector_store(&self, name: &str, file_ids: &[String]) -> Result<String> {
        let store: VectorStoreObject = self
            .send_json(
                self.http_client
                    .post(self.build_url("vector_stores"))
                    .json(&json!({ "name": name, "file_ids": file_ids })),
            )
            .await?;

        let store = self.wait_for_vector_store(store).await?;
        if store.status == "expired" {
            anyhow::bail!("Vector store {} expired before it became usable", store.id);
        }

        tracing::debug!(vector_store_id = %store.id, status = %store.status, "Vector store ready");
        Ok(store.id)
    }

    async fn add_file(&self, vector_store_id: &str, file_id: &str) -> Result<()> {
        let file: VectorStoreFileObject = self
            .send_json(
                self.http_client
                    .post(self.build_url(&format!("vector_stores/{}/files", vector_store_id)))
                    .json(&json!({ "file_id": file_id })),
            )
            .await?;

        self.wait_for_vector_store_file(vector_store_id, file).await?;
        Ok(())
    }
}

#[async_trait]
impl FileService for AzureAgentsClient {
    async fn upload_file(&self, file_name: &str, bytes: Vec<u8>) -> Result<FileReference> {
        let form = Form::new()
            .text("purpose", "assistants")
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        let file: FileObject = self
            .send_json(self.http_client.post(self.build_url("files")).multipart(form))
            .await?;

        tracing::debug!(file_id = %file.id, file_name, "Uploaded file");
        Ok(FileReference::new(file.id))
    }
}

#[async_trait]
impl AgentRunner for AzureAgentsClient {
    async fn invoke_stream(
        &self,
        agent_id: &str,
        thread_id: Option<&str>,
        message: &str,
    ) -> Result<AgentEventStream> {
        let thread_id = match thread_id {
            Some(id) => id.to_string(),
            None => self.create_thread(&[]).await?.id,
        };

        self.send(
            self.http_client
                .post(self.build_url(&format!("threads/{}/messages", thread_id)))
                .json(&json!({ "role": "user", "content": message })),
        )
        .await?;

        let response = self
            .send(
                self.http_client
                    .post(self.build_url(&format!("threads/{}/runs", thread_id)))
                    .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
                    .json(&json!({ "assistant_id": agent_id, "stream": true })),
            )
            .await?;

        tracing::debug!(thread_id = %thread_id, agent_id, "Agent run started");
        Ok(parse_agent_sse_stream(response, thread_id))
    }
}

// ============================================================================
// AGENTS WIRE TYPES
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct ThreadUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_resources: Option<ToolResources>,
}

impl ThreadUpdate {
    fn with_vector_stores(vector_store_ids: &[String]) -> Self {
        if vector_store_ids.is_empty() {
            return Self::default();
        }
        Self {
            tool_resources: Some(ToolResources {
                file_search: Some(FileSearchResources {
                    vector_store_ids: vector_store_ids.to_vec(),
                }),
            }),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ToolResources {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    file_search: Option<FileSearchResources>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct FileSearchResources {
    #[serde(default)]
    vector_store_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ThreadObject {
    id: String,
    #[serde(default)]
    tool_resources: Option<ToolResources>,
}

impl From<ThreadObject> for ThreadInfo {
    fn from(thread: ThreadObject) -> Self {
        let vector_store_ids = thread
            .tool_resources
            .and_then(|r| r.file_search)
            .map(|fs| fs.vector_store_ids)
            .unwrap_or_default();

        ThreadInfo {
            id: thread.id,
            vector_store_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VectorStoreObject {
    id: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Deserialize)]
struct VectorStoreFileObject {
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    last_error: Option<LastError>,
}

#[derive(Debug, Deserialize)]
struct LastError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct FileObject {
    id: String,
}
