// Configuration layer for creating chat clients from settings

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Configuration for Azure OpenAI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
}

impl AzureConfig {
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into(),
            api_version: api_version.into(),
        }
    }
}

/// Factory for creating chat clients from configuration
pub struct ClientFactory;

impl ClientFactory {
    /// Create a chat client from Azure configuration
    ///
    /// The deployment name is passed per request via `ChatRequest::model`.
    pub fn create_chat_client(config: AzureConfig) -> Result<Arc<dyn crate::traits::ChatClient>> {
        let client = crate::azure_openai::AzureOpenAIClient::builder()
            .api_key(config.api_key)
            .endpoint(config.endpoint)
            .api_version(config.api_version)
            .build()?;
        Ok(Arc::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_azure_endpoint() {
        let azure_config = AzureConfig::new(
            "test-key",
            "https://my-resource.openai.azure.com",
            "2024-02-01",
        );
        assert_eq!(azure_config.endpoint, "https://my-resource.openai.azure.com");
        assert_eq!(azure_config.api_version, "2024-02-01");
    }

    #[test]
    fn test_factory_builds_client() {
        let config = AzureConfig::new("test-key", "https://my-resource.openai.azure.com/", "2024-02-01");
        assert!(ClientFactory::create_chat_client(config).is_ok());
    }

    #[test]
    fn test_factory_rejects_empty_key() {
        let config = AzureConfig::new("", "https://my-resource.openai.azure.com", "2024-02-01");
        assert!(ClientFactory::create_chat_client(config).is_err());
    }
}
