use anyhow::Result;
use async_trait::async_trait;

/// Source of bearer tokens for the agents service
///
/// Token acquisition (managed identity, CLI login, ...) is delegated to
/// implementors; the service only asks for a token before each call.
#[async_trait]
pub trait TokenCredential: Send + Sync {
    async fn get_token(&self) -> Result<String>;
}

/// Credential holding a pre-issued token
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            anyhow::bail!("Access token must not be empty");
        }
        Ok(Self { token })
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn get_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}
