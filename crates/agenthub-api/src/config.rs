use agenthub_agents::BlobConnection;
use config::{Config as ConfigLoader, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub agent: AgentConfig,

    // Secrets and remote endpoints (from ENV only)
    #[serde(skip)]
    pub azure: AzureSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_prompts_dir")]
    pub prompts_dir: String,
    /// Delay between vector store status polls
    #[serde(default = "default_poll_interval_ms")]
    pub vector_store_poll_interval_ms: u64,
    #[serde(default = "default_poll_attempts")]
    pub vector_store_poll_attempts: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            prompts_dir: default_prompts_dir(),
            vector_store_poll_interval_ms: default_poll_interval_ms(),
            vector_store_poll_attempts: default_poll_attempts(),
        }
    }
}

fn default_prompts_dir() -> String {
    "prompts".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_attempts() -> u32 {
    60
}

/// Azure credentials and endpoints
#[derive(Debug, Clone, Default)]
pub struct AzureSettings {
    pub openai_api_key: String,
    pub openai_endpoint: String,
    pub openai_deployment: String,
    pub openai_api_version: String,
    pub agent_endpoint: String,
    pub agent_id: String,
    pub agent_token: String,
    pub agent_api_version: String,
    pub blob_connection_string: Option<String>,
    pub blob_container: String,
}

impl AzureSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup; blank values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            get(key).ok_or_else(|| {
                ConfigError::Message(format!("{} environment variable is required", key))
            })
        };

        let blob_connection_string = get("AZURE_BLOB_CONNECTION_STRING");
        if let Some(connection_string) = &blob_connection_string {
            connection_string.parse::<BlobConnection>().map_err(|e| {
                ConfigError::Message(format!("AZURE_BLOB_CONNECTION_STRING is invalid: {:#}", e))
            })?;
        }

        Ok(Self {
            openai_api_key: required("AZURE_OPENAI_API_KEY")?,
            openai_endpoint: required("AZURE_OPENAI_ENDPOINT")?,
            openai_deployment: get("AZURE_OPENAI_CHAT_DEPLOYMENT_NAME")
                .unwrap_or_else(|| "gpt-4o".to_string()),
            openai_api_version: get("AZURE_OPENAI_API_VERSION")
                .unwrap_or_else(|| "2024-02-01".to_string()),
            agent_endpoint: required("AZURE_AI_AGENT_ENDPOINT")?,
            agent_id: required("AZURE_AI_AGENT_ID")?,
            agent_token: required("AZURE_AI_AGENT_TOKEN")?,
            agent_api_version: get("AZURE_AI_AGENT_API_VERSION").unwrap_or_else(|| "v1".to_string()),
            blob_connection_string,
            blob_container: get("AZURE_BLOB_CONTAINER_NAME").unwrap_or_else(|| "images".to_string()),
        })
    }
}

/// Environment variables overriding individual config keys
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("CORS_ENABLED", "cors.enabled"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
    ("AGENT_PROMPTS_DIR", "agent.prompts_dir"),
    ("AGENT_VECTOR_STORE_POLL_INTERVAL_MS", "agent.vector_store_poll_interval_ms"),
    ("AGENT_VECTOR_STORE_POLL_ATTEMPTS", "agent.vector_store_poll_attempts"),
];

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables (SERVER_*, CORS_ENABLED, LOG_*, AGENT_*)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            // 1. Load default config
            .add_source(File::with_name("config/default").required(false))
            // 2. Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false));

        // 3. Environment variables override everything
        for (var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }

        let config = builder.build()?;

        let mut cfg: Config = config.try_deserialize()?;

        // Load secrets from ENV (not in TOML)
        cfg.azure = AzureSettings::from_env()?;

        Ok(cfg)
    }
}
