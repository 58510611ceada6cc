use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use agenthub_agents::{
    image_agent::SYSTEM_PROMPT_FILE, prompts::log_agent_initialization, AzureAgentsClient,
    AzureBlobStore, BlobStore, ChatAgentService, FileResolver, ImageAnalysisAgent, PromptLoader,
    StaticTokenCredential,
};
use agenthub_api::{build_router, config::Config, state::AppState};
use agenthub_llm::{AzureConfig, ClientFactory};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Agent Hub API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let azure = &config.azure;

    // Blob storage is optional; without it blob references are skipped
    let blob_store: Option<Arc<dyn BlobStore>> = match &azure.blob_connection_string {
        Some(connection_string) => {
            let store = AzureBlobStore::from_connection_string(connection_string, &azure.blob_container)
                .map_err(|e| anyhow::anyhow!("Invalid blob storage configuration: {}", e))?;
            tracing::info!(container = %azure.blob_container, "Blob storage configured");
            Some(Arc::new(store))
        }
        None => {
            tracing::warn!("AZURE_BLOB_CONNECTION_STRING not set, blob references will be skipped");
            None
        }
    };

    // Chat agent over Azure AI Agents
    log_agent_initialization(
        "ChatAgent",
        &[
            ("agent_endpoint", azure.agent_endpoint.as_str()),
            ("agent_id", azure.agent_id.as_str()),
            ("agent_token", azure.agent_token.as_str()),
            ("api_version", azure.agent_api_version.as_str()),
        ],
    );
    let credential = Arc::new(StaticTokenCredential::new(azure.agent_token.clone())?);
    let agents_client = Arc::new(
        AzureAgentsClient::builder()
            .endpoint(azure.agent_endpoint.clone())
            .api_version(azure.agent_api_version.clone())
            .credential(credential)
            .poll_interval(Duration::from_millis(config.agent.vector_store_poll_interval_ms))
            .poll_attempts(config.agent.vector_store_poll_attempts)
            .build()?,
    );
    let chat_agent = ChatAgentService::builder()
        .agent_id(azure.agent_id.clone())
        .backend(agents_client)
        .blob_store(blob_store.clone())
        .build()?;

    // Image agent over Azure OpenAI chat completions
    log_agent_initialization(
        "ImageAnalysisAgent",
        &[
            ("endpoint", azure.openai_endpoint.as_str()),
            ("api_key", azure.openai_api_key.as_str()),
            ("deployment", azure.openai_deployment.as_str()),
            ("api_version", azure.openai_api_version.as_str()),
            ("prompts_dir", config.agent.prompts_dir.as_str()),
        ],
    );
    let chat_client = ClientFactory::create_chat_client(AzureConfig::new(
        azure.openai_api_key.clone(),
        azure.openai_endpoint.clone(),
        azure.openai_api_version.clone(),
    ))?;
    let system_prompt = PromptLoader::new(&config.agent.prompts_dir).load(SYSTEM_PROMPT_FILE);
    let image_agent = ImageAnalysisAgent::new(
        chat_client,
        azure.openai_deployment.clone(),
        FileResolver::new(blob_store),
        system_prompt,
    );

    // Create application state
    let state = Arc::new(AppState::new(config.clone(), chat_agent, image_agent));

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Status: http://{}/status", addr);
    tracing::info!("API docs: http://{}/docs", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to install CTRL+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => tracing::warn!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
