use std::sync::Arc;

use agenthub_agents::{ChatAgentService, ImageAnalysisAgent};
use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Built once at startup and only read afterwards.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub chat_agent: Arc<ChatAgentService>,
    pub image_agent: Arc<ImageAnalysisAgent>,
}

impl AppState {
    pub fn new(
        config: Config,
        chat_agent: ChatAgentService,
        image_agent: ImageAnalysisAgent,
    ) -> Self {
        Self {
            config: Arc::new(config),
            chat_agent: Arc::new(chat_agent),
            image_agent: Arc::new(image_agent),
        }
    }
}
