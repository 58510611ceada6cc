use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Caller broke a precondition (e.g. empty message)
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Remote agent, model or storage call failed
    #[error("{0:#}")]
    Remote(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, AgentError>;
