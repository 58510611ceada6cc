// Azure adapters for the agent capability traits

pub mod agents;
pub mod blob;
pub mod stream;

pub use agents::{AzureAgentsClient, AzureAgentsClientBuilder};
pub use blob::{AzureBlobStore, BlobConnection, BlobCredential};
pub use stream::{parse_agent_sse_stream, AgentsSseParser};
