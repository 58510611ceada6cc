pub mod events;
pub mod models;

pub use events::{AgentStreamEvent, AnalysisChunk, Annotation};
pub use models::{ChatThreadRequest, FileReference, ImageFile, RequestResult, Source};
