// HTTP request/response bodies and their conversions to the agent types

use agenthub_types::{ChatThreadRequest, FileReference, ImageFile, RequestResult, Source};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImageFileBody {
    pub name: String,
    /// Inline `data:<media-type>;base64,<payload>` image
    #[serde(default)]
    pub data_url: Option<String>,
    /// Name of the image in the configured blob container
    #[serde(default)]
    pub blob_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ChatRequestBody {
    /// Absent and empty are the same; the handlers reject both
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub thread_id: Option<String>,
    /// Blob name of a document to make searchable in the thread
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub files: Option<Vec<ImageFileBody>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SourceBody {
    pub quote: String,
    pub title: String,
    pub url: String,
    pub start_index: String,
    pub end_index: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FileBody {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatResponseBody {
    pub content: String,
    pub thread_id: String,
    pub sources: Vec<SourceBody>,
    pub files: Vec<FileBody>,
    pub intermediate_steps: Vec<String>,
    pub code_content: String,
}

impl From<ImageFileBody> for ImageFile {
    fn from(body: ImageFileBody) -> Self {
        ImageFile {
            name: body.name,
            data_url: body.data_url,
            blob_name: body.blob_name,
        }
    }
}

impl From<ChatRequestBody> for ChatThreadRequest {
    fn from(body: ChatRequestBody) -> Self {
        ChatThreadRequest {
            message: body.message,
            thread_id: body.thread_id,
            file: body.file,
            files: body
                .files
                .map(|files| files.into_iter().map(ImageFile::from).collect()),
        }
    }
}

impl From<Source> for SourceBody {
    fn from(source: Source) -> Self {
        SourceBody {
            quote: source.quote,
            title: source.title,
            url: source.url,
            start_index: source.start_index,
            end_index: source.end_index,
        }
    }
}

impl From<FileReference> for FileBody {
    fn from(file: FileReference) -> Self {
        FileBody { id: file.id }
    }
}

impl From<RequestResult> for ChatResponseBody {
    fn from(result: RequestResult) -> Self {
        ChatResponseBody {
            content: result.content,
            thread_id: result.thread_id,
            sources: result.sources.into_iter().map(SourceBody::from).collect(),
            files: result.files.into_iter().map(FileBody::from).collect(),
            intermediate_steps: result.intermediate_steps,
            code_content: result.code_content,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
    pub version: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RootResponse {
    pub message: String,
    pub status_endpoint: String,
    pub chat_endpoint: String,
    pub image_analysis_endpoint: String,
    pub image_analysis_stream_endpoint: String,
    pub docs: String,
}

/// One `data:` event of the image-analysis stream
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AnalysisChunkBody {
    /// `text` or `end`
    #[serde(rename = "type")]
    pub chunk_type: String,
    pub content: String,
    /// Present on the final `end` chunk only
    #[serde(default)]
    pub full_response: Option<String>,
}
