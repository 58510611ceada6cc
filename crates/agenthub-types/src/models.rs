use serde::{Deserialize, Serialize};

use crate::events::Annotation;

/// Citation attached to an answer
///
/// Every field is a string and defaults to empty; indices are stringified
/// offsets into the retrieved content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    #[serde(default)]
    pub quote: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub start_index: String,
    #[serde(default)]
    pub end_index: String,
}

impl From<Annotation> for Source {
    fn from(annotation: Annotation) -> Self {
        fn text(value: Option<String>) -> String {
            value.filter(|v| !v.is_empty()).unwrap_or_default()
        }

        Self {
            quote: text(annotation.quote),
            title: text(annotation.title),
            url: text(annotation.url),
            start_index: annotation.start_index.map(|i| i.to_string()).unwrap_or_default(),
            end_index: annotation.end_index.map(|i| i.to_string()).unwrap_or_default(),
        }
    }
}

/// Opaque file identifier owned by the agent service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    #[serde(default)]
    pub id: String,
}

impl FileReference {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Image supplied either inline (`data_url`) or by blob name
///
/// When both are set, `data_url` wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFile {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blob_name: Option<String>,
}

impl ImageFile {
    pub fn from_data_url(name: impl Into<String>, data_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_url: Some(data_url.into()),
            blob_name: None,
        }
    }

    pub fn from_blob(name: impl Into<String>, blob_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_url: None,
            blob_name: Some(blob_name.into()),
        }
    }
}

/// A single chat turn as handed to the agents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatThreadRequest {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<String>,
    /// Blob reference of a document to attach to the thread's retrieval index
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ImageFile>>,
}

impl ChatThreadRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    pub fn with_file(mut self, blob_name: impl Into<String>) -> Self {
        self.file = Some(blob_name.into());
        self
    }

    pub fn with_images(mut self, files: Vec<ImageFile>) -> Self {
        self.files = Some(files);
        self
    }

    /// Images attached to the request (empty when none)
    pub fn images(&self) -> &[ImageFile] {
        self.files.as_deref().unwrap_or_default()
    }
}

/// Outcome of one request, built fresh and never mutated after return
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestResult {
    pub content: String,
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub files: Vec<FileReference>,
    #[serde(default)]
    pub intermediate_steps: Vec<String>,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub code_content: String,
}

impl RequestResult {
    /// Result carrying only text, as produced by the vision path
    pub fn text(content: impl Into<String>, thread_id: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            thread_id: thread_id.into(),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_defaults_from_empty_annotation() {
        let source = Source::from(Annotation::default());
        assert_eq!(source, Source::default());
        assert_eq!(source.start_index, "");
    }

    #[test]
    fn test_source_from_annotation_stringifies_indices() {
        let annotation = Annotation {
            quote: Some("rated 240V".to_string()),
            title: Some(String::new()),
            url: None,
            start_index: Some(0),
            end_index: Some(12),
        };

        let source = Source::from(annotation);
        assert_eq!(source.quote, "rated 240V");
        assert_eq!(source.title, "");
        assert_eq!(source.url, "");
        assert_eq!(source.start_index, "0");
        assert_eq!(source.end_index, "12");
    }

    #[test]
    fn test_request_deserializes_with_optional_fields_absent() {
        let request: ChatThreadRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request.message, "hi");
        assert!(request.thread_id.is_none());
        assert!(request.images().is_empty());
    }

    #[test]
    fn test_image_file_tolerates_both_sources() {
        let file: ImageFile = serde_json::from_str(
            r#"{"name":"label.jpg","data_url":"data:image/jpeg;base64,AA==","blob_name":"label.jpg"}"#,
        )
        .unwrap();
        assert!(file.data_url.is_some());
        assert!(file.blob_name.is_some());
    }

    #[test]
    fn test_request_result_serializes_all_fields() {
        let value = serde_json::to_value(RequestResult::text("done", "thread_1")).unwrap();
        assert_eq!(value["content"], "done");
        assert_eq!(value["thread_id"], "thread_1");
        assert_eq!(value["code_content"], "");
        assert!(value["sources"].as_array().unwrap().is_empty());
        assert!(value["intermediate_steps"].as_array().unwrap().is_empty());
    }
}
