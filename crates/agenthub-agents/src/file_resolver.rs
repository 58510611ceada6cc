// Turns image references into raw bytes plus a media type

use std::sync::Arc;

use agenthub_types::ImageFile;
use base64::Engine;

use crate::services::BlobStore;

const DEFAULT_MEDIA_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub bytes: Vec<u8>,
    pub media_type: String,
}

/// Resolves [`ImageFile`]s from inline data URLs or blob storage
///
/// Resolution never fails loudly; anything unusable yields `None` and a
/// warning.
#[derive(Clone, Default)]
pub struct FileResolver {
    blob_store: Option<Arc<dyn BlobStore>>,
}

impl FileResolver {
    pub fn new(blob_store: Option<Arc<dyn BlobStore>>) -> Self {
        Self { blob_store }
    }

    pub async fn resolve(&self, file: &ImageFile) -> Option<ResolvedImage> {
        // A non-empty data URL takes precedence, even when it turns out to be invalid
        if let Some(data_url) = file.data_url.as_deref().filter(|d| !d.is_empty()) {
            let resolved = decode_data_url(data_url);
            if resolved.is_none() {
                tracing::warn!(file = %file.name, "Invalid data URL, skipping image");
            }
            return resolved;
        }

        let Some(blob_name) = file.blob_name.as_deref().filter(|b| !b.is_empty()) else {
            tracing::warn!(file = %file.name, "Image has neither data URL nor blob name");
            return None;
        };
        let Some(store) = &self.blob_store else {
            tracing::warn!(file = %file.name, "Blob storage not configured, skipping image");
            return None;
        };

        let blob = match store.download(blob_name).await {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!(file = %file.name, blob = blob_name, error = %e, "Failed to download image");
                return None;
            }
        };

        let media_type = blob
            .content_type
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_MEDIA_TYPE.to_string());
        ResolvedImage::new(blob.bytes, media_type)
    }
}

impl ResolvedImage {
    fn new(bytes: Vec<u8>, media_type: String) -> Option<Self> {
        if bytes.is_empty() || media_type.is_empty() {
            return None;
        }
        Some(Self { bytes, media_type })
    }
}

/// Decode `data:<media-type>;base64,<payload>`
///
/// Returns `None` unless the URL starts with `data:`, splits into exactly
/// header and payload, the header ends in `;base64`, and both media type
/// and payload are non-empty.
pub fn decode_data_url(data_url: &str) -> Option<ResolvedImage> {
    let rest = data_url.strip_prefix("data:")?;
    let parts: Vec<&str> = rest.split(',').collect();
    let [header, payload] = parts.as_slice() else {
        return None;
    };

    let params = header.strip_suffix(";base64")?;
    let media_type = params.split(';').next().unwrap_or_default();
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;

    ResolvedImage::new(bytes, media_type.to_string())
}
