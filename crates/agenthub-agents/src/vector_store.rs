use std::sync::Arc;

use anyhow::Result;

use crate::services::{ThreadService, VectorStoreService};

/// What the binder did with a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// No thread was given; a new thread was created around a new store
    CreatedThread { thread_id: String, vector_store_id: String },
    /// The thread had no store; a new one was created and attached
    AttachedNewStore { thread_id: String, vector_store_id: String },
    /// The file joined the thread's first existing store
    AddedToExistingStore { thread_id: String, vector_store_id: String },
    /// Binding failed and was logged; the caller keeps its own thread
    Skipped,
}

impl BindOutcome {
    /// Thread the conversation should continue on, if binding produced one
    pub fn thread_id(&self) -> Option<&str> {
        match self {
            Self::CreatedThread { thread_id, .. }
            | Self::AttachedNewStore { thread_id, .. }
            | Self::AddedToExistingStore { thread_id, .. } => Some(thread_id),
            Self::Skipped => None,
        }
    }
}

/// Makes an uploaded file searchable within a thread's file-search scope
#[derive(Clone)]
pub struct VectorStoreBinder {
    threads: Arc<dyn ThreadService>,
    vector_stores: Arc<dyn VectorStoreService>,
}

impl VectorStoreBinder {
    pub fn new(threads: Arc<dyn ThreadService>, vector_stores: Arc<dyn VectorStoreService>) -> Self {
        Self {
            threads,
            vector_stores,
        }
    }

    /// Bind `file_id` to `thread_id` (or to a fresh thread when None).
    ///
    /// Never fails; errors are logged and reported as [`BindOutcome::Skipped`].
    pub async fn bind(&self, file_id: &str, thread_id: Option<&str>) -> BindOutcome {
        match self.try_bind(file_id, thread_id).await {
            Ok(outcome) => {
                tracing::info!(file_id, outcome = ?outcome, "File bound to thread");
                outcome
            }
            Err(e) => {
                tracing::error!(file_id, thread_id, error = %e, "Failed to attach file to vector store");
                BindOutcome::Skipped
            }
        }
    }

    async fn try_bind(&self, file_id: &str, thread_id: Option<&str>) -> Result<BindOutcome> {
        let file_ids = [file_id.to_string()];

        let Some(thread_id) = thread_id else {
            let vector_store_id = self.create_store(&file_ids).await?;
            let thread = self
                .threads
                .create_thread(std::slice::from_ref(&vector_store_id))
                .await?;
            return Ok(BindOutcome::CreatedThread {
                thread_id: thread.id,
                vector_store_id,
            });
        };

        let existing = match self.threads.get_thread(thread_id).await {
            Ok(thread) => thread.vector_store_ids.into_iter().next(),
            Err(e) => {
                tracing::warn!(thread_id, error = %e, "Thread lookup failed, treating as unindexed");
                None
            }
        };

        match existing {
            Some(vector_store_id) => {
                self.vector_stores.add_file(&vector_store_id, file_id).await?;
                Ok(BindOutcome::AddedToExistingStore {
                    thread_id: thread_id.to_string(),
                    vector_store_id,
                })
            }
            None => {
                let vector_store_id = self.create_store(&file_ids).await?;
                self.threads
                    .update_thread(thread_id, std::slice::from_ref(&vector_store_id))
                    .await?;
                Ok(BindOutcome::AttachedNewStore {
                    thread_id: thread_id.to_string(),
                    vector_store_id,
                })
            }
        }
    }

    async fn create_store(&self, file_ids: &[String]) -> Result<String> {
        let name = format!("agenthub_vs_{}", uuid::Uuid::new_v4());
        self.vector_stores.create_vector_store(&name, file_ids).await
    }
}
