use std::sync::Arc;

use serde::Serialize;

use super::{prompts, Assistant};
use crate::error::{Error, Result};
use crate::indexer::chunker::combine_text;
use crate::indexer::extract_and_split;
use crate::indexer::upload::{save_upload, validate_upload};
use crate::session::{SessionRegistry, SessionStatus};

/// Chunks fed to the summary prompt; the rest are only indexed.
pub const SUMMARY_CHUNK_LIMIT: usize = 15;

#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub summary: String,
    pub session_id: String,
}

impl Assistant {
    /// Ingest an uploaded document into a new session and summarize its opening chunks.
    pub async fn summarize(&self, filename: &str, data: &[u8]) -> Result<Summary> {
        let settings = self.settings();
        validate_upload(settings, filename, data.len())?;

        // removed when this guard drops, whichever way the function exits
        let upload = save_upload(&settings.upload_dir, filename, data).await?;

        let path = upload.path().to_path_buf();
        let (chunk_size, overlap) = (settings.chunk_size, settings.chunk_overlap);
        let chunks =
            tokio::task::spawn_blocking(move || extract_and_split(&path, chunk_size, overlap))
                .await
                .map_err(|e| Error::Extraction {
                    file: upload.original_name().to_string(),
                    message: e.to_string(),
                })??;
        let content = combine_text(&chunks, SUMMARY_CHUNK_LIMIT);

        let token = SessionRegistry::generate_token();
        let dir = self.sessions().create_directory(&token)?;
        self.sessions().write_record(&token, SessionStatus::Indexing)?;

        let index = self.rag().build_index(chunks, &dir).await?;
        let engine = Arc::new(self.rag().qa_engine(Arc::new(index)));
        self.rag().cache_qa_engine(&token, engine).await;
        self.sessions().write_record(&token, SessionStatus::Ready)?;
        tracing::info!("Session {} ready for {}", token, upload.original_name());

        let summary = self.rag().complete(&prompts::summary(&content)).await?;
        Ok(Summary {
            summary,
            session_id: token,
        })
    }
}
