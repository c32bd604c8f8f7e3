use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::embeddings::Embedder;
use crate::error::{Error, Result};
use crate::indexer::chunker::DocumentChunk;

pub const INDEX_FILE_NAME: &str = "index.json";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

const FORMAT_VERSION: u32 = 1;
const EMBED_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexedChunk {
    #[serde(flatten)]
    chunk: DocumentChunk,
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexData {
    model: String,
    dimension: usize,
    entries: Vec<IndexedChunk>,
}

/// Written after the data file; its presence marks a complete index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexManifest {
    pub version: u32,
    pub model: String,
    pub dimension: usize,
    pub chunk_count: usize,
    /// Hex SHA-256 of the data file.
    pub checksum: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SearchHit {
    pub chunk: DocumentChunk,
    pub score: f32,
}

/// Flat vector index over one document, persisted in a session directory.
pub struct RetrievalIndex {
    data: IndexData,
    embedder: Arc<dyn Embedder>,
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

impl RetrievalIndex {
    /// Embed every chunk and persist the vectors under `dir`.
    pub async fn build(
        chunks: Vec<DocumentChunk>,
        dir: &Path,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let mut entries = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = embedder.embed(texts).await?;
            if vectors.len() != batch.len() {
                return Err(Error::Embedding(format!(
                    "expected {} vectors, got {}",
                    batch.len(),
                    vectors.len()
                )));
            }
            entries.extend(
                batch
                    .iter()
                    .cloned()
                    .zip(vectors)
                    .map(|(chunk, embedding)| IndexedChunk { chunk, embedding }),
            );
        }

        let data = IndexData {
            model: embedder.model_id().to_string(),
            dimension: entries.first().map(|e| e.embedding.len()).unwrap_or(0),
            entries,
        };

        let bytes = serde_json::to_vec(&data)?;
        let manifest = IndexManifest {
            version: FORMAT_VERSION,
            model: data.model.clone(),
            dimension: data.dimension,
            chunk_count: data.entries.len(),
            checksum: checksum(&bytes),
            created_at: Utc::now(),
        };

        tokio::fs::create_dir_all(dir).await?;
        tokio::fs::write(dir.join(INDEX_FILE_NAME), &bytes).await?;
        tokio::fs::write(
            dir.join(MANIFEST_FILE_NAME),
            serde_json::to_string_pretty(&manifest)?,
        )
        .await?;

        tracing::info!(
            "Built index with {} chunks ({}D) in {}",
            manifest.chunk_count,
            manifest.dimension,
            dir.display()
        );

        Ok(Self {
            data,
            embedder,
        })
    }

    /// Reopen a persisted index without re-embedding.
    pub async fn load(dir: &Path, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let manifest_path = dir.join(MANIFEST_FILE_NAME);
        let data_path = dir.join(INDEX_FILE_NAME);
        if !manifest_path.is_file() || !data_path.is_file() {
            return Err(Error::IndexNotFound(dir.to_path_buf()));
        }

        let corrupt = |reason: String| Error::IndexCorrupt {
            path: dir.to_path_buf(),
            reason,
        };

        let manifest_text = tokio::fs::read_to_string(&manifest_path).await?;
        let manifest: IndexManifest = serde_json::from_str(&manifest_text)
            .map_err(|e| corrupt(format!("unreadable manifest: {}", e)))?;

        let bytes = tokio::fs::read(&data_path).await?;
        if checksum(&bytes) != manifest.checksum {
            return Err(corrupt("checksum mismatch".to_string()));
        }

        let data: IndexData = serde_json::from_slice(&bytes)
            .map_err(|e| corrupt(format!("unreadable index data: {}", e)))?;

        if data.entries.len() != manifest.chunk_count {
            return Err(corrupt(format!(
                "manifest lists {} chunks, data holds {}",
                manifest.chunk_count,
                data.entries.len()
            )));
        }
        if data.model != embedder.model_id() {
            return Err(corrupt(format!(
                "embedded with '{}', current model is '{}'",
                data.model,
                embedder.model_id()
            )));
        }

        tracing::debug!("Loaded index with {} chunks from {}", data.entries.len(), dir.display());
        Ok(Self {
            data,
            embedder,
        })
    }

    /// The `k` chunks closest to `query`, most similar first.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 || self.data.entries.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed_one(query).await?;

        let mut scored: Vec<(f32, &IndexedChunk)> = self
            .data
            .entries
            .iter()
            .map(|entry| (cosine_similarity(&query_embedding, &entry.embedding), entry))
            .collect();

        // stable: equal scores keep document order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(score, entry)| SearchHit {
                chunk: entry.chunk.clone(),
                score,
            })
            .collect())
    }

    /// Retrieved chunk texts joined by newlines, ready for a prompt.
    pub async fn search_text(&self, query: &str, k: usize) -> Result<String> {
        let hits = self.search(query, k).await?;
        Ok(hits
            .iter()
            .map(|h| h.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }
}
