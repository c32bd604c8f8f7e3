pub mod chunker;
pub mod extractor;
pub mod upload;

use std::path::Path;

use crate::error::Result;
use self::chunker::{split_pages, DocumentChunk};
use self::extractor::extract_pages;

/// Extract a saved document and split it into overlapping chunks.
pub fn extract_and_split(
    path: &Path,
    chunk_size: usize,
    overlap: usize,
) -> Result<Vec<DocumentChunk>> {
    let pages = extract_pages(path)?;
    let chunks = split_pages(&pages, chunk_size, overlap);
    tracing::info!(
        "Split {} into {} chunks across {} pages",
        path.display(),
        chunks.len(),
        pages.len()
    );
    Ok(chunks)
}
