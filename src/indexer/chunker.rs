use serde::{Deserialize, Serialize};

use super::extractor::PageText;

/// A span of document text with its source page. `chunk_index` runs across
/// the whole document, not per page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentChunk {
    pub text: String,
    pub page: usize,
    pub chunk_index: usize,
}

/// Round a byte position up to the next char boundary.
fn ceil_char_boundary(text: &str, byte_pos: usize) -> usize {
    if byte_pos >= text.len() {
        return text.len();
    }
    let mut pos = byte_pos;
    while pos < text.len() && !text.is_char_boundary(pos) {
        pos += 1;
    }
    pos
}

/// Round a byte position down to the previous char boundary.
fn floor_char_boundary(text: &str, byte_pos: usize) -> usize {
    if byte_pos >= text.len() {
        return text.len();
    }
    let mut pos = byte_pos;
    while pos > 0 && !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Split `text` into pieces of at most `max_chunk_size` bytes, each starting
/// `overlap` bytes before the previous one ended.
pub fn chunk_text(text: &str, max_chunk_size: usize, overlap: usize) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    if text.len() <= max_chunk_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;

    while start < text.len() {
        let end = floor_char_boundary(text, (start + max_chunk_size).min(text.len()));
        // a single char wider than the window still has to make progress
        let end = if end <= start { ceil_char_boundary(text, start + 1) } else { end };

        let actual_end = if end < text.len() {
            find_break_point(text, start, end)
        } else {
            end
        };

        let piece = text[start..actual_end].trim();
        if !piece.is_empty() {
            chunks.push(piece.to_string());
        }

        if actual_end >= text.len() {
            break;
        }

        let next_start = if actual_end > overlap {
            ceil_char_boundary(text, actual_end - overlap)
        } else {
            actual_end
        };

        start = if next_start <= start { actual_end } else { next_start };
    }

    chunks
}

/// Last paragraph break, then line break, then space inside the window.
fn find_break_point(text: &str, start: usize, max_end: usize) -> usize {
    let segment = &text[start..max_end];

    if let Some(pos) = segment.rfind("\n\n") {
        if pos > 0 {
            return start + pos + 2;
        }
    }
    if let Some(pos) = segment.rfind('\n') {
        if pos > 0 {
            return start + pos + 1;
        }
    }
    if let Some(pos) = segment.rfind(' ') {
        if pos > 0 {
            return start + pos + 1;
        }
    }
    max_end
}

/// Chunk every page, numbering chunks in document order.
pub fn split_pages(
    pages: &[PageText],
    max_chunk_size: usize,
    overlap: usize,
) -> Vec<DocumentChunk> {
    let mut chunks = Vec::new();
    for page in pages {
        for text in chunk_text(&page.text, max_chunk_size, overlap) {
            chunks.push(DocumentChunk {
                text,
                page: page.number,
                chunk_index: chunks.len(),
            });
        }
    }
    chunks
}

/// Text of the first `limit` chunks, newline-separated.
pub fn combine_text(chunks: &[DocumentChunk], limit: usize) -> String {
    chunks
        .iter()
        .take(limit)
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
