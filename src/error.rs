//! Error type shared by every component.
//!
//! The HTTP surface flattens all of these into `{"error": <message>}`, so the
//! `Display` output of each variant is what a client ends up reading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No session directory exists for the token; carries the handler's message.
    #[error("{0}")]
    SessionNotFound(&'static str),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("File type not allowed: {0}")]
    FileTypeNotAllowed(String),

    #[error("File too large: {size} bytes (limit is {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to extract text from '{file}': {message}")]
    Extraction { file: String, message: String },

    #[error("No text could be extracted from the uploaded document")]
    EmptyDocument,

    #[error("Index not found in {}", .0.display())]
    IndexNotFound(PathBuf),

    #[error("Index in {} is corrupt: {reason}", .path.display())]
    IndexCorrupt { path: PathBuf, reason: String },

    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    /// The model answered, but not in a shape the task can use.
    #[error("{0}")]
    InvalidModelOutput(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}
