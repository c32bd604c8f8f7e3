use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const ENV_PREFIX: &str = "RAG_ASSISTANT";

/// Static process configuration, loaded once at start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,

    /// Identifier recorded in every persisted index; indexes built with a
    /// different model refuse to load.
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    /// Directory holding model.onnx and the tokenizer files.
    #[serde(default = "default_embedding_model_dir")]
    pub embedding_model_dir: PathBuf,

    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Passages handed to the QA engine per question.
    #[serde(default = "default_similarity_search_k")]
    pub similarity_search_k: usize,
    /// Upper bound on cached per-session QA engines.
    #[serde(default = "default_engine_cache_capacity")]
    pub engine_cache_capacity: usize,

    #[serde(default = "default_sessions_dir")]
    pub sessions_dir: PathBuf,
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

fn default_embedding_model_dir() -> PathBuf {
    PathBuf::from("models/all-MiniLM-L6-v2")
}

fn default_llm_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_llm_model() -> String {
    "llama3.2:1b".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_similarity_search_k() -> usize {
    10
}

fn default_engine_cache_capacity() -> usize {
    64
}

fn default_sessions_dir() -> PathBuf {
    PathBuf::from("sessions")
}

fn default_upload_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_allowed_extensions() -> Vec<String> {
    [
        ".pdf", ".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx", ".txt", ".jpg", ".jpeg", ".png",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            embedding_model: default_embedding_model(),
            embedding_model_dir: default_embedding_model_dir(),
            llm_base_url: default_llm_base_url(),
            llm_model: default_llm_model(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            similarity_search_k: default_similarity_search_k(),
            engine_cache_capacity: default_engine_cache_capacity(),
            sessions_dir: default_sessions_dir(),
            upload_dir: default_upload_dir(),
            max_file_size: default_max_file_size(),
            allowed_extensions: default_allowed_extensions(),
            cors_origins: default_cors_origins(),
        }
    }
}

impl Settings {
    /// Layer defaults, an optional TOML file and `RAG_ASSISTANT_*` variables.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(false));
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("allowed_extensions")
                .with_list_parse_key("cors_origins"),
        );

        let settings: Settings = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::Config(e.to_string()))?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.similarity_search_k == 0 {
            return Err(Error::Config("similarity_search_k must be greater than zero".to_string()));
        }
        if self.engine_cache_capacity == 0 {
            return Err(Error::Config(
                "engine_cache_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Case-insensitive check of a file name against `allowed_extensions`.
    pub fn is_allowed_file(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.allowed_extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }
}
