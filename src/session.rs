use std::path::PathBuf;

use anyhow::Context;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;

pub const RECORD_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Indexing,
    Ready,
}

/// Bookkeeping stored next to the index. Existence of a session is still
/// decided by the directory alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub status: SessionStatus,
}

/// A token must name a single directory entry under the root.
fn is_plain_token(token: &str) -> bool {
    !token.is_empty()
        && token != "."
        && token != ".."
        && !token.contains(['/', '\\'])
}

/// Maps session tokens to directories under the sessions root.
#[derive(Debug, Clone)]
pub struct SessionRegistry {
    root: PathBuf,
}

impl SessionRegistry {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `session_<unix seconds>_<8 hex chars>`; uniqueness comes from the
    /// random suffix, existing sessions are never consulted.
    pub fn generate_token() -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("session_{}_{}", Utc::now().timestamp(), &suffix[..8])
    }

    pub fn path_for(&self, token: &str) -> PathBuf {
        self.root.join(token)
    }

    /// Directory presence, for tokens that could have been issued at all.
    pub fn exists(&self, token: &str) -> bool {
        is_plain_token(token) && self.path_for(token).is_dir()
    }

    pub fn create_directory(&self, token: &str) -> Result<PathBuf> {
        let path = self.path_for(token);
        std::fs::create_dir_all(&path)?;
        Ok(path)
    }

    /// Write (or overwrite) the session record. `created_at` survives status updates.
    pub fn write_record(&self, token: &str, status: SessionStatus) -> Result<SessionRecord> {
        let created_at = self
            .read_record(token)
            .map(|r| r.created_at)
            .unwrap_or_else(|_| Utc::now());
        let record = SessionRecord {
            token: token.to_string(),
            created_at,
            status,
        };
        let path = self.path_for(token).join(RECORD_FILE_NAME);
        std::fs::write(&path, serde_json::to_string_pretty(&record)?)?;
        Ok(record)
    }

    pub fn read_record(&self, token: &str) -> anyhow::Result<SessionRecord> {
        let path = self.path_for(token).join(RECORD_FILE_NAME);
        let data = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read session record: {}", path.display()))?;
        let record = serde_json::from_str(&data)
            .with_context(|| format!("Malformed session record: {}", path.display()))?;
        Ok(record)
    }
}
