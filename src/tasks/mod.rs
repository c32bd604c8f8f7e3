//! The five learning tools, expressed as one retrieve-then-generate pipeline
//! and a table of per-task parameters.

pub mod case_study;
pub mod explain;
pub mod helpers;
pub mod prompts;
pub mod quiz;
pub mod summarize;
pub mod visualize;

use crate::error::{Error, Result};
use crate::rag::RagService;
use crate::session::SessionRegistry;
use crate::settings::Settings;

/// Where a task's context comes from.
#[derive(Debug, Clone, Copy)]
pub enum ContextSource {
    /// The session's QA engine retrieves for the composed question itself.
    QaEngine,
    /// A fixed query against the session index; the hits become prompt content.
    Passages { query: &'static str, k: usize },
}

#[derive(Debug, Clone, Copy)]
pub struct TaskProfile {
    pub name: &'static str,
    pub missing_session: &'static str,
    pub source: ContextSource,
}

pub const EXPLAIN: TaskProfile = TaskProfile {
    name: "explanation",
    missing_session: "Session not found. Please upload a PDF first.",
    source: ContextSource::QaEngine,
};

pub const QUIZ: TaskProfile = TaskProfile {
    name: "quiz",
    missing_session: "Please upload a PDF first to load context.",
    source: ContextSource::Passages { query: "overview", k: 15 },
};

pub const CASE_STUDY: TaskProfile = TaskProfile {
    name: "case study",
    missing_session: "Please upload a PDF first to load context.",
    source: ContextSource::Passages { query: "overview", k: 15 },
};

pub const VISUALIZATION: TaskProfile = TaskProfile {
    name: "visualization",
    missing_session: "Please upload a PDF or CSV first to load context.",
    source: ContextSource::Passages { query: "data overview", k: 15 },
};

/// Everything a task needs: settings, the session registry and the RAG service.
pub struct Assistant {
    settings: Settings,
    sessions: SessionRegistry,
    rag: RagService,
}

impl Assistant {
    pub fn new(settings: Settings, rag: RagService) -> Self {
        let sessions = SessionRegistry::new(settings.sessions_dir.clone());
        Self {
            settings,
            sessions,
            rag,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    pub fn rag(&self) -> &RagService {
        &self.rag
    }

    /// Validate the session, gather context per `profile.source`, and return
    /// the raw model output. `compose` receives the retrieved passages (empty
    /// for QA-engine tasks) and returns the prompt or question.
    pub async fn generate<F>(
        &self,
        profile: &TaskProfile,
        session_id: &str,
        compose: F,
    ) -> Result<String>
    where
        F: FnOnce(&str) -> String,
    {
        if !self.sessions.exists(session_id) {
            return Err(Error::SessionNotFound(profile.missing_session));
        }

        let dir = self.sessions.path_for(session_id);
        let engine = self.rag.get_or_build_qa_engine(session_id, &dir).await?;

        match profile.source {
            ContextSource::QaEngine => {
                let question = compose("");
                tracing::info!("Generating {} for {}", profile.name, session_id);
                self.rag.run_qa(&engine, &question).await
            }
            ContextSource::Passages { query, k } => {
                let content = engine.index().search_text(query, k).await?;
                let prompt = compose(&content);
                tracing::info!("Generating {} for {}", profile.name, session_id);
                self.rag.complete(&prompt).await
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::*;
    use crate::indexer::chunker::DocumentChunk;
    use crate::llm::TextGenerator;
    use crate::rag::embeddings::testing::HashEmbedder;
    use crate::session::SessionStatus;

    pub const LECTURE: [&str; 4] = [
        "Supply and demand determine market prices in competitive markets.",
        "Price elasticity measures how quantity demanded responds to price changes.",
        "Table 1: unit sales by region. North 120, South 95, East 143, West 88.",
        "A price ceiling below equilibrium creates a shortage.",
    ];

    pub fn assistant(root: &std::path::Path, llm: Arc<dyn TextGenerator>) -> Assistant {
        let settings = Settings {
            sessions_dir: root.join("sessions"),
            upload_dir: root.join("uploads"),
            ..Settings::default()
        };
        let rag = RagService::new(
            Arc::new(HashEmbedder),
            llm,
            settings.similarity_search_k,
            settings.engine_cache_capacity,
        );
        Assistant::new(settings, rag)
    }

    /// A ready session indexed over `LECTURE`, as ingestion would leave it.
    pub async fn seeded_session(assistant: &Assistant) -> String {
        let token = SessionRegistry::generate_token();
        let dir = assistant.sessions().create_directory(&token).unwrap();
        let chunks = LECTURE
            .iter()
            .enumerate()
            .map(|(i, text)| DocumentChunk {
                text: text.to_string(),
                page: 1,
                chunk_index: i,
            })
            .collect();
        assistant.rag().build_index(chunks, &dir).await.unwrap();
        assistant.sessions().write_record(&token, SessionStatus::Ready).unwrap();
        token
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::testing::{assistant, seeded_session, LECTURE};
    use super::*;
    use crate::llm::testing::ScriptedGenerator;

    #[tokio::test]
    async fn test_unknown_session_uses_profile_message() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant(dir.path(), Arc::new(ScriptedGenerator::new("unused")));

        for profile in [EXPLAIN, QUIZ, CASE_STUDY, VISUALIZATION] {
            let err = assistant
                .generate(&profile, "session_0_deadbeef", |c| c.to_string())
                .await
                .unwrap_err();
            assert!(matches!(err, Error::SessionNotFound(_)));
            assert_eq!(err.to_string(), profile.missing_session);
        }
    }

    #[tokio::test]
    async fn test_passage_tasks_see_retrieved_content() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new("generated"));
        let assistant = assistant(dir.path(), llm.clone());
        let token = seeded_session(&assistant).await;

        let out = assistant
            .generate(&CASE_STUDY, &token, |content| format!("PROMPT\n{}", content))
            .await
            .unwrap();
        assert_eq!(out, "generated");

        let prompt = llm.last_prompt().unwrap();
        // k = 15 exceeds the index, so every chunk is included
        for text in LECTURE {
            assert!(prompt.contains(text));
        }
    }

    #[tokio::test]
    async fn test_directory_without_index_reports_index_error() {
        let dir = tempfile::tempdir().unwrap();
        let assistant = assistant(dir.path(), Arc::new(ScriptedGenerator::new("unused")));
        let token = SessionRegistry::generate_token();
        assistant.sessions().create_directory(&token).unwrap();

        let err = assistant.generate(&QUIZ, &token, |c| c.to_string()).await.unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(_)));
    }
}
