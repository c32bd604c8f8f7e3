use super::{prompts, Assistant, EXPLAIN};
use crate::error::Result;

impl Assistant {
    /// Explain `concept` from the session's notes through the cached QA engine.
    pub async fn explain(&self, session_id: &str, concept: &str) -> Result<String> {
        let concept = concept.trim();
        self.generate(&EXPLAIN, session_id, |_| prompts::explanation(concept))
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::llm::testing::ScriptedGenerator;
    use crate::tasks::testing::{assistant, seeded_session};

    #[tokio::test]
    async fn test_explanation_goes_through_qa_engine() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new("## What it is\nA shortage."));
        let assistant = assistant(dir.path(), llm.clone());
        let token = seeded_session(&assistant).await;

        let out = assistant.explain(&token, "  price ceiling ").await.unwrap();
        assert_eq!(out, "## What it is\nA shortage.");

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Explain the concept 'price ceiling' ONLY"));
        assert!(prompt.contains("A price ceiling below equilibrium creates a shortage."));
        assert!(prompt.ends_with("Helpful Answer:"));
        assert!(assistant.rag().engines().contains(&token).await);
    }
}
