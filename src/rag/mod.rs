pub mod embeddings;
pub mod engine_cache;
pub mod index;

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::indexer::chunker::DocumentChunk;
use crate::llm::TextGenerator;
use self::embeddings::Embedder;
use self::engine_cache::EngineCache;
use self::index::RetrievalIndex;

/// Retrieval-then-generate over one session's index.
pub struct QaEngine {
    index: Arc<RetrievalIndex>,
    llm: Arc<dyn TextGenerator>,
    top_k: usize,
}

/// "Stuff" prompt: every retrieved passage, then the question.
pub fn qa_prompt(context: &str, question: &str) -> String {
    format!(
        "Use the following pieces of context to answer the question at the end. \
         If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n\
         {}\n\nQuestion: {}\nHelpful Answer:",
        context, question
    )
}

impl QaEngine {
    pub fn new(index: Arc<RetrievalIndex>, llm: Arc<dyn TextGenerator>, top_k: usize) -> Self {
        Self { index, llm, top_k }
    }

    pub async fn run(&self, question: &str) -> Result<String> {
        let hits = self.index.search(question, self.top_k).await?;
        let context = hits
            .iter()
            .map(|h| h.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        tracing::debug!("QA over {} retrieved chunks", hits.len());
        self.llm.complete(&qa_prompt(&context, question)).await
    }

    pub fn index(&self) -> &RetrievalIndex {
        &self.index
    }
}

/// Embedding model, language model and the engine cache, shared by all requests.
pub struct RagService {
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn TextGenerator>,
    engines: EngineCache,
    top_k: usize,
}

impl RagService {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn TextGenerator>,
        top_k: usize,
        cache_capacity: usize,
    ) -> Self {
        Self {
            embedder,
            llm,
            engines: EngineCache::new(cache_capacity),
            top_k,
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String> {
        self.llm.complete(prompt).await
    }

    pub async fn llm_healthy(&self) -> bool {
        self.llm.health_check().await.unwrap_or(false)
    }

    pub async fn build_index(
        &self,
        chunks: Vec<DocumentChunk>,
        dir: &Path,
    ) -> Result<RetrievalIndex> {
        RetrievalIndex::build(chunks, dir, Arc::clone(&self.embedder)).await
    }

    pub async fn load_index(&self, dir: &Path) -> Result<RetrievalIndex> {
        RetrievalIndex::load(dir, Arc::clone(&self.embedder)).await
    }

    pub fn qa_engine(&self, index: Arc<RetrievalIndex>) -> QaEngine {
        QaEngine::new(index, Arc::clone(&self.llm), self.top_k)
    }

    /// Seed the cache right after ingestion so the first question skips loading.
    pub async fn cache_qa_engine(&self, token: &str, engine: Arc<QaEngine>) {
        self.engines.insert(token, engine).await;
    }

    pub async fn get_or_build_qa_engine(&self, token: &str, dir: &Path) -> Result<Arc<QaEngine>> {
        if let Some(engine) = self.engines.get(token).await {
            tracing::debug!("QA engine cache hit for {}", token);
            return Ok(engine);
        }

        let index = self.load_index(dir).await?;
        let engine = Arc::new(self.qa_engine(Arc::new(index)));
        self.engines.insert(token, Arc::clone(&engine)).await;
        tracing::info!("Built QA engine for {}", token);
        Ok(engine)
    }

    pub async fn run_qa(&self, engine: &QaEngine, question: &str) -> Result<String> {
        engine.run(question).await
    }

    pub fn engines(&self) -> &EngineCache {
        &self.engines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::llm::testing::ScriptedGenerator;
    use embeddings::testing::HashEmbedder;

    fn chunks() -> Vec<DocumentChunk> {
        [
            "Opportunity cost is the value of the next best alternative.",
            "Marginal utility falls as consumption rises.",
        ]
        .iter()
        .enumerate()
        .map(|(i, t)| DocumentChunk {
            text: t.to_string(),
            page: 1,
            chunk_index: i,
        })
        .collect()
    }

    fn service(llm: Arc<ScriptedGenerator>, capacity: usize) -> RagService {
        RagService::new(Arc::new(HashEmbedder), llm, 1, capacity)
    }

    #[tokio::test]
    async fn test_qa_prompt_carries_top_k_context() {
        let dir = tempfile::tempdir().unwrap();
        let llm = Arc::new(ScriptedGenerator::new("It is the forgone alternative."));
        let rag = service(Arc::clone(&llm), 4);
        rag.build_index(chunks(), dir.path()).await.unwrap();

        let engine = rag.get_or_build_qa_engine("s1", dir.path()).await.unwrap();
        let answer = rag.run_qa(&engine, "What is opportunity cost?").await.unwrap();
        assert_eq!(answer, "It is the forgone alternative.");

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Opportunity cost is the value"));
        assert!(!prompt.contains("Marginal utility"), "top_k = 1 should keep one passage");
        assert!(prompt.ends_with("Question: What is opportunity cost?\nHelpful Answer:"));
    }

    #[tokio::test]
    async fn test_engine_is_reused_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let rag = service(Arc::new(ScriptedGenerator::new("ok")), 4);
        rag.build_index(chunks(), dir.path()).await.unwrap();

        let first = rag.get_or_build_qa_engine("s1", dir.path()).await.unwrap();
        let second = rag.get_or_build_qa_engine("s1", dir.path()).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let metrics = rag.engines().metrics().await;
        assert_eq!(metrics.misses, 1);
        assert_eq!(metrics.hits, 1);
    }

    #[tokio::test]
    async fn test_cache_is_bounded_lru() {
        let dir = tempfile::tempdir().unwrap();
        let rag = service(Arc::new(ScriptedGenerator::new("ok")), 2);
        rag.build_index(chunks(), dir.path()).await.unwrap();

        rag.get_or_build_qa_engine("a", dir.path()).await.unwrap();
        rag.get_or_build_qa_engine("b", dir.path()).await.unwrap();
        rag.get_or_build_qa_engine("a", dir.path()).await.unwrap();
        rag.get_or_build_qa_engine("c", dir.path()).await.unwrap();

        assert_eq!(rag.engines().len().await, 2);
        assert!(rag.engines().contains("a").await);
        assert!(!rag.engines().contains("b").await);
        assert!(rag.engines().contains("c").await);
        assert_eq!(rag.engines().metrics().await.evictions, 1);
    }

    #[tokio::test]
    async fn test_missing_index_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let rag = service(Arc::new(ScriptedGenerator::new("ok")), 2);

        let result = rag.get_or_build_qa_engine("empty", dir.path()).await;
        assert!(matches!(result, Err(Error::IndexNotFound(_))));
        assert_eq!(rag.engines().len().await, 0);
    }
}
