//! End-to-end pipeline tests over in-memory components with a
//! deterministic mock embedder.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use grist_rag::chunking::RecursiveChunker;
use grist_rag::config::RagConfig;
use grist_rag::document::Document;
use grist_rag::embedding::EmbeddingProvider;
use grist_rag::error::{RagError, Result};
use grist_rag::inmemory::InMemoryIndex;
use grist_rag::pipeline::RetrievalPipeline;
use grist_rag::retry::{RetryPolicy, retry_fixed};

/// Deterministic hash-based embeddings, L2-normalized.
struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb: Vec<f32> =
            (0..self.dimensions).map(|i| ((hash.wrapping_add(i as u64)) as f32).sin()).collect();
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        emb
    }
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vector_for(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// An embedder whose backend fails a fixed number of times before
/// succeeding, retried the way real providers retry.
struct FlakyEmbedder {
    inner: MockEmbedder,
    failures: AtomicU32,
    retry: RetryPolicy,
}

#[async_trait]
impl EmbeddingProvider for FlakyEmbedder {
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        retry_fixed(self.retry, || async {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(RagError::Embedding {
                    provider: "Flaky".to_string(),
                    message: "backend unavailable".to_string(),
                });
            }
            self.inner.embed_one(text).await
        })
        .await
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }
}

fn build_pipeline(config: RagConfig) -> RetrievalPipeline {
    RetrievalPipeline::builder()
        .config(config.clone())
        .embedder(Arc::new(MockEmbedder::new(config.dimensions)))
        .index(Arc::new(InMemoryIndex::new(config.dimensions)))
        .chunker(Arc::new(
            RecursiveChunker::new(config.chunk_size, config.chunk_overlap).unwrap(),
        ))
        .build()
        .unwrap()
}

/// A 1000-character passage of 200 five-character words.
fn quarterly_passage() -> String {
    (0..200).map(|i| format!("q{i:03} ")).collect()
}

#[tokio::test]
async fn indexing_a_document_reports_its_chunk_count() {
    let config = RagConfig::builder().dimensions(16).build().unwrap();
    let pipeline = build_pipeline(config);

    let mut doc = Document::new("Acme Q3", quarterly_passage());
    doc.id = Some("doc-acme-q3".to_string());

    let indexed = pipeline.index_document(&doc).await.unwrap();
    assert_eq!(indexed, 3);
}

#[tokio::test]
async fn empty_documents_index_zero_chunks_without_error() {
    let config = RagConfig::builder().dimensions(16).build().unwrap();
    let pipeline = build_pipeline(config);

    let doc = Document::new("Empty", "");
    assert_eq!(pipeline.index_document(&doc).await.unwrap(), 0);
    assert!(pipeline.query("anything", 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn query_returns_all_indexed_chunks_ranked_by_distance() {
    let config = RagConfig::builder().dimensions(16).build().unwrap();
    let top_k = config.top_k;
    let pipeline = build_pipeline(config);

    let mut doc = Document::new("Acme Q3", quarterly_passage());
    doc.id = Some("doc-acme-q3".to_string());
    pipeline.index_document(&doc).await.unwrap();

    let results = pipeline.query("What were Acme's Q3 results?", top_k).await.unwrap();
    assert_eq!(results.len(), 3);
    for window in results.windows(2) {
        assert!(window[0].distance <= window[1].distance);
    }
    for result in &results {
        assert_eq!(result.doc_id, "doc-acme-q3");
        assert_eq!(result.metadata.get("title").and_then(|v| v.as_str()), Some("Acme Q3"));
    }
}

#[tokio::test]
async fn documents_without_an_id_index_under_their_title() {
    let config = RagConfig::builder().dimensions(16).build().unwrap();
    let pipeline = build_pipeline(config);

    let doc = Document::new("Untracked notes", "A single short note.");
    pipeline.index_document(&doc).await.unwrap();

    let results = pipeline.query("short note", 1).await.unwrap();
    assert_eq!(results[0].doc_id, "Untracked notes");
}

#[tokio::test]
async fn chunk_metadata_merges_title_over_document_metadata() {
    let config = RagConfig::builder().dimensions(16).build().unwrap();
    let pipeline = build_pipeline(config);

    let mut doc = Document::new("Report", "Contents of the report.");
    doc.id = Some("doc-1".to_string());
    doc.metadata.insert("quarter".to_string(), serde_json::json!("Q3"));
    pipeline.index_document(&doc).await.unwrap();

    let results = pipeline.query("report", 1).await.unwrap();
    let metadata = &results[0].metadata;
    assert_eq!(metadata.get("title").and_then(|v| v.as_str()), Some("Report"));
    assert_eq!(metadata.get("quarter").and_then(|v| v.as_str()), Some("Q3"));
}

#[tokio::test]
async fn builder_rejects_dimension_disagreement() {
    let config = RagConfig::builder().dimensions(16).build().unwrap();
    let result = RetrievalPipeline::builder()
        .config(config)
        .embedder(Arc::new(MockEmbedder::new(16)))
        .index(Arc::new(InMemoryIndex::new(384)))
        .chunker(Arc::new(RecursiveChunker::new(500, 50).unwrap()))
        .build();
    assert!(matches!(result, Err(RagError::Pipeline(_))));
}

#[tokio::test(start_paused = true)]
async fn embedding_recovers_after_two_transient_failures() {
    let retry = RetryPolicy::default();
    let embedder = FlakyEmbedder {
        inner: MockEmbedder::new(16),
        failures: AtomicU32::new(2),
        retry,
    };

    let started = tokio::time::Instant::now();
    let embedding = embedder.embed_one("resilient query").await.unwrap();

    assert_eq!(embedding.len(), 16);
    assert!(started.elapsed() >= retry.delay * 2);
}

#[tokio::test(start_paused = true)]
async fn embedding_failure_propagates_after_retries_are_exhausted() {
    let embedder = FlakyEmbedder {
        inner: MockEmbedder::new(16),
        failures: AtomicU32::new(5),
        retry: RetryPolicy::default(),
    };

    let result = embedder.embed_one("doomed query").await;
    assert!(matches!(result, Err(RagError::Embedding { .. })));
    // Three attempts consumed three of the five scripted failures.
    assert_eq!(embedder.failures.load(Ordering::SeqCst), 2);
}
