//! # Quickstart demo
//!
//! Runs the full backend in memory: index documents, search them, then hold
//! a two-turn grounded conversation.
//!
//! Uses a deterministic hash-based embedder and a canned completion model so
//! it runs with **zero API keys**.
//!
//! Run: `cargo run -p demos --bin quickstart`

use std::sync::Arc;

use async_trait::async_trait;
use grist_memory::{InMemoryConversationStore, Message};
use grist_rag::{
    Document, EmbeddingProvider, InMemoryIndex, RagConfig, RecursiveChunker, RetrievalPipeline,
};
use grist_service::{CompletionModel, InMemoryDocumentStore, QueryRequest, RagService};

// ---------------------------------------------------------------------------
// MockEmbedder — deterministic hash-based embeddings for demos/tests
// ---------------------------------------------------------------------------

struct MockEmbedder {
    dimensions: usize,
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed_one(&self, text: &str) -> grist_rag::Result<Vec<f32>> {
        // Deterministic embedding: hash the text bytes, then generate a
        // normalised vector whose direction depends on the content.
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb: Vec<f32> =
            (0..self.dimensions).map(|i| ((hash.wrapping_add(i as u64)) as f32).sin()).collect();
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

// ---------------------------------------------------------------------------
// EchoModel — answers by summarising what it was shown
// ---------------------------------------------------------------------------

struct EchoModel;

#[async_trait]
impl CompletionModel for EchoModel {
    async fn complete(
        &self,
        _system_prompt: &str,
        messages: &[Message],
    ) -> grist_service::Result<String> {
        let prompt_chars: usize = messages.iter().map(|m| m.content.chars().count()).sum();
        Ok(format!("(canned answer grounded in a {prompt_chars}-character prompt)"))
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    // -- 1. Build the pipeline with in-memory components ------------------
    let config = RagConfig::builder().chunk_size(200).chunk_overlap(50).dimensions(64).build()?;
    let pipeline = Arc::new(
        RetrievalPipeline::builder()
            .config(config.clone())
            .embedder(Arc::new(MockEmbedder { dimensions: config.dimensions }))
            .index(Arc::new(InMemoryIndex::new(config.dimensions)))
            .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)?))
            .build()?,
    );

    // -- 2. Wire the service ----------------------------------------------
    let service = RagService::builder()
        .pipeline(pipeline)
        .documents(Arc::new(InMemoryDocumentStore::new()))
        .memory(Arc::new(InMemoryConversationStore::new()))
        .model(Arc::new(EchoModel))
        .build()?;

    // -- 3. Index sample documents ----------------------------------------
    let documents = vec![
        Document::new(
            "Rust overview",
            "Rust is a systems programming language focused on safety, speed, \
             and concurrency. It achieves memory safety without a garbage \
             collector through its ownership system.",
        ),
        Document::new(
            "RAG overview",
            "Retrieval-Augmented Generation combines a retrieval system with a \
             language model. Documents are chunked, embedded, and stored in a \
             vector index. At query time the most relevant chunks are retrieved \
             and fed to the model as context.",
        ),
    ];

    let saved = service.index_documents(documents).await?;
    println!("Indexed {} documents.", saved.len());

    // -- 4. Search ---------------------------------------------------------
    let hits = service.search("memory safety without garbage collection", None).await?;
    println!("\nSearch results:");
    for (i, hit) in hits.iter().enumerate() {
        println!(
            "  {}. [similarity={:.4}] doc={} | {}",
            i + 1,
            hit.similarity,
            hit.doc_id,
            &hit.chunk[..hit.chunk.len().min(60)],
        );
    }

    // -- 5. A two-turn conversation ---------------------------------------
    let first = service.query(QueryRequest::new("How does retrieval grounding work?")).await?;
    println!("\nQ1 answer: {}", first.answer);

    let second = service
        .query(
            QueryRequest::new("And how are the chunks produced?")
                .with_conversation_id(first.conversation_id.clone()),
        )
        .await?;
    println!("Q2 answer: {}", second.answer);
    println!(
        "Conversation {} now holds {} messages.",
        second.conversation_id, second.history_length
    );

    Ok(())
}
