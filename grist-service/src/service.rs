//! The query orchestrator and the boundary operations a routing layer
//! consumes: index, search, query, and delete.

use std::sync::Arc;
use std::time::Instant;

use grist_memory::{ConversationStore, Message, Role};
use grist_rag::pipeline::RetrievalPipeline;
use grist_rag::{Document, Metadata, RagError, RetrievedChunk};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::completion::CompletionModel;
use crate::docstore::DocumentStore;
use crate::error::{Result, ServiceError};
use crate::telemetry::{Metrics, approximate_tokens};

/// Fixed instruction given to the completion model on every query.
const SYSTEM_PROMPT: &str = "You are a helpful research assistant. Ground your answer in the \
     provided context and keep it concise, explaining your reasoning.";

/// Default number of prior exchanges included in the history window.
const DEFAULT_MAX_HISTORY: usize = 5;

/// A search result as returned to boundary callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// The id of the source document.
    pub doc_id: String,
    /// 0-based chunk position within its indexing batch.
    pub chunk_idx: i32,
    /// The chunk text.
    pub chunk: String,
    /// Display similarity, `1 / (1 + distance)` — monotonically decreasing
    /// in distance and exactly 1.0 at distance zero.
    pub similarity: f32,
    /// Metadata snapshot stored with the chunk.
    pub metadata: Metadata,
}

impl From<RetrievedChunk> for SearchHit {
    fn from(retrieved: RetrievedChunk) -> Self {
        Self {
            doc_id: retrieved.doc_id,
            chunk_idx: retrieved.chunk_idx,
            chunk: retrieved.text,
            similarity: 1.0 / (1.0 + retrieved.distance),
            metadata: retrieved.metadata,
        }
    }
}

/// A question for the query endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The user's question.
    pub question: String,
    /// Continue an existing conversation; a fresh one is created if absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    /// Number of prior exchanges to include as history. Defaults to 5.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_history: Option<usize>,
}

impl QueryRequest {
    /// A request with defaults for everything but the question.
    pub fn new(question: impl Into<String>) -> Self {
        Self { question: question.into(), conversation_id: None, max_history: None }
    }

    /// Continue the given conversation.
    pub fn with_conversation_id(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Override the history window size, counted in exchanges.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = Some(max_history);
        self
    }
}

/// The answer to a query, with its grounding and conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    /// The model's answer.
    pub answer: String,
    /// Source document id per retrieved chunk; duplicates allowed.
    pub sources: Vec<String>,
    /// The raw chunk texts the answer was grounded on.
    pub chunks: Vec<String>,
    /// The conversation the exchange was recorded in.
    pub conversation_id: String,
    /// Total messages stored for the conversation after this exchange.
    pub history_length: usize,
}

/// The result of deleting a document and its indexed chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteOutcome {
    /// The requested document id.
    pub id: String,
    /// Whether a raw document record was removed.
    pub deleted_document: bool,
    /// Number of chunk rows removed from the vector index.
    pub deleted_chunks: u64,
}

/// The RAG service: every boundary operation the routing layer calls.
///
/// Built once at startup with its collaborators injected; request handlers
/// share it behind an `Arc`. There is no global instance.
pub struct RagService {
    pipeline: Arc<RetrievalPipeline>,
    documents: Arc<dyn DocumentStore>,
    memory: Arc<dyn ConversationStore>,
    model: Arc<dyn CompletionModel>,
    max_history: usize,
    metrics: Metrics,
}

impl RagService {
    /// Create a new [`RagServiceBuilder`].
    pub fn builder() -> RagServiceBuilder {
        RagServiceBuilder::default()
    }

    /// The retrieval pipeline.
    pub fn pipeline(&self) -> &Arc<RetrievalPipeline> {
        &self.pipeline
    }

    /// Save and index documents, returning the saved records.
    ///
    /// Indexing runs after each save and its failure is surfaced, but the
    /// save is not rolled back: a document may be stored and not yet
    /// searchable until it is re-indexed (at-least-once semantics).
    pub async fn index_documents(&self, documents: Vec<Document>) -> Result<Vec<Document>> {
        let mut saved_documents = Vec::with_capacity(documents.len());
        for document in documents {
            let saved = self.documents.save(document).await?;
            self.pipeline.index_document(&saved).await.inspect_err(|e| {
                error!(doc_id = saved.index_key(), error = %e, "indexing failed after save");
            })?;
            saved_documents.push(saved);
        }
        Ok(saved_documents)
    }

    /// Fetch a document by id. An unknown id is a typed miss.
    pub async fn get_document(&self, id: &str) -> Result<Document> {
        self.documents
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("document '{id}'")))
    }

    /// List documents, newest first, optionally filtered by title substring.
    pub async fn list_documents(
        &self,
        title_filter: Option<&str>,
        limit: usize,
    ) -> Result<Vec<Document>> {
        self.documents.list(title_filter, limit).await
    }

    /// Embed the query and return the `top_k` most similar chunks with
    /// display similarities.
    pub async fn search(&self, query: &str, top_k: Option<usize>) -> Result<Vec<SearchHit>> {
        self.metrics.search_requests.add(1, &[]);
        let top_k = top_k.unwrap_or(self.pipeline.config().top_k);

        let results = self.retrieve(query, top_k).await?;
        Ok(results.into_iter().map(SearchHit::from).collect())
    }

    /// Answer a question grounded in retrieved chunks and conversation
    /// history, recording the exchange into memory.
    ///
    /// The user message is appended before retrieval so a failed query still
    /// leaves the question in the conversation for retry; the assistant
    /// message is appended only on success — no partial answer is recorded.
    pub async fn query(&self, request: QueryRequest) -> Result<QueryOutcome> {
        let started = Instant::now();

        let conversation_id = match request.conversation_id {
            Some(id) => id,
            None => self.memory.create().await?,
        };
        self.memory.append(&conversation_id, Role::User, &request.question).await?;

        let retrieved = self.retrieve(&request.question, self.pipeline.config().top_k).await?;

        let max_history = request.max_history.unwrap_or(self.max_history);
        // The window is counted in exchanges (user + assistant pairs) and
        // includes the question appended above, which is dropped from the
        // prompt: the model sees it once, as the question itself.
        let window = self.memory.last_n(&conversation_id, max_history * 2).await?;
        let history = &window[..window.len().saturating_sub(1)];

        let prompt = build_prompt(history, &retrieved, &request.question);
        self.metrics.prompt_tokens.record(approximate_tokens(&prompt), &[]);

        let llm_started = Instant::now();
        let answer = self
            .model
            .complete(SYSTEM_PROMPT, &[Message::new(Role::User, prompt)])
            .await
            .inspect_err(|e| {
                error!(%conversation_id, error = %e, "completion failed");
            })?;
        self.metrics.llm_latency.record(llm_started.elapsed().as_secs_f64(), &[]);

        self.memory.append(&conversation_id, Role::Assistant, &answer).await?;
        let history_length = self.memory.len(&conversation_id).await?;

        let sources = retrieved.iter().map(|r| r.doc_id.clone()).collect();
        let chunks = retrieved.into_iter().map(|r| r.text).collect();

        self.metrics.query_latency.record(started.elapsed().as_secs_f64(), &[]);
        info!(%conversation_id, history_length, "answered query");

        Ok(QueryOutcome { answer, sources, chunks, conversation_id, history_length })
    }

    /// Delete a document's raw record and its indexed chunks.
    ///
    /// Returns a typed miss when neither store had the id.
    pub async fn delete_document(&self, id: &str) -> Result<DeleteOutcome> {
        let deleted_document = self.documents.delete(id).await?;
        let deleted_chunks = self.pipeline.index().delete_by_doc_id(id).await?;

        if !deleted_document && deleted_chunks == 0 {
            return Err(ServiceError::NotFound(format!("document '{id}'")));
        }

        info!(id, deleted_document, deleted_chunks, "deleted document");
        Ok(DeleteOutcome { id: id.to_string(), deleted_document, deleted_chunks })
    }

    /// Run retrieval, counting embedding failures distinctly.
    async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        self.pipeline.query(question, top_k).await.map_err(|e| {
            if matches!(e, RagError::Embedding { .. }) {
                self.metrics.embedding_failures.add(1, &[]);
            }
            e.into()
        })
    }
}

/// Assemble the completion prompt: the history block (when non-empty), the
/// chunk texts joined by blank lines, then the question.
fn build_prompt(history: &[Message], retrieved: &[RetrievedChunk], question: &str) -> String {
    let mut prompt = String::new();

    if !history.is_empty() {
        prompt.push_str("Conversation so far:\n");
        for message in history {
            prompt.push_str(&format!("{}: {}\n", message.role, message.content));
        }
        prompt.push('\n');
    }

    if !retrieved.is_empty() {
        let context: Vec<&str> = retrieved.iter().map(|r| r.text.as_str()).collect();
        prompt.push_str("Context:\n");
        prompt.push_str(&context.join("\n\n"));
        prompt.push_str("\n\n");
    }

    prompt.push_str(&format!("Question: {question}"));
    prompt
}

/// Builder for constructing a [`RagService`].
///
/// The pipeline, document store, conversation store, and completion model
/// are required; `max_history` defaults to 5 exchanges.
#[derive(Default)]
pub struct RagServiceBuilder {
    pipeline: Option<Arc<RetrievalPipeline>>,
    documents: Option<Arc<dyn DocumentStore>>,
    memory: Option<Arc<dyn ConversationStore>>,
    model: Option<Arc<dyn CompletionModel>>,
    max_history: Option<usize>,
}

impl RagServiceBuilder {
    /// Set the retrieval pipeline.
    pub fn pipeline(mut self, pipeline: Arc<RetrievalPipeline>) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Set the document store.
    pub fn documents(mut self, documents: Arc<dyn DocumentStore>) -> Self {
        self.documents = Some(documents);
        self
    }

    /// Set the conversation store.
    pub fn memory(mut self, memory: Arc<dyn ConversationStore>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Set the completion model.
    pub fn model(mut self, model: Arc<dyn CompletionModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// Set the default history window size, counted in exchanges.
    pub fn max_history(mut self, max_history: usize) -> Self {
        self.max_history = Some(max_history);
        self
    }

    /// Build the [`RagService`].
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Rag`] wrapping a configuration error if a
    /// required collaborator is missing.
    pub fn build(self) -> Result<RagService> {
        let missing = |what: &str| {
            ServiceError::Rag(RagError::Config(format!("{what} is required")))
        };
        Ok(RagService {
            pipeline: self.pipeline.ok_or_else(|| missing("pipeline"))?,
            documents: self.documents.ok_or_else(|| missing("documents"))?,
            memory: self.memory.ok_or_else(|| missing("memory"))?,
            model: self.model.ok_or_else(|| missing("model"))?,
            max_history: self.max_history.unwrap_or(DEFAULT_MAX_HISTORY),
            metrics: Metrics::new(),
        })
    }
}
