//! # grist-memory
//!
//! Append-only per-conversation message logs, used to build the bounded
//! chat-history window for prompting.
//!
//! The storage backend is pluggable through [`ConversationStore`];
//! [`InMemoryConversationStore`] is the process-local implementation: no
//! persistence, no eviction, conversations live for the lifetime of the
//! process.
//!
//! ```rust,ignore
//! use grist_memory::{ConversationStore, InMemoryConversationStore, Role};
//!
//! let store = InMemoryConversationStore::new();
//! let id = store.create().await?;
//! store.append(&id, Role::User, "What changed in Q3?").await?;
//! let window = store.last_n(&id, 10).await?;
//! ```

mod store;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::InMemoryConversationStore;

/// The author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A message from the querying user.
    User,
    /// A message produced by the model.
    Assistant,
}

impl Role {
    /// The wire label for this role (`user` / `assistant`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a conversation. Messages are never mutated or removed
/// once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl Message {
    /// Create a message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }
}

/// Errors from conversation storage backends.
///
/// The in-memory store never fails; the variant exists for persistent
/// implementations of [`ConversationStore`].
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The backing store failed.
    #[error("Conversation storage error: {0}")]
    Storage(String),
}

/// A convenience result type for conversation storage.
pub type Result<T> = std::result::Result<T, MemoryError>;

/// Keyed append-only storage of conversation messages.
///
/// Implementations must keep insertion order per conversation and must not
/// let appends to different conversations block each other; appends to the
/// same conversation serialize, since ordering matters.
#[async_trait::async_trait]
pub trait ConversationStore: Send + Sync {
    /// Create an empty conversation and return its fresh id.
    async fn create(&self) -> Result<String>;

    /// Append a message, creating the conversation if the id is unknown.
    async fn append(&self, conversation_id: &str, role: Role, content: &str) -> Result<()>;

    /// The `n` most recent messages, oldest-to-newest within that window.
    ///
    /// Returns fewer than `n` if the history is shorter, and an empty
    /// sequence for an unknown id.
    async fn last_n(&self, conversation_id: &str, n: usize) -> Result<Vec<Message>>;

    /// The full message sequence, oldest first. Empty for an unknown id.
    async fn history(&self, conversation_id: &str) -> Result<Vec<Message>>;

    /// The number of messages stored for this conversation.
    async fn len(&self, conversation_id: &str) -> Result<usize>;
}
