//! In-memory conversation store.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::{ConversationStore, Message, Result, Role};

type Log = Arc<Mutex<Vec<Message>>>;

/// A process-local [`ConversationStore`].
///
/// Each conversation owns its own lock, so appends to different
/// conversations run concurrently while appends to the same conversation
/// serialize. Not persistent and never evicts — conversations live for the
/// process lifetime.
#[derive(Debug, Default)]
pub struct InMemoryConversationStore {
    conversations: RwLock<HashMap<String, Log>>,
}

impl InMemoryConversationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the log for an id without creating it.
    async fn log_for(&self, conversation_id: &str) -> Option<Log> {
        let conversations = self.conversations.read().await;
        conversations.get(conversation_id).cloned()
    }

    /// Fetch the log for an id, creating an empty one for unknown ids.
    async fn log_or_create(&self, conversation_id: &str) -> Log {
        if let Some(log) = self.log_for(conversation_id).await {
            return log;
        }
        let mut conversations = self.conversations.write().await;
        conversations.entry(conversation_id.to_string()).or_default().clone()
    }
}

#[async_trait::async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(&self) -> Result<String> {
        let conversation_id = Uuid::new_v4().to_string();
        let mut conversations = self.conversations.write().await;
        conversations.insert(conversation_id.clone(), Log::default());
        debug!(%conversation_id, "created conversation");
        Ok(conversation_id)
    }

    async fn append(&self, conversation_id: &str, role: Role, content: &str) -> Result<()> {
        let log = self.log_or_create(conversation_id).await;
        let mut messages = log.lock().await;
        messages.push(Message::new(role, content));
        Ok(())
    }

    async fn last_n(&self, conversation_id: &str, n: usize) -> Result<Vec<Message>> {
        let Some(log) = self.log_for(conversation_id).await else {
            return Ok(Vec::new());
        };
        let messages = log.lock().await;
        let start = messages.len().saturating_sub(n);
        Ok(messages[start..].to_vec())
    }

    async fn history(&self, conversation_id: &str) -> Result<Vec<Message>> {
        let Some(log) = self.log_for(conversation_id).await else {
            return Ok(Vec::new());
        };
        let messages = log.lock().await;
        Ok(messages.clone())
    }

    async fn len(&self, conversation_id: &str) -> Result<usize> {
        let Some(log) = self.log_for(conversation_id).await else {
            return Ok(0);
        };
        Ok(log.lock().await.len())
    }
}
