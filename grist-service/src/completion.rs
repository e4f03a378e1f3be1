//! Completion model trait: the opaque text-completion boundary.

use async_trait::async_trait;
use grist_memory::Message;

use crate::error::Result;

/// An opaque text-completion function.
///
/// The orchestrator hands it a fixed system instruction and the assembled
/// user-visible messages; it returns the answer text. Any failure — provider
/// error or transport — must surface as
/// [`ServiceError::Model`](crate::ServiceError::Model).
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Produce a completion for the given system prompt and messages.
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String>;
}
