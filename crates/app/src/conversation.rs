//! Conversation — bounded LLM chat history plus the client that uses it.

use std::sync::{Mutex, MutexGuard, PoisonError};

use astral_domain::conversation::{ConversationHistory, Turn};
use astral_domain::error::ServiceError;

use crate::ports::LlmClient;

pub struct Conversation<L> {
    llm: L,
    history: Mutex<ConversationHistory>,
}

impl<L> Conversation<L>
where
    L: LlmClient + Sync,
{
    pub fn new(llm: L, history_limit: usize) -> Self {
        Self {
            llm,
            history: Mutex::new(ConversationHistory::with_limit(history_limit)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConversationHistory> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Send `message` with the prior turns as context. Both the message and
    /// the reply are appended to history only when the call succeeds.
    ///
    /// # Errors
    ///
    /// Propagates the collaborator's [`ServiceError`]; an empty reply is
    /// reported as [`ServiceError::Failure`].
    #[tracing::instrument(skip_all, fields(chars = message.len()))]
    pub async fn ask(&self, message: &str) -> Result<String, ServiceError> {
        let context = self.lock().snapshot();
        let reply = self.llm.send(message, &context).await?;
        if reply.content.trim().is_empty() {
            return Err(ServiceError::Failure("empty reply".to_string()));
        }

        let mut history = self.lock();
        history.push(Turn::user(message));
        history.push(Turn::assistant(reply.content.clone()));
        tracing::debug!(turns = history.len(), "conversation updated");
        Ok(reply.content)
    }

    /// Forget all turns.
    pub fn clear(&self) {
        self.lock().clear();
    }

    #[must_use]
    pub fn history(&self) -> Vec<Turn> {
        self.lock().snapshot()
    }
}
