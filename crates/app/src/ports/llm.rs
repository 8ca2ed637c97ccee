//! LLM port — the general-query collaborator.

use std::future::Future;

use astral_domain::conversation::Turn;
use astral_domain::error::ServiceError;

/// Text produced by the language model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmReply {
    pub content: String,
}

/// Chat-style language model.
///
/// `history` holds the prior turns, oldest first, *excluding* `message`.
/// Implementations are responsible for any system prompt and for their
/// own request timeout.
pub trait LlmClient {
    fn send(
        &self,
        message: &str,
        history: &[Turn],
    ) -> impl Future<Output = Result<LlmReply, ServiceError>> + Send;
}

impl<T: LlmClient + Send + Sync> LlmClient for std::sync::Arc<T> {
    fn send(
        &self,
        message: &str,
        history: &[Turn],
    ) -> impl Future<Output = Result<LlmReply, ServiceError>> + Send {
        (**self).send(message, history)
    }
}
