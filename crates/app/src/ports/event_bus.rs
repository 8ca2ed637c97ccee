//! Event bus port — publish/subscribe for assistant events.

use std::future::Future;

use astral_domain::error::AstralError;
use astral_domain::event::AssistantEvent;

/// Publishes assistant events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(
        &self,
        event: AssistantEvent,
    ) -> impl Future<Output = Result<(), AstralError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(
        &self,
        event: AssistantEvent,
    ) -> impl Future<Output = Result<(), AstralError>> + Send {
        (**self).publish(event)
    }
}
