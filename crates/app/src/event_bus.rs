//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use astral_domain::error::AstralError;
use astral_domain::event::AssistantEvent;

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped). Cloning yields another handle to the
/// same channel.
#[derive(Clone)]
pub struct InProcessEventBus {
    sender: broadcast::Sender<AssistantEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events on this bus.
    ///
    /// Returns a receiver that will get all events published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AssistantEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(
        &self,
        event: AssistantEvent,
    ) -> impl Future<Output = Result<(), AstralError>> + Send {
        tracing::trace!(kind = event.kind(), "publishing event");
        // send fails only when there are zero receivers
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astral_domain::assistant::AssistantState;

    fn state_changed() -> AssistantEvent {
        AssistantEvent::StateChanged {
            from: AssistantState::Idle,
            to: AssistantState::Listening,
        }
    }

    #[tokio::test]
    async fn should_deliver_event_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(state_changed()).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, state_changed());
    }

    #[tokio::test]
    async fn should_deliver_event_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(AssistantEvent::DashboardToggled).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap(), AssistantEvent::DashboardToggled);
        assert_eq!(rx2.recv().await.unwrap(), AssistantEvent::DashboardToggled);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        let result = bus.publish(state_changed()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(state_changed()).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(AssistantEvent::DashboardToggled).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, AssistantEvent::DashboardToggled);
    }

    #[tokio::test]
    async fn should_share_channel_between_clones() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();
        let clone = bus.clone();

        clone.publish(AssistantEvent::DashboardToggled).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), AssistantEvent::DashboardToggled);
    }
}
