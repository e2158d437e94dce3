//! Broadcast event bus for distributing `ModuleEvent` to multiple subscribers.
//!
//! Built on `tokio::sync::broadcast`. Publishing with no active subscribers
//! is a no-op.

use convs_types::event::ModuleEvent;
use tokio::sync::broadcast;

/// Multi-consumer bus for module completion events.
///
/// Cloning the bus clones the sender, so the CLI, the REST API and any
/// in-process listener all observe the same stream.
#[derive(Clone)]
pub struct ModuleEventBus {
    sender: broadcast::Sender<ModuleEvent>,
}

impl ModuleEventBus {
    /// Create a new event bus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Create a new subscriber that will receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ModuleEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: ModuleEvent) {
        let _ = self.sender.send(event);
    }
}

impl std::fmt::Debug for ModuleEventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleEventBus")
            .field("receiver_count", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convs_types::bot::BotId;
    use convs_types::module::BotModuleId;

    fn sample_event() -> ModuleEvent {
        ModuleEvent::ModuleDeleted {
            module_id: BotModuleId::new(),
            parent_bot: BotId::new(),
        }
    }

    #[tokio::test]
    async fn publish_and_subscribe_delivers_event() {
        let bus = ModuleEventBus::new(16);
        let mut rx = bus.subscribe();

        let event = sample_event();
        let id = event.module_id().clone();
        bus.publish(event);

        let received = rx.recv().await.unwrap();
        assert_eq!(received.module_id(), &id);
    }

    #[tokio::test]
    async fn multiple_subscribers_each_receive_event() {
        let bus = ModuleEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(sample_event());

        assert!(matches!(rx1.recv().await.unwrap(), ModuleEvent::ModuleDeleted { .. }));
        assert!(matches!(rx2.recv().await.unwrap(), ModuleEvent::ModuleDeleted { .. }));
    }

    #[test]
    fn publish_with_no_subscribers_does_not_panic() {
        let bus = ModuleEventBus::new(16);
        bus.publish(sample_event());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let bus = ModuleEventBus::new(0);
        let mut rx = bus.subscribe();
        bus.publish(sample_event());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn clone_shares_channel() {
        let bus = ModuleEventBus::new(16);
        let bus2 = bus.clone();
        let mut rx = bus.subscribe();

        bus2.publish(sample_event());

        assert!(rx.try_recv().is_ok());
        assert!(format!("{bus:?}").contains("receiver_count"));
    }
}
