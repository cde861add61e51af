use tokio::sync::mpsc;

use crate::modules::events::models::LedgerEvent;

/// Sending half of the ledger event channel
#[derive(Clone)]
pub struct EventPublisher {
    sender: Option<mpsc::UnboundedSender<LedgerEvent>>,
}

impl EventPublisher {
    /// A publisher and the receiver an [`EventDispatcher`](super::EventDispatcher) drains
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LedgerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    /// A publisher that drops every event
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    /// Hand an event to the dispatcher. Never blocks and never fails the caller.
    pub fn publish(&self, event: LedgerEvent) {
        let Some(sender) = &self.sender else {
            return;
        };

        if let Err(e) = sender.send(event) {
            tracing::warn!(
                event_type = e.0.event_type(),
                "Event dispatcher is gone; dropping ledger event"
            );
        }
    }
}
