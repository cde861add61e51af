use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::modules::events::models::LedgerEvent;
use crate::modules::events::repositories::ActivityLogRepository;
use crate::modules::events::services::Notifier;

/// Consumes ledger events: activity log first, then the notifier.
///
/// Every failure is logged and dropped.
pub struct EventDispatcher {
    activity_log: Option<ActivityLogRepository>,
    notifier: Arc<dyn Notifier>,
}

impl EventDispatcher {
    pub fn new(activity_log: ActivityLogRepository, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            activity_log: Some(activity_log),
            notifier,
        }
    }

    /// Dispatcher that only notifies
    pub fn without_activity_log(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            activity_log: None,
            notifier,
        }
    }

    /// Drain `receiver` on a background task until every publisher is dropped
    pub fn spawn(self, mut receiver: mpsc::UnboundedReceiver<LedgerEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = receiver.recv().await {
                self.dispatch(&event).await;
            }
            tracing::info!("Ledger event channel closed");
        })
    }

    pub async fn dispatch(&self, event: &LedgerEvent) {
        if let Some(activity_log) = &self.activity_log {
            if let Err(e) = activity_log.record(event).await {
                tracing::warn!(
                    event_type = event.event_type(),
                    error = %e,
                    "Activity log write failed"
                );
            }
        }

        if let Err(e) = self.notifier.notify(event).await {
            tracing::warn!(
                event_type = event.event_type(),
                error = %e,
                "Notification failed"
            );
        }
    }
}
