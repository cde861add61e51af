use async_trait::async_trait;

use crate::core::Result;
use crate::modules::events::models::LedgerEvent;

/// Outbound notification channel (email, SMS, ...) for ledger events
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &LedgerEvent) -> Result<()>;
}

/// Notifier that only writes a structured log line
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, event: &LedgerEvent) -> Result<()> {
        let (entity_type, entity_id) = event.entity();
        tracing::info!(
            event_type = event.event_type(),
            entity_type,
            entity_id,
            actor = event.actor(),
            "Ledger notification"
        );
        Ok(())
    }
}
