use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::events::models::LedgerEvent;

/// Append-only audit trail of ledger events
#[derive(Clone)]
pub struct ActivityLogRepository {
    pool: MySqlPool,
}

impl ActivityLogRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, event: &LedgerEvent) -> Result<()> {
        let (entity_type, entity_id) = event.entity();
        let payload = serde_json::to_string(event)?;

        sqlx::query(
            r#"
            INSERT INTO activity_logs (event_type, entity_type, entity_id, actor, payload)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(event.event_type())
        .bind(entity_type)
        .bind(entity_id)
        .bind(event.actor())
        .bind(payload)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to write activity log: {}", e)))?;

        Ok(())
    }
}
