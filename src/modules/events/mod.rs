// Post-commit ledger events. Services publish after their transaction
// commits; a dispatcher task records them in the activity log and hands them
// to the notifier. Nothing here can fail the request that produced an event.

pub mod models;
pub mod repositories;
pub mod services;

pub use models::LedgerEvent;
pub use repositories::ActivityLogRepository;
pub use services::{EventDispatcher, EventPublisher, LogNotifier, Notifier};
