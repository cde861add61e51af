pub mod dispatcher;
pub mod notifier;
pub mod publisher;

pub use dispatcher::EventDispatcher;
pub use notifier::{LogNotifier, Notifier};
pub use publisher::EventPublisher;
