pub mod actor;
pub mod error_handler;

pub use actor::Actor;
pub use error_handler::{json_error_handler, path_error_handler, query_error_handler};
