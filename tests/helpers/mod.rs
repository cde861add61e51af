// Shared setup for contract and integration tests.
//
// Integration tests need a MySQL database (TEST_DATABASE_URL, falling back to
// DATABASE_URL) and are #[ignore]d by default. Contract tests only exercise
// paths that fail before touching the database and run against a lazy pool.
#![allow(dead_code)]

pub mod test_app;
pub mod test_data;

pub use test_app::*;
pub use test_data::*;
pub use test_database::*;
