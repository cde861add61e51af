//! Fee ledger service
//!
//! Bills students per semester from a fee structure catalog, issues bank
//! vouchers, applies cashier and online payments under row locks and reports
//! on collection.

pub mod config;
pub mod core;
pub mod middleware;
pub mod modules;
pub mod state;

pub use state::AppServices;
