// Payment ledger: the only code path that moves money into a fee account.
// Online payments are advisory until reconciled through the same path.

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::configure;
pub use models::{Payment, PaymentMethod, PaymentReceipt, PaymentResult};
pub use repositories::{OnlinePaymentRepository, PaymentRepository};
pub use services::{OnlinePaymentService, PaymentLedger};
