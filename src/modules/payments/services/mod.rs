pub mod online_payment_service;
pub mod payment_ledger;

pub use online_payment_service::OnlinePaymentService;
pub use payment_ledger::PaymentLedger;
