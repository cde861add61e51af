pub mod online_payment_repository;
pub mod payment_repository;

pub use online_payment_repository::OnlinePaymentRepository;
pub use payment_repository::{PaymentInsert, PaymentRepository};
