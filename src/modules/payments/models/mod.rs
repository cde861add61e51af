mod online_payment;
mod payment;

pub use online_payment::{
    InitiateOnlinePaymentRequest, OnlinePayment, OnlinePaymentStatus, OnlineVerification,
};
pub use payment::{
    Payment, PaymentCommand, PaymentMethod, PaymentReceipt, PaymentResult, RecordPaymentRequest,
};
