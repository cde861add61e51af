// Online payment providers. The ledger talks to them only through the
// PaymentGateway trait; nothing here touches balances.

pub mod services;

pub use services::{
    build_gateway, GatewayCallback, GatewayOutcome, GatewayPayment, GatewayPaymentRequest,
    GatewayStatus, HttpGateway, PaymentGateway, SimulatedGateway,
};
