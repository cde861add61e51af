pub mod gateway_trait;
pub mod http_gateway;
pub mod signature;
pub mod simulated;

pub use gateway_trait::{
    GatewayCallback, GatewayOutcome, GatewayPayment, GatewayPaymentRequest, GatewayStatus,
    PaymentGateway,
};
pub use http_gateway::HttpGateway;
pub use simulated::SimulatedGateway;

use std::sync::Arc;

use crate::config::{GatewayConfig, GatewayKind};
use crate::core::Result;

/// Provider selected by configuration
pub fn build_gateway(config: &GatewayConfig) -> Result<Arc<dyn PaymentGateway>> {
    let gateway: Arc<dyn PaymentGateway> = match config.kind {
        GatewayKind::Simulated => Arc::new(SimulatedGateway::new(
            config.success_rate,
            config.webhook_secret.clone(),
        )),
        GatewayKind::Http => Arc::new(HttpGateway::new(
            config.base_url.clone(),
            config.api_key.clone(),
            config.webhook_secret.clone(),
        )?),
    };

    tracing::info!(gateway = gateway.name(), "Payment gateway configured");
    Ok(gateway)
}
