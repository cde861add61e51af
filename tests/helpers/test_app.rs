use feeledger::config::{AppConfig, LogFormat};
use feeledger::core::InstitutionClock;
use feeledger::modules::events::EventPublisher;
use feeledger::modules::gateways::{PaymentGateway, SimulatedGateway};
use feeledger::AppServices;
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use std::sync::Arc;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";
pub const ADMIN: &str = "admin-1";
pub const CASHIER: &str = "cashier-1";

pub fn test_app_config() -> AppConfig {
    AppConfig {
        env: "test".to_string(),
        log_level: "debug".to_string(),
        log_format: LogFormat::Pretty,
        institution_code: "UNI".to_string(),
        default_bank_name: "National Bank".to_string(),
        voucher_valid_days: 15,
        utc_offset_minutes: 0,
    }
}

/// Simulated provider that confirms every transaction
pub fn always_confirming_gateway() -> Arc<SimulatedGateway> {
    Arc::new(SimulatedGateway::new(
        Decimal::ONE,
        WEBHOOK_SECRET.to_string(),
    ))
}

pub fn build_services(pool: MySqlPool, gateway: Arc<dyn PaymentGateway>) -> AppServices {
    AppServices::with_clock(
        pool,
        &test_app_config(),
        EventPublisher::disabled(),
        gateway,
        InstitutionClock::utc(),
    )
}
