use crate::core::{AppError, InstitutionClock, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::env;
use std::str::FromStr;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Prefix of every voucher number
    pub institution_code: String,
    pub default_bank_name: String,
    pub voucher_valid_days: u32,
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayKind {
    Simulated,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    pub kind: GatewayKind,
    pub base_url: String,
    pub api_key: String,
    pub webhook_secret: String,
    /// Probability that the simulated provider confirms a payment
    pub success_rate: Decimal,
}

impl AppConfig {
    pub fn is_production(&self) -> bool {
        self.env.eq_ignore_ascii_case("production")
    }

    pub fn clock(&self) -> Result<InstitutionClock> {
        InstitutionClock::from_offset_minutes(self.utc_offset_minutes).ok_or_else(|| {
            AppError::Configuration(format!(
                "Invalid INSTITUTION_UTC_OFFSET_MINUTES: {}",
                self.utc_offset_minutes
            ))
        })
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let log_format = match env::var("LOG_FORMAT")
            .unwrap_or_else(|_| "pretty".to_string())
            .to_lowercase()
            .as_str()
        {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(AppError::Configuration(format!(
                    "Invalid LOG_FORMAT: {}",
                    other
                )))
            }
        };

        let gateway_kind = match env::var("PAYMENT_GATEWAY")
            .unwrap_or_else(|_| "simulated".to_string())
            .to_lowercase()
            .as_str()
        {
            "simulated" => GatewayKind::Simulated,
            "http" => GatewayKind::Http,
            other => {
                return Err(AppError::Configuration(format!(
                    "Invalid PAYMENT_GATEWAY: {}",
                    other
                )))
            }
        };

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                log_format,
                institution_code: env::var("INSTITUTION_CODE").map_err(|_| {
                    AppError::Configuration("INSTITUTION_CODE not set".to_string())
                })?,
                default_bank_name: env::var("DEFAULT_BANK_NAME")
                    .unwrap_or_else(|_| "National Bank".to_string()),
                voucher_valid_days: parse_var("VOUCHER_VALID_DAYS", "15")?,
                utc_offset_minutes: parse_var("INSTITUTION_UTC_OFFSET_MINUTES", "0")?,
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            gateway: GatewayConfig {
                kind: gateway_kind,
                base_url: env::var("PAYMENT_GATEWAY_BASE_URL").unwrap_or_default(),
                api_key: env::var("PAYMENT_GATEWAY_API_KEY").unwrap_or_default(),
                webhook_secret: env::var("PAYMENT_GATEWAY_WEBHOOK_SECRET")
                    .unwrap_or_else(|_| "simulated-webhook-secret".to_string()),
                success_rate: parse_var("PAYMENT_GATEWAY_SUCCESS_RATE", "0.9")?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let code = &self.app.institution_code;
        if code.len() < 2
            || code.len() > 10
            || !code
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        {
            return Err(AppError::Configuration(
                "INSTITUTION_CODE must be 2-10 uppercase letters or digits".to_string(),
            ));
        }

        if self.app.voucher_valid_days == 0 {
            return Err(AppError::Configuration(
                "Voucher validity must be greater than 0 days".to_string(),
            ));
        }

        self.app.clock()?;

        if self.gateway.success_rate < Decimal::ZERO || self.gateway.success_rate > Decimal::ONE {
            return Err(AppError::Configuration(
                "PAYMENT_GATEWAY_SUCCESS_RATE must be between 0 and 1".to_string(),
            ));
        }

        if self.gateway.kind == GatewayKind::Http {
            if self.gateway.base_url.trim().is_empty() {
                return Err(AppError::Configuration(
                    "PAYMENT_GATEWAY_BASE_URL not set".to_string(),
                ));
            }
            if self.gateway.api_key.trim().is_empty() {
                return Err(AppError::Configuration(
                    "PAYMENT_GATEWAY_API_KEY not set".to_string(),
                ));
            }
            if env::var("PAYMENT_GATEWAY_WEBHOOK_SECRET").is_err() {
                return Err(AppError::Configuration(
                    "PAYMENT_GATEWAY_WEBHOOK_SECRET not set".to_string(),
                ));
            }
        }

        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid {}", name)))
}
