use async_trait::async_trait;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::gateway_trait::{
    GatewayOutcome, GatewayPayment, GatewayPaymentRequest, GatewayStatus, PaymentGateway,
};
use super::signature;
use crate::core::{AppError, Result};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Client for a REST payment provider.
///
/// `POST {base_url}/payments` creates a payment, `GET {base_url}/payments/{id}`
/// reports its status. Requests carry the api key as a bearer token and
/// transient failures are retried with exponential backoff.
pub struct HttpGateway {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: String,
    webhook_secret: String,
}

#[derive(Serialize)]
struct CreatePaymentBody<'a> {
    reference: &'a str,
    amount: String,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    customer_email: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreatePaymentResponse {
    id: String,
    #[serde(default)]
    payment_url: Option<String>,
    status: String,
}

#[derive(Deserialize)]
struct PaymentStatusResponse {
    id: String,
    status: String,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    failure_reason: Option<String>,
}

impl HttpGateway {
    pub fn new(base_url: String, api_key: String, webhook_secret: String) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(AppError::HttpClient)?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        let client = ClientBuilder::new(inner)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            webhook_secret,
        })
    }

    async fn read_error(response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AppError::gateway(format!("Provider returned {}: {}", status, body))
    }
}

#[async_trait]
impl PaymentGateway for HttpGateway {
    fn name(&self) -> &str {
        "http"
    }

    async fn initiate(&self, request: &GatewayPaymentRequest) -> Result<GatewayPayment> {
        let url = format!("{}/payments", self.base_url);
        let body = CreatePaymentBody {
            reference: &request.reference,
            amount: request.amount.to_string(),
            description: &request.description,
            customer_email: request.customer_email.as_deref(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("Payment provider unreachable: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let created: CreatePaymentResponse = response
            .json()
            .await
            .map_err(|e| AppError::gateway(format!("Failed to parse provider response: {}", e)))?;

        Ok(GatewayPayment {
            transaction_id: created.id,
            payment_url: created.payment_url,
            status: GatewayStatus::from_provider(&created.status),
        })
    }

    async fn status(&self, transaction_id: &str) -> Result<GatewayOutcome> {
        let url = format!("{}/payments/{}", self.base_url, transaction_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::gateway(format!("Payment provider unreachable: {}", e)))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::not_found(format!(
                "Transaction '{}' is unknown to the payment provider",
                transaction_id
            )));
        }
        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let payment: PaymentStatusResponse = response
            .json()
            .await
            .map_err(|e| AppError::gateway(format!("Failed to parse provider response: {}", e)))?;

        Ok(GatewayOutcome {
            transaction_id: payment.id,
            status: GatewayStatus::from_provider(&payment.status),
            amount: payment.amount,
            failure_reason: payment.failure_reason,
        })
    }

    fn verify_signature(&self, payload: &[u8], signature: &str) -> bool {
        signature::verify(&self.webhook_secret, payload, signature)
    }
}
