// Endpoints (under /fees):
// - POST /payments                      cashier path
// - POST /payments/online               start an online payment
// - GET  /payments/verify/{txn_id}      query the gateway and reconcile
// - POST /payments/online/callback      signed provider callback
// - GET  /accounts/{id}/payments        payment history

use actix_web::{web, HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::core::Result;
use crate::middleware::Actor;
use crate::modules::payments::models::{InitiateOnlinePaymentRequest, RecordPaymentRequest};
use crate::modules::payments::services::{OnlinePaymentService, PaymentLedger};

/// Header carrying the provider's HMAC-SHA256 signature of the callback body
pub const SIGNATURE_HEADER: &str = "X-Signature";

/// POST /fees/payments
///
/// # Returns
/// - 201: Payment, receipt number and remaining due amount
/// - 400: Invalid amount, or amount exceeds the due balance (`details` holds the balance)
/// - 404: Unknown fee account
/// - 409: Transaction id already applied
pub async fn record_payment(
    ledger: web::Data<Arc<PaymentLedger>>,
    actor: Actor,
    request: web::Json<RecordPaymentRequest>,
) -> Result<HttpResponse> {
    let command = request.into_inner().into_command(actor.as_str())?;
    let result = ledger.apply_payment(command).await?;
    Ok(HttpResponse::Created().json(result))
}

/// POST /fees/payments/online
pub async fn initiate_online_payment(
    service: web::Data<Arc<OnlinePaymentService>>,
    actor: Actor,
    request: web::Json<InitiateOnlinePaymentRequest>,
) -> Result<HttpResponse> {
    let online = service.initiate(&request, actor.as_str()).await?;
    Ok(HttpResponse::Created().json(online))
}

/// GET /fees/payments/verify/{transaction_id}
pub async fn verify_online_payment(
    service: web::Data<Arc<OnlinePaymentService>>,
    actor: Actor,
    transaction_id: web::Path<String>,
) -> Result<HttpResponse> {
    let verification = service.verify(&transaction_id, actor.as_str()).await?;
    Ok(HttpResponse::Ok().json(verification))
}

/// POST /fees/payments/online/callback
pub async fn online_payment_callback(
    service: web::Data<Arc<OnlinePaymentService>>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let signature = req
        .headers()
        .get(SIGNATURE_HEADER)
        .and_then(|h| h.to_str().ok());
    let verification = service.handle_callback(&body, signature).await?;
    Ok(HttpResponse::Ok().json(verification))
}

/// GET /fees/accounts/{fee_account_id}/payments
pub async fn payment_history(
    ledger: web::Data<Arc<PaymentLedger>>,
    fee_account_id: web::Path<String>,
) -> Result<HttpResponse> {
    let payments = ledger.history(&fee_account_id).await?;
    Ok(HttpResponse::Ok().json(payments))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payments")
            .route("", web::post().to(record_payment))
            .route("/online", web::post().to(initiate_online_payment))
            .route("/online/callback", web::post().to(online_payment_callback))
            .route("/verify/{transaction_id}", web::get().to(verify_online_payment)),
    )
    .route(
        "/accounts/{fee_account_id}/payments",
        web::get().to(payment_history),
    );
}
