// Endpoints (under /fees):
// - POST /vouchers                       issue a voucher for an account
// - GET  /vouchers/{fee_account_id}      latest voucher slip with QR payload
// - POST /vouchers/{voucher_id}/cancel   cancel a live voucher

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::core::Result;
use crate::middleware::Actor;
use crate::modules::vouchers::models::IssueVoucherRequest;
use crate::modules::vouchers::services::VoucherService;

/// POST /fees/vouchers
///
/// # Returns
/// - 201: Issued voucher
/// - 400: Account already paid, or a voucher is already issued (`details.voucher_number`)
/// - 404: Unknown fee account
pub async fn issue_voucher(
    service: web::Data<Arc<VoucherService>>,
    actor: Actor,
    request: web::Json<IssueVoucherRequest>,
) -> Result<HttpResponse> {
    let voucher = service.issue(&request, actor.as_str()).await?;
    Ok(HttpResponse::Created().json(voucher))
}

/// GET /fees/vouchers/{fee_account_id}
pub async fn fetch_voucher(
    service: web::Data<Arc<VoucherService>>,
    fee_account_id: web::Path<String>,
) -> Result<HttpResponse> {
    let slip = service.fetch(&fee_account_id).await?;
    Ok(HttpResponse::Ok().json(slip))
}

/// POST /fees/vouchers/{voucher_id}/cancel
pub async fn cancel_voucher(
    service: web::Data<Arc<VoucherService>>,
    actor: Actor,
    voucher_id: web::Path<String>,
) -> Result<HttpResponse> {
    let voucher = service.cancel(&voucher_id, actor.as_str()).await?;
    Ok(HttpResponse::Ok().json(voucher))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/vouchers")
            .route("", web::post().to(issue_voucher))
            .route("/{fee_account_id}", web::get().to(fetch_voucher))
            .route("/{voucher_id}/cancel", web::post().to(cancel_voucher)),
    );
}
