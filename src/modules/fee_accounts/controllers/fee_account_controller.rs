// Endpoints (under /fees):
// - POST /assign/auto       bill a cohort; per-student failures are reported, not fatal
// - POST /assign/manual     bill one student from a structure or a custom amount
// - GET  /student/{id}      a student's accounts with the late-fee view
// - GET  /accounts/{id}     one account with the late-fee view

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::core::Result;
use crate::middleware::Actor;
use crate::modules::fee_accounts::models::{AutoAssignRequest, ManualAssignRequest};
use crate::modules::fee_accounts::services::FeeAccountService;

/// POST /fees/assign/auto
///
/// # Returns
/// - 200: Summary with `assigned` and `failures` lists
/// - 400: Neither or both of department_id / student_ids, missing field
/// - 404: Unknown semester or fee structure
pub async fn auto_assign(
    service: web::Data<Arc<FeeAccountService>>,
    actor: Actor,
    request: web::Json<AutoAssignRequest>,
) -> Result<HttpResponse> {
    let summary = service.auto_assign(&request, actor.as_str()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// POST /fees/assign/manual
///
/// # Returns
/// - 201: Created fee account
/// - 409: Student already billed for the semester
pub async fn manual_assign(
    service: web::Data<Arc<FeeAccountService>>,
    actor: Actor,
    request: web::Json<ManualAssignRequest>,
) -> Result<HttpResponse> {
    let account = service.manual_assign(&request, actor.as_str()).await?;
    Ok(HttpResponse::Created().json(account))
}

/// GET /fees/student/{student_id}
pub async fn student_fees(
    service: web::Data<Arc<FeeAccountService>>,
    student_id: web::Path<String>,
) -> Result<HttpResponse> {
    let fees = service.student_fees(&student_id).await?;
    Ok(HttpResponse::Ok().json(fees))
}

/// GET /fees/accounts/{fee_account_id}
pub async fn get_account(
    service: web::Data<Arc<FeeAccountService>>,
    fee_account_id: web::Path<String>,
) -> Result<HttpResponse> {
    let view = service.account_view(&fee_account_id).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/assign/auto", web::post().to(auto_assign))
        .route("/assign/manual", web::post().to(manual_assign))
        .route("/student/{student_id}", web::get().to(student_fees))
        .route("/accounts/{fee_account_id}", web::get().to(get_account));
}
