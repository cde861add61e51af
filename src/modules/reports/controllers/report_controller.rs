use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::core::Result;
use crate::modules::reports::models::{CollectionQuery, StatisticsQuery, UnpaidQuery};
use crate::modules::reports::services::ReportService;

/// GET /fees/reports/unpaid
///
/// Accounts with a remaining balance. `overdue_only=true` keeps only those
/// whose effective status is overdue.
pub async fn unpaid_report(
    service: web::Data<Arc<ReportService>>,
    query: web::Query<UnpaidQuery>,
) -> Result<HttpResponse> {
    let report = service.unpaid(&query).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /fees/reports/collection
///
/// # Returns
/// - 200: Totals with per-method and per-day breakdowns
/// - 400: Missing or malformed dates, reversed range, range over 366 days
pub async fn collection_report(
    service: web::Data<Arc<ReportService>>,
    query: web::Query<CollectionQuery>,
) -> Result<HttpResponse> {
    let report = service.collection(&query).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// GET /fees/reports/statistics
pub async fn fee_statistics(
    service: web::Data<Arc<ReportService>>,
    query: web::Query<StatisticsQuery>,
) -> Result<HttpResponse> {
    let stats = service.statistics(&query).await?;
    Ok(HttpResponse::Ok().json(stats))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/unpaid", web::get().to(unpaid_report))
            .route("/collection", web::get().to(collection_report))
            .route("/statistics", web::get().to(fee_statistics)),
    );
}
