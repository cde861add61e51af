// Endpoints (under /fees):
// - POST /structures       create a structure
// - GET  /structures       list, filtered by department / session / semester number
// - GET  /structures/{id}  fetch one
// - PUT  /structures/{id}  partial update; total is recomputed

use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::core::Result;
use crate::middleware::Actor;
use crate::modules::fee_structures::models::{
    CreateFeeStructureRequest, FeeStructureFilter, UpdateFeeStructureRequest,
};
use crate::modules::fee_structures::services::FeeStructureService;

/// POST /fees/structures
///
/// # Returns
/// - 201: Created structure
/// - 400: Missing scope field or invalid amount
/// - 404: Unknown department or session
/// - 409: Structure already exists for the scope
pub async fn create_structure(
    service: web::Data<Arc<FeeStructureService>>,
    actor: Actor,
    request: web::Json<CreateFeeStructureRequest>,
) -> Result<HttpResponse> {
    let structure = service.create(&request, actor.as_str()).await?;
    Ok(HttpResponse::Created().json(structure))
}

/// GET /fees/structures
pub async fn list_structures(
    service: web::Data<Arc<FeeStructureService>>,
    filter: web::Query<FeeStructureFilter>,
) -> Result<HttpResponse> {
    let structures = service.list(&filter).await?;
    Ok(HttpResponse::Ok().json(structures))
}

/// GET /fees/structures/{id}
pub async fn get_structure(
    service: web::Data<Arc<FeeStructureService>>,
    id: web::Path<String>,
) -> Result<HttpResponse> {
    let structure = service.get(&id).await?;
    Ok(HttpResponse::Ok().json(structure))
}

/// PUT /fees/structures/{id}
pub async fn update_structure(
    service: web::Data<Arc<FeeStructureService>>,
    _actor: Actor,
    id: web::Path<String>,
    request: web::Json<UpdateFeeStructureRequest>,
) -> Result<HttpResponse> {
    let structure = service.update(&id, &request).await?;
    Ok(HttpResponse::Ok().json(structure))
}

/// Register routes relative to the `/fees` scope
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/structures")
            .route("", web::post().to(create_structure))
            .route("", web::get().to(list_structures))
            .route("/{id}", web::get().to(get_structure))
            .route("/{id}", web::put().to(update_structure)),
    );
}
