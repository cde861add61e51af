// Extractor failures (bad JSON, bad query string, bad path segment) are
// rendered through AppError so every 4xx carries the same body shape.

use actix_web::{
    error::{JsonPayloadError, PathError, QueryPayloadError},
    web, Error, HttpRequest,
};

use crate::core::AppError;

/// Maximum accepted JSON body size
const JSON_LIMIT_BYTES: usize = 64 * 1024;

pub fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    tracing::debug!(error = %err, "Rejected JSON body");
    AppError::validation(format!("Invalid JSON body: {}", err)).into()
}

pub fn query_error_handler(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    AppError::validation(format!("Invalid query string: {}", err)).into()
}

pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> Error {
    AppError::validation(format!("Invalid path parameter: {}", err)).into()
}

/// Register the extractor configs on an app or scope
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT_BYTES)
            .error_handler(json_error_handler),
    )
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler));
}
