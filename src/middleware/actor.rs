use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};

use crate::core::AppError;

/// Header carrying the identity of the acting user.
///
/// Authentication itself happens upstream; by the time a request reaches the
/// ledger this header names an already-authenticated user.
pub const ACTOR_HEADER: &str = "X-User-Id";

const MAX_ACTOR_LEN: usize = 64;

/// Identity recorded as `recorded_by` / `assigned_by` / `issued_by`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromRequest for Actor {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_actor(req))
    }
}

fn extract_actor(req: &HttpRequest) -> Result<Actor, AppError> {
    let value = req
        .headers()
        .get(ACTOR_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::unauthorized(format!("Missing {} header", ACTOR_HEADER)))?;

    if value.len() > MAX_ACTOR_LEN {
        return Err(AppError::unauthorized(format!(
            "{} header exceeds {} characters",
            ACTOR_HEADER, MAX_ACTOR_LEN
        )));
    }

    Ok(Actor(value.to_string()))
}
