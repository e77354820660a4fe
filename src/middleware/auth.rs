use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::debug;

use crate::config::Config;
use crate::error::AppError;
use crate::utils::validate_jwt;

/// Use with `middleware::from_fn_with_state(config, auth_middleware)`.
/// Validates `Authorization: Bearer <token>` and inserts `Arc<Claims>` into
/// the request extensions.
pub async fn auth_middleware(
    State(config): State<Arc<Config>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    match validate_jwt(token, &config.jwt_secret) {
        Some(claims) => {
            debug!(user_id = %claims.sub, "request authenticated");
            req.extensions_mut().insert(Arc::new(claims));
            Ok(next.run(req).await)
        }
        None => Err(AppError::Unauthorized("Invalid or expired token".to_string())),
    }
}
