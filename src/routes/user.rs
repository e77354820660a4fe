use axum::{extract::State, middleware, Extension, Json, Router};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, ErrorResponse};
use crate::middleware::auth::auth_middleware;
use crate::models::user::{UpdateProfileRequest, UserResponse};
use crate::services::user_service::UserService;
use crate::utils::Claims;

#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Caller's profile", body = UserResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(user_service): State<Arc<UserService>>,
    Extension(claims): Extension<Arc<Claims>>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service.require_active(&claims).await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    put,
    path = "/users/me",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Empty name or nothing to update", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_me(
    State(user_service): State<Arc<UserService>>,
    Extension(claims): Extension<Arc<Claims>>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError> {
    let user = user_service.require_active(&claims).await?;
    let user = user_service.update_profile(&user.id, req).await?;
    Ok(Json(user.into()))
}

pub fn user_routes(user_service: Arc<UserService>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/users/me", axum::routing::get(get_me).put(update_me))
        .route_layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state(user_service)
}
