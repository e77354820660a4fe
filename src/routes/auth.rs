use axum::{extract::State, middleware, Extension, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::{AppError, ErrorResponse};
use crate::middleware::auth::auth_middleware;
use crate::models::user::UserResponse;
use crate::services::user_service::UserService;
use crate::utils::{generate_jwt, Claims};

#[derive(Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    /// Always `bearer`.
    pub token_type: String,
    pub user: UserResponse,
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Fresh token for the caller", body = AuthResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Account disabled", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn refresh_token(
    State((user_service, config)): State<(Arc<UserService>, Arc<Config>)>,
    Extension(claims): Extension<Arc<Claims>>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = user_service.require_active(&claims).await?;
    let access_token = generate_jwt(&user.id, &user.email, &config.jwt_secret, config.jwt_expire_minutes)?;
    info!(user_id = %user.id, "token refreshed");

    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: user.into(),
    }))
}

pub fn auth_routes(user_service: Arc<UserService>, config: Arc<Config>) -> Router {
    Router::new()
        .route("/auth/refresh", axum::routing::post(refresh_token))
        .route_layer(middleware::from_fn_with_state(config.clone(), auth_middleware))
        .with_state((user_service, config))
}
