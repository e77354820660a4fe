use axum::{
    extract::{Query, State},
    http::StatusCode,
    middleware, Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::config::Config;
use crate::error::{AppError, ErrorResponse};
use crate::middleware::auth::auth_middleware;
use crate::models::pick::{PickCreate, PickResponse};
use crate::services::{pick_service::PickService, user_service::UserService};
use crate::utils::Claims;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventPicksQuery {
    event_id: i64,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AllPicksQuery {
    /// 1 to 500, default 100.
    limit: Option<i64>,
}

#[utoipa::path(
    post,
    path = "/picks",
    request_body = PickCreate,
    responses(
        (status = 201, description = "Pick saved", body = PickResponse),
        (status = 400, description = "Invalid pick", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse),
        (status = 403, description = "Picks are locked", body = ErrorResponse),
        (status = 404, description = "Event or fight not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_pick(
    State((pick_service, user_service)): State<(Arc<PickService>, Arc<UserService>)>,
    Extension(claims): Extension<Arc<Claims>>,
    Json(req): Json<PickCreate>,
) -> Result<(StatusCode, Json<PickResponse>), AppError> {
    let user = user_service.require_active(&claims).await?;
    let pick = pick_service.create_or_update_pick(&user.id, req).await?;

    let mut described = pick_service.describe(vec![pick]).await?;
    let response = described
        .pop()
        .ok_or_else(|| AppError::NotFound("Pick not found".to_string()))?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/picks/me",
    params(EventPicksQuery),
    responses(
        (status = 200, description = "Caller's picks for the event", body = [PickResponse]),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_picks(
    State((pick_service, user_service)): State<(Arc<PickService>, Arc<UserService>)>,
    Extension(claims): Extension<Arc<Claims>>,
    Query(query): Query<EventPicksQuery>,
) -> Result<Json<Vec<PickResponse>>, AppError> {
    let user = user_service.require_active(&claims).await?;
    let picks = pick_service.get_user_picks_for_event(&user.id, query.event_id).await?;
    Ok(Json(pick_service.describe(picks).await?))
}

#[utoipa::path(
    get,
    path = "/picks/me/all",
    params(AllPicksQuery),
    responses(
        (status = 200, description = "Caller's picks across all events, newest first", body = [PickResponse]),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_all_my_picks(
    State((pick_service, user_service)): State<(Arc<PickService>, Arc<UserService>)>,
    Extension(claims): Extension<Arc<Claims>>,
    Query(query): Query<AllPicksQuery>,
) -> Result<Json<Vec<PickResponse>>, AppError> {
    let limit = query.limit.unwrap_or(100);
    if !(1..=500).contains(&limit) {
        return Err(AppError::BadRequest("limit must be between 1 and 500".to_string()));
    }

    let user = user_service.require_active(&claims).await?;
    let picks = pick_service.get_all_user_picks(&user.id, limit).await?;
    Ok(Json(pick_service.describe(picks).await?))
}

pub fn pick_routes(
    pick_service: Arc<PickService>,
    user_service: Arc<UserService>,
    config: Arc<Config>,
) -> Router {
    Router::new()
        .route("/picks", axum::routing::post(create_pick))
        .route("/picks/me", axum::routing::get(get_my_picks))
        .route("/picks/me/all", axum::routing::get(get_all_my_picks))
        .route_layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state((pick_service, user_service))
}
