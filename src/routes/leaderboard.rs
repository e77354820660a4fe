use axum::{
    extract::{Path, Query, State},
    middleware, Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::config::Config;
use crate::error::{AppError, ErrorResponse};
use crate::middleware::auth::auth_middleware;
use crate::models::leaderboard::{LeaderboardResponse, UserPositionResponse};
use crate::services::{leaderboard_service::LeaderboardService, user_service::UserService};
use crate::utils::Claims;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 500;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GlobalLeaderboardQuery {
    /// Only count events held in this year.
    year: Option<i32>,
    /// 1 to 500, default 100.
    limit: Option<usize>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventLeaderboardQuery {
    limit: Option<usize>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PositionQuery {
    year: Option<i32>,
}

fn checked_limit(limit: Option<usize>) -> Result<usize, AppError> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(AppError::BadRequest(format!("limit must be between 1 and {MAX_LIMIT}")));
    }
    Ok(limit)
}

#[utoipa::path(
    get,
    path = "/leaderboard",
    params(GlobalLeaderboardQuery),
    responses(
        (status = 200, description = "Global leaderboard", body = LeaderboardResponse),
        (status = 400, description = "Invalid limit", body = ErrorResponse),
        (status = 422, description = "A pick references a fight that does not exist", body = ErrorResponse)
    )
)]
pub async fn get_global_leaderboard(
    State((leaderboard_service, _user_service)): State<(Arc<LeaderboardService>, Arc<UserService>)>,
    Query(query): Query<GlobalLeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let limit = checked_limit(query.limit)?;

    let entries = leaderboard_service.global_leaderboard(query.year).await?;
    let entries = leaderboard_service.decorate(entries, limit).await?;

    Ok(Json(LeaderboardResponse {
        scope: query.year.map_or_else(|| "all_time".to_string(), |y| y.to_string()),
        entries,
    }))
}

#[utoipa::path(
    get,
    path = "/leaderboard/event/{event_id}",
    params(
        ("event_id" = i64, Path, description = "Event ID"),
        EventLeaderboardQuery
    ),
    responses(
        (status = 200, description = "Leaderboard for one event", body = LeaderboardResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 422, description = "A pick references a fight that does not exist", body = ErrorResponse)
    )
)]
pub async fn get_event_leaderboard(
    State((leaderboard_service, _user_service)): State<(Arc<LeaderboardService>, Arc<UserService>)>,
    Path(event_id): Path<i64>,
    Query(query): Query<EventLeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    let limit = checked_limit(query.limit)?;

    let entries = leaderboard_service.event_leaderboard(event_id).await?;
    let entries = leaderboard_service.decorate(entries, limit).await?;

    Ok(Json(LeaderboardResponse {
        scope: format!("event:{event_id}"),
        entries,
    }))
}

#[utoipa::path(
    get,
    path = "/leaderboard/me",
    params(PositionQuery),
    responses(
        (status = 200, description = "Caller's rank; null when they have no picks", body = UserPositionResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_position(
    State((leaderboard_service, user_service)): State<(Arc<LeaderboardService>, Arc<UserService>)>,
    Extension(claims): Extension<Arc<Claims>>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<UserPositionResponse>, AppError> {
    let user = user_service.require_active(&claims).await?;

    let Some(entry) = leaderboard_service.user_position(&user.id, query.year).await? else {
        return Ok(Json(UserPositionResponse { rank: None, entry: None }));
    };

    let entry = leaderboard_service.decorate(vec![entry], 1).await?.pop();
    Ok(Json(UserPositionResponse {
        rank: entry.as_ref().map(|e| e.rank),
        entry,
    }))
}

pub fn leaderboard_routes(
    leaderboard_service: Arc<LeaderboardService>,
    user_service: Arc<UserService>,
    config: Arc<Config>,
) -> Router {
    let protected = Router::new()
        .route("/leaderboard/me", axum::routing::get(get_my_position))
        .route_layer(middleware::from_fn_with_state(config, auth_middleware));

    Router::new()
        .route("/leaderboard", axum::routing::get(get_global_leaderboard))
        .route("/leaderboard/event/{event_id}", axum::routing::get(get_event_leaderboard))
        .merge(protected)
        .with_state((leaderboard_service, user_service))
}
