use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware, Extension, Json, Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;

use crate::config::Config;
use crate::error::{AppError, ErrorResponse};
use crate::middleware::auth::auth_middleware;
use crate::models::{
    event::{CreateEventRequest, Event, EventResponse},
    fight::{Corner, CreateFightRequest, FightResponse, FightResult},
};
use crate::services::{event_service::EventService, pick_service::PickService, user_service::UserService};
use crate::utils::Claims;

type AdminState = (Arc<EventService>, Arc<PickService>, Arc<UserService>);

#[derive(Deserialize, ToSchema)]
pub struct FightResultRequest {
    /// `red`, `blue`, `draw` or `nc`.
    pub winner: String,
    pub method: String,
    pub round: Option<i32>,
    pub time: Option<String>,
}

impl FightResultRequest {
    fn into_result(self) -> Result<FightResult, AppError> {
        let winner = match self.winner.trim().to_ascii_lowercase().as_str() {
            "red" => Some(Corner::Red),
            "blue" => Some(Corner::Blue),
            "draw" | "nc" => None,
            other => {
                return Err(AppError::BadRequest(format!(
                    "winner must be red, blue, draw or nc, got '{other}'"
                )))
            }
        };
        if let Some(round) = self.round {
            if !(1..=5).contains(&round) {
                return Err(AppError::BadRequest("round must be between 1 and 5".to_string()));
            }
        }
        if self.method.trim().is_empty() {
            return Err(AppError::BadRequest("method is required".to_string()));
        }

        Ok(FightResult {
            winner,
            method: self.method.trim().to_string(),
            round: self.round,
            time: self.time,
        })
    }
}

#[derive(Deserialize, ToSchema)]
pub struct EventTimingRequest {
    #[schema(value_type = Option<String>, format = Date)]
    pub event_date: Option<NaiveDate>,
    pub picks_lock_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize, ToSchema)]
pub struct FightTimingRequest {
    pub start_time: Option<DateTime<Utc>>,
    pub picks_lock_time: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct TimingResponse {
    pub updated: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LockResponse {
    pub picks_locked: bool,
    /// Number of pick documents whose lock flag changed.
    pub picks_updated: u64,
}

#[utoipa::path(
    post,
    path = "/admin/events",
    request_body = CreateEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 409, description = "Event id already used", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_event(
    State((event_service, _pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    user_service.require_admin(&claims).await?;
    let event = event_service.create_event(Event::from(req)).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

#[utoipa::path(
    post,
    path = "/admin/events/{event_id}/fights",
    params(("event_id" = i64, Path, description = "Event ID")),
    request_body = CreateFightRequest,
    responses(
        (status = 201, description = "Fight added to the card", body = FightResponse),
        (status = 400, description = "Invalid fight", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Fight id already used", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_fight(
    State((event_service, _pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(event_id): Path<i64>,
    Json(req): Json<CreateFightRequest>,
) -> Result<(StatusCode, Json<FightResponse>), AppError> {
    user_service.require_admin(&claims).await?;
    let fight = event_service.create_fight(req.into_fight(event_id)).await?;
    Ok((StatusCode::CREATED, Json(fight.into())))
}

#[utoipa::path(
    put,
    path = "/admin/events/{event_id}/timing",
    params(("event_id" = i64, Path, description = "Event ID")),
    request_body = EventTimingRequest,
    responses(
        (status = 200, description = "Fields updated", body = TimingResponse),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_event_timing(
    State((event_service, _pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(event_id): Path<i64>,
    Json(req): Json<EventTimingRequest>,
) -> Result<Json<TimingResponse>, AppError> {
    user_service.require_admin(&claims).await?;
    let updated = event_service
        .update_event_timing(event_id, req.event_date, req.picks_lock_date)
        .await?;
    Ok(Json(TimingResponse { updated }))
}

#[utoipa::path(
    post,
    path = "/admin/events/{event_id}/lock-picks",
    params(("event_id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Picks locked", body = LockResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn lock_event_picks(
    State((event_service, pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(event_id): Path<i64>,
) -> Result<Json<LockResponse>, AppError> {
    let admin = user_service.require_admin(&claims).await?;
    set_event_lock(&event_service, &pick_service, event_id, true, &admin.id).await
}

#[utoipa::path(
    post,
    path = "/admin/events/{event_id}/unlock-picks",
    params(("event_id" = i64, Path, description = "Event ID")),
    responses(
        (status = 200, description = "Picks unlocked", body = LockResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unlock_event_picks(
    State((event_service, pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(event_id): Path<i64>,
) -> Result<Json<LockResponse>, AppError> {
    let admin = user_service.require_admin(&claims).await?;
    set_event_lock(&event_service, &pick_service, event_id, false, &admin.id).await
}

async fn set_event_lock(
    event_service: &EventService,
    pick_service: &PickService,
    event_id: i64,
    locked: bool,
    admin_id: &str,
) -> Result<Json<LockResponse>, AppError> {
    event_service.set_event_lock(event_id, locked).await?;
    let picks_updated = pick_service.set_event_picks_locked(event_id, locked).await?;
    info!(event_id, locked, picks_updated, admin = %admin_id, "event pick lock changed");
    Ok(Json(LockResponse { picks_locked: locked, picks_updated }))
}

#[utoipa::path(
    put,
    path = "/admin/fights/{fight_id}/timing",
    params(("fight_id" = i64, Path, description = "Fight ID")),
    request_body = FightTimingRequest,
    responses(
        (status = 200, description = "Fields updated", body = TimingResponse),
        (status = 400, description = "Nothing to update", body = ErrorResponse),
        (status = 404, description = "Fight not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_fight_timing(
    State((event_service, _pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(fight_id): Path<i64>,
    Json(req): Json<FightTimingRequest>,
) -> Result<Json<TimingResponse>, AppError> {
    user_service.require_admin(&claims).await?;
    let updated = event_service
        .update_fight_timing(fight_id, req.start_time, req.picks_lock_time)
        .await?;
    Ok(Json(TimingResponse { updated }))
}

#[utoipa::path(
    put,
    path = "/admin/fights/{fight_id}/result",
    params(("fight_id" = i64, Path, description = "Fight ID")),
    request_body = FightResultRequest,
    responses(
        (status = 200, description = "Result recorded", body = FightResponse),
        (status = 400, description = "Invalid result", body = ErrorResponse),
        (status = 404, description = "Fight not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_fight_result(
    State((event_service, _pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(fight_id): Path<i64>,
    Json(req): Json<FightResultRequest>,
) -> Result<Json<FightResponse>, AppError> {
    user_service.require_admin(&claims).await?;
    let result = req.into_result()?;
    let fight = event_service.set_fight_result(fight_id, result).await?;
    Ok(Json(fight.into()))
}

#[utoipa::path(
    delete,
    path = "/admin/fights/{fight_id}/result",
    params(("fight_id" = i64, Path, description = "Fight ID")),
    responses(
        (status = 200, description = "Result cleared", body = FightResponse),
        (status = 400, description = "Fight has no result", body = ErrorResponse),
        (status = 404, description = "Fight not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_fight_result(
    State((event_service, _pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(fight_id): Path<i64>,
) -> Result<Json<FightResponse>, AppError> {
    user_service.require_admin(&claims).await?;
    let fight = event_service.clear_fight_result(fight_id).await?;
    Ok(Json(fight.into()))
}

#[utoipa::path(
    post,
    path = "/admin/fights/{fight_id}/lock-picks",
    params(("fight_id" = i64, Path, description = "Fight ID")),
    responses(
        (status = 200, description = "Picks locked", body = LockResponse),
        (status = 404, description = "Fight not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn lock_fight_picks(
    State((event_service, pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(fight_id): Path<i64>,
) -> Result<Json<LockResponse>, AppError> {
    let admin = user_service.require_admin(&claims).await?;
    set_fight_lock(&event_service, &pick_service, fight_id, true, &admin.id).await
}

#[utoipa::path(
    post,
    path = "/admin/fights/{fight_id}/unlock-picks",
    params(("fight_id" = i64, Path, description = "Fight ID")),
    responses(
        (status = 200, description = "Picks unlocked", body = LockResponse),
        (status = 404, description = "Fight not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn unlock_fight_picks(
    State((event_service, pick_service, user_service)): State<AdminState>,
    Extension(claims): Extension<Arc<Claims>>,
    Path(fight_id): Path<i64>,
) -> Result<Json<LockResponse>, AppError> {
    let admin = user_service.require_admin(&claims).await?;
    set_fight_lock(&event_service, &pick_service, fight_id, false, &admin.id).await
}

async fn set_fight_lock(
    event_service: &EventService,
    pick_service: &PickService,
    fight_id: i64,
    locked: bool,
    admin_id: &str,
) -> Result<Json<LockResponse>, AppError> {
    event_service.set_fight_lock(fight_id, locked).await?;
    let picks_updated = pick_service.set_fight_picks_locked(fight_id, locked).await?;
    info!(fight_id, locked, picks_updated, admin = %admin_id, "fight pick lock changed");
    Ok(Json(LockResponse { picks_locked: locked, picks_updated }))
}

pub fn admin_routes(
    event_service: Arc<EventService>,
    pick_service: Arc<PickService>,
    user_service: Arc<UserService>,
    config: Arc<Config>,
) -> Router {
    use axum::routing::{post, put};

    Router::new()
        .route("/admin/events", post(create_event))
        .route("/admin/events/{event_id}/fights", post(create_fight))
        .route("/admin/events/{event_id}/timing", put(update_event_timing))
        .route("/admin/events/{event_id}/lock-picks", post(lock_event_picks))
        .route("/admin/events/{event_id}/unlock-picks", post(unlock_event_picks))
        .route("/admin/fights/{fight_id}/timing", put(update_fight_timing))
        .route(
            "/admin/fights/{fight_id}/result",
            put(set_fight_result).delete(clear_fight_result),
        )
        .route("/admin/fights/{fight_id}/lock-picks", post(lock_fight_picks))
        .route("/admin/fights/{fight_id}/unlock-picks", post(unlock_fight_picks))
        .route_layer(middleware::from_fn_with_state(config, auth_middleware))
        .with_state((event_service, pick_service, user_service))
}
