use axum::{
    extract::{Path, Query, State},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::error::{AppError, ErrorResponse};
use crate::models::{
    event::{EventResponse, EventStatus},
    fight::FightResponse,
};
use crate::services::event_service::EventService;

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventListQuery {
    /// `scheduled`, `completed` or `cancelled`. When absent, upcoming cards
    /// then recent results, capped at `limit` and without cancelled cards.
    status: Option<EventStatus>,
    /// 1 to 50, default 20.
    limit: Option<i64>,
}

#[utoipa::path(
    get,
    path = "/events",
    params(EventListQuery),
    responses(
        (status = 200, description = "Events", body = [EventResponse]),
        (status = 400, description = "Invalid limit", body = ErrorResponse)
    )
)]
pub async fn list_events(
    State(event_service): State<Arc<EventService>>,
    Query(query): Query<EventListQuery>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let limit = query.limit.unwrap_or(20);
    if !(1..=50).contains(&limit) {
        return Err(AppError::BadRequest("limit must be between 1 and 50".to_string()));
    }

    let events = event_service.get_events_by_status(query.status, limit).await?;
    Ok(Json(events.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/events/{event_id}",
    params(
        ("event_id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Event found", body = EventResponse),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
pub async fn get_event(
    State(event_service): State<Arc<EventService>>,
    Path(event_id): Path<i64>,
) -> Result<Json<EventResponse>, AppError> {
    let event = event_service.get_event(event_id).await?;
    Ok(Json(event.into()))
}

#[utoipa::path(
    get,
    path = "/events/{event_id}/fights",
    params(
        ("event_id" = i64, Path, description = "Event ID")
    ),
    responses(
        (status = 200, description = "Fights on the card with results when available", body = [FightResponse]),
        (status = 404, description = "Event not found", body = ErrorResponse)
    )
)]
pub async fn get_event_fights(
    State(event_service): State<Arc<EventService>>,
    Path(event_id): Path<i64>,
) -> Result<Json<Vec<FightResponse>>, AppError> {
    let fights = event_service.get_event_fights(event_id).await?;
    Ok(Json(fights.into_iter().map(Into::into).collect()))
}

pub fn event_routes(event_service: Arc<EventService>) -> Router {
    Router::new()
        .route("/events", axum::routing::get(list_events))
        .route("/events/{event_id}", axum::routing::get(get_event))
        .route("/events/{event_id}/fights", axum::routing::get(get_event_fights))
        .with_state(event_service)
}
