use axum::{extract::State, routing::get, Json, Router};
use mongodb::Database;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::Config;
use crate::db;
use crate::services::{
    event_service::EventService, leaderboard_service::LeaderboardService, pick_service::PickService,
    user_service::UserService,
};

pub mod admin;
pub mod auth;
pub mod events;
pub mod leaderboard;
pub mod picks;
pub mod user;

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    )
)]
pub async fn health_check(State(db): State<Arc<Database>>) -> Json<HealthResponse> {
    let database = if db::ping(&db).await { "connected" } else { "disconnected" };
    Json(HealthResponse {
        status: "ok".to_string(),
        database: database.to_string(),
    })
}

pub fn init_routes(db: Arc<Database>, config: Arc<Config>) -> Router {
    let user_service = Arc::new(UserService::new(db.clone()));
    let event_service = Arc::new(EventService::new(db.clone()));
    let pick_service = Arc::new(PickService::new(db.clone(), event_service.clone(), config.scoring));
    let leaderboard_service = Arc::new(LeaderboardService::new(
        event_service.clone(),
        pick_service.clone(),
        user_service.clone(),
        config.scoring,
    ));

    let health: Router = Router::new().route("/health", get(health_check)).with_state(db);

    health
        .merge(events::event_routes(event_service.clone()))
        .merge(picks::pick_routes(pick_service.clone(), user_service.clone(), config.clone()))
        .merge(leaderboard::leaderboard_routes(
            leaderboard_service,
            user_service.clone(),
            config.clone(),
        ))
        .merge(user::user_routes(user_service.clone(), config.clone()))
        .merge(auth::auth_routes(user_service.clone(), config.clone()))
        .merge(admin::admin_routes(event_service, pick_service, user_service, config))
}
