use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{config::Config, routes::init_routes};

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::health_check,
        routes::events::list_events,
        routes::events::get_event,
        routes::events::get_event_fights,
        routes::picks::create_pick,
        routes::picks::get_my_picks,
        routes::picks::get_all_my_picks,
        routes::leaderboard::get_global_leaderboard,
        routes::leaderboard::get_event_leaderboard,
        routes::leaderboard::get_my_position,
        routes::user::get_me,
        routes::user::update_me,
        routes::auth::refresh_token,
        routes::admin::create_event,
        routes::admin::create_fight,
        routes::admin::update_event_timing,
        routes::admin::lock_event_picks,
        routes::admin::unlock_event_picks,
        routes::admin::update_fight_timing,
        routes::admin::set_fight_result,
        routes::admin::clear_fight_result,
        routes::admin::lock_fight_picks,
        routes::admin::unlock_fight_picks
    ),
    components(
        schemas(
            routes::HealthResponse,
            error::ErrorResponse,
            models::event::EventResponse,
            models::event::EventStatus,
            models::event::Location,
            models::event::CreateEventRequest,
            models::fight::FightResponse,
            models::fight::FightStatus,
            models::fight::Fighter,
            models::fight::FightResult,
            models::fight::Corner,
            models::fight::CreateFightRequest,
            models::pick::PickCreate,
            models::pick::PickResponse,
            models::pick::VictoryMethod,
            models::leaderboard::LeaderboardResponse,
            models::leaderboard::LeaderboardEntryResponse,
            models::leaderboard::UserPositionResponse,
            models::user::UserResponse,
            models::user::UpdateProfileRequest,
            routes::auth::AuthResponse,
            routes::admin::FightResultRequest,
            routes::admin::EventTimingRequest,
            routes::admin::FightTimingRequest,
            routes::admin::TimingResponse,
            routes::admin::LockResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected operations.
pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let comps = openapi.components.get_or_insert_with(Default::default);
        comps.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;
    let db = Arc::new(db::init_db(&config.mongodb_uri, &config.mongodb_db_name).await?);
    let port = config.port;
    let cors = cors_layer(&config.cors_origins);

    let app = Router::new()
        .merge(init_routes(db, Arc::new(config)))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "fight picks API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests;
