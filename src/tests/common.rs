use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use bson::{doc, oid::ObjectId, Document};
use chrono::NaiveDate;
use mongodb::{Client, Database};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use crate::{
    config::Config,
    db::init_db,
    models::{
        event::Event,
        fight::{Fight, FightStatus, Fighter},
        user::NewUser,
    },
    routes,
    services::{
        event_service::EventService, pick_service::PickService, scoring::ScoringPolicy,
        user_service::UserService,
    },
    utils::generate_jwt,
};

pub const JWT_SECRET: &str = "test_secret";

pub struct TestServices {
    pub user_service: UserService,
    pub event_service: Arc<EventService>,
    pub pick_service: PickService,
}

pub struct TestContext {
    pub app: Router,
    pub db: Arc<Database>,
    pub services: TestServices,
}

impl TestContext {
    pub async fn teardown(self) {
        let _ = Database::drop(&self.db).await;
    }
}

pub struct TestUser {
    pub id: String,
    pub token: String,
}

fn test_config(mongodb_uri: String, mongodb_db_name: String) -> Config {
    Config {
        mongodb_uri,
        mongodb_db_name,
        jwt_secret: JWT_SECRET.to_string(),
        jwt_expire_minutes: 60,
        port: 8001,
        cors_origins: vec!["*".to_string()],
        scoring: ScoringPolicy::default(),
    }
}

/// Builds the app against a fresh database, or returns `None` when
/// `MONGODB_TEST_URI` is not set so the test can be skipped.
pub async fn setup() -> Option<TestContext> {
    dotenv::dotenv().ok();
    let Ok(uri) = std::env::var("MONGODB_TEST_URI") else {
        eprintln!("MONGODB_TEST_URI not set, skipping");
        return None;
    };

    let db_name = format!("fight_picks_test_{}", ObjectId::new().to_hex());
    let config = test_config(uri, db_name);
    let db = Arc::new(
        init_db(&config.mongodb_uri, &config.mongodb_db_name)
            .await
            .expect("failed to connect to test database"),
    );

    let event_service = Arc::new(EventService::new(db.clone()));
    let services = TestServices {
        user_service: UserService::new(db.clone()),
        pick_service: PickService::new(db.clone(), event_service.clone(), config.scoring),
        event_service,
    };
    let app = routes::init_routes(db.clone(), Arc::new(config));

    Some(TestContext { app, db, services })
}

/// Router backed by a client that never connects. Good for requests that are
/// rejected before any database access.
pub async fn offline_app() -> Router {
    let client = Client::with_uri_str("mongodb://127.0.0.1:27017")
        .await
        .expect("failed to build client");
    let db = Arc::new(client.database("unused"));
    let config = test_config("mongodb://127.0.0.1:27017".to_string(), "unused".to_string());
    routes::init_routes(db, Arc::new(config))
}

pub async fn create_test_user(ctx: &TestContext, id: &str, name: &str, is_admin: bool) -> TestUser {
    let user = ctx
        .services
        .user_service
        .upsert_user(NewUser {
            id: id.to_string(),
            email: format!("{id}@example.com"),
            name: name.to_string(),
            profile_picture: None,
        })
        .await
        .expect("failed to create test user");
    if is_admin {
        ctx.db
            .collection::<Document>("users")
            .update_one(doc! { "_id": &user.id }, doc! { "$set": { "is_admin": true } })
            .await
            .expect("failed to promote test user");
    }

    let token = generate_jwt(&user.id, &user.email, JWT_SECRET, 60).expect("failed to sign token");
    TestUser { id: user.id, token }
}

pub fn fighter(name: &str) -> Fighter {
    Fighter {
        name: name.to_string(),
        nickname: None,
        nationality: None,
        record: None,
        ranking: None,
        profile_image_url: None,
    }
}

pub async fn seed_event(ctx: &TestContext, id: i64, date: NaiveDate) -> Event {
    let event = Event {
        id,
        name: format!("Fight Night {id}"),
        subtitle: None,
        promotion: "UFC".to_string(),
        date,
        location: None,
        status: crate::models::event::EventStatus::Scheduled,
        total_fights: 0,
        poster_image_url: None,
        picks_locked: false,
        picks_lock_date: None,
    };
    ctx.services
        .event_service
        .create_event(event)
        .await
        .expect("failed to seed event")
}

pub async fn seed_fight(ctx: &TestContext, id: i64, event_id: i64, rounds: i32) -> Fight {
    let fight = Fight {
        id,
        event_id,
        weight_class: "Lightweight".to_string(),
        rounds_scheduled: rounds,
        is_title_fight: false,
        status: FightStatus::Scheduled,
        red: fighter("Red Corner"),
        blue: fighter("Blue Corner"),
        result: None,
        picks_locked: false,
        picks_lock_time: None,
        start_time: None,
    };
    ctx.services
        .event_service
        .create_fight(fight)
        .await
        .expect("failed to seed fight")
}

/// Sends one request and returns the status and the parsed JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            json_body(&json)
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).expect("failed to build request"))
        .await
        .expect("request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body is not JSON")
    };
    (status, json)
}

/// Helper to create a JSON body for requests.
pub fn json_body(json: &Value) -> Body {
    Body::from(json.to_string())
}
