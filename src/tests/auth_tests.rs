#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use bson::{doc, Document};
    use serde_json::json;

    use crate::tests::common::{create_test_user, offline_app, send, setup, JWT_SECRET};
    use crate::utils::{generate_jwt, validate_jwt};

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let app = offline_app().await;

        for (method, uri) in [
            (Method::GET, "/picks/me?event_id=1"),
            (Method::GET, "/picks/me/all"),
            (Method::POST, "/picks"),
            (Method::GET, "/leaderboard/me"),
            (Method::GET, "/users/me"),
            (Method::PUT, "/users/me"),
            (Method::POST, "/auth/refresh"),
            (Method::POST, "/admin/events"),
            (Method::PUT, "/admin/fights/1/result"),
        ] {
            let (status, body) = send(&app, method.clone(), uri, None, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
            assert_eq!(body["error"], "Missing bearer token");
        }
    }

    #[tokio::test]
    async fn rejects_token_signed_with_another_secret() {
        let app = offline_app().await;
        let token = generate_jwt("user-1", "user-1@example.com", "some_other_secret", 60).unwrap();

        let (status, body) = send(&app, Method::GET, "/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn rejects_expired_token() {
        let app = offline_app().await;
        let token = generate_jwt("user-1", "user-1@example.com", JWT_SECRET, -5).unwrap();

        let (status, _) = send(&app, Method::GET, "/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn limits_are_checked_before_touching_the_database() {
        let app = offline_app().await;

        let (status, _) = send(&app, Method::GET, "/leaderboard?limit=0", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/leaderboard?limit=501", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/leaderboard/event/1?limit=1000", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, Method::GET, "/events?limit=51", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_me_returns_profile() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "google-123", "Jane Doe", false).await;

        let (status, body) = send(&ctx.app, Method::GET, "/users/me", Some(&user.token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "google-123");
        assert_eq!(body["name"], "Jane Doe");
        assert_eq!(body["is_admin"], false);

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn first_request_provisions_the_user() {
        let Some(ctx) = setup().await else { return };
        let token = generate_jwt("ghost", "ghost@example.com", JWT_SECRET, 60).unwrap();

        let (status, body) = send(&ctx.app, Method::GET, "/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "ghost");
        assert_eq!(body["email"], "ghost@example.com");
        assert_eq!(body["name"], "ghost");
        assert_eq!(body["is_admin"], false);

        // Second request finds the stored user instead of creating another.
        let (status, again) = send(&ctx.app, Method::GET, "/users/me", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(again["created_at"], body["created_at"]);

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn disabled_user_is_forbidden() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "google-9", "Banned", false).await;
        ctx.db
            .collection::<Document>("users")
            .update_one(doc! { "_id": &user.id }, doc! { "$set": { "is_active": false } })
            .await
            .unwrap();

        let (status, _) = send(&ctx.app, Method::GET, "/users/me", Some(&user.token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn update_me_changes_profile() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "google-7", "Old Name", false).await;

        let (status, body) = send(
            &ctx.app,
            Method::PUT,
            "/users/me",
            Some(&user.token),
            Some(json!({ "name": "  New Name ", "profile_picture": "https://img.example.com/7.png" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "New Name");
        assert_eq!(body["profile_picture"], "https://img.example.com/7.png");

        let (_, me) = send(&ctx.app, Method::GET, "/users/me", Some(&user.token), None).await;
        assert_eq!(me["name"], "New Name");

        let (status, _) = send(&ctx.app, Method::PUT, "/users/me", Some(&user.token), Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) =
            send(&ctx.app, Method::PUT, "/users/me", Some(&user.token), Some(json!({ "name": " " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn refresh_issues_a_valid_token() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "google-5", "Refresher", false).await;

        let (status, body) = send(&ctx.app, Method::POST, "/auth/refresh", Some(&user.token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");
        assert_eq!(body["user"]["id"], "google-5");

        let token = body["access_token"].as_str().unwrap();
        let claims = validate_jwt(token, JWT_SECRET).unwrap();
        assert_eq!(claims.sub, "google-5");
        assert_eq!(claims.email, "google-5@example.com");

        let (status, _) = send(&ctx.app, Method::GET, "/users/me", Some(token), None).await;
        assert_eq!(status, StatusCode::OK);

        ctx.teardown().await;
    }
}
