#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::{Duration, NaiveDate, Utc};
    use serde_json::json;

    use crate::models::fight::{Corner, FightResult};
    use crate::tests::common::{create_test_user, seed_event, seed_fight, send, setup};

    fn upcoming() -> NaiveDate {
        (Utc::now() + Duration::days(14)).date_naive()
    }

    #[tokio::test]
    async fn create_then_update_pick() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "user-1", "Fan One", false).await;
        seed_event(&ctx, 10, upcoming()).await;
        seed_fight(&ctx, 101, 10, 3).await;

        let (status, body) = send(
            &ctx.app,
            Method::POST,
            "/picks",
            Some(&user.token),
            Some(json!({
                "event_id": 10,
                "fight_id": 101,
                "picked_corner": "red",
                "picked_method": "KO/TKO",
                "picked_round": 2
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["id"], "user-1:101");
        assert_eq!(body["picked_corner"], "red");
        assert!(body["is_correct"].is_null());
        assert_eq!(body["points_awarded"], 0);
        assert!(body["updated_at"].is_null());

        let (status, body) = send(
            &ctx.app,
            Method::POST,
            "/picks",
            Some(&user.token),
            Some(json!({
                "event_id": 10,
                "fight_id": 101,
                "picked_corner": "blue",
                "picked_method": "DEC"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["picked_corner"], "blue");
        assert_eq!(body["picked_method"], "DEC");
        assert!(body["updated_at"].is_string());

        let (status, body) = send(&ctx.app, Method::GET, "/picks/me?event_id=10", Some(&user.token), None).await;
        assert_eq!(status, StatusCode::OK);
        let picks = body.as_array().unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0]["picked_corner"], "blue");

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn rejects_invalid_selections() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "user-1", "Fan One", false).await;
        seed_event(&ctx, 10, upcoming()).await;
        seed_event(&ctx, 11, upcoming()).await;
        seed_fight(&ctx, 101, 10, 3).await;

        let cases = [
            (json!({ "event_id": 10, "fight_id": 101, "picked_corner": "red", "picked_method": "DEC", "picked_round": 3 }), StatusCode::BAD_REQUEST),
            (json!({ "event_id": 10, "fight_id": 101, "picked_corner": "red", "picked_method": "SUB", "picked_round": 4 }), StatusCode::BAD_REQUEST),
            (json!({ "event_id": 10, "fight_id": 101, "picked_corner": "red", "picked_method": "SUB", "picked_round": 0 }), StatusCode::BAD_REQUEST),
            (json!({ "event_id": 11, "fight_id": 101, "picked_corner": "red", "picked_method": "SUB" }), StatusCode::BAD_REQUEST),
            (json!({ "event_id": 10, "fight_id": 999, "picked_corner": "red", "picked_method": "SUB" }), StatusCode::NOT_FOUND),
            (json!({ "event_id": 99, "fight_id": 101, "picked_corner": "red", "picked_method": "SUB" }), StatusCode::NOT_FOUND),
        ];
        for (payload, expected) in cases {
            let (status, _) = send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(payload.clone())).await;
            assert_eq!(status, expected, "{payload}");
        }

        let (_, body) = send(&ctx.app, Method::GET, "/picks/me/all", Some(&user.token), None).await;
        assert_eq!(body.as_array().unwrap().len(), 0);

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn finalized_fight_is_closed_and_scores_existing_pick() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "user-1", "Fan One", false).await;
        seed_event(&ctx, 10, upcoming()).await;
        seed_fight(&ctx, 101, 10, 3).await;

        let pick = json!({
            "event_id": 10,
            "fight_id": 101,
            "picked_corner": "red",
            "picked_method": "SUB",
            "picked_round": 1
        });
        let (status, _) = send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(pick.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        ctx.services
            .event_service
            .set_fight_result(
                101,
                FightResult {
                    winner: Some(Corner::Red),
                    method: "Submission".to_string(),
                    round: Some(1),
                    time: Some("3:12".to_string()),
                },
            )
            .await
            .unwrap();

        let (status, body) = send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(pick)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Fight already has a result");

        let (_, body) = send(&ctx.app, Method::GET, "/picks/me?event_id=10", Some(&user.token), None).await;
        assert_eq!(body[0]["is_correct"], true);
        assert_eq!(body[0]["points_awarded"], 3);

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn locked_picks_cannot_change() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "user-1", "Fan One", false).await;
        seed_event(&ctx, 10, upcoming()).await;
        seed_fight(&ctx, 101, 10, 3).await;
        seed_fight(&ctx, 102, 10, 3).await;

        let first = json!({ "event_id": 10, "fight_id": 101, "picked_corner": "red", "picked_method": "DEC" });
        send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(first.clone())).await;

        let updated = ctx.services.pick_service.set_fight_picks_locked(101, true).await.unwrap();
        assert_eq!(updated, 1);

        let (status, body) = send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(first)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "This pick has been locked");

        // other fights on the card stay open
        let second = json!({ "event_id": 10, "fight_id": 102, "picked_corner": "blue", "picked_method": "DEC" });
        let (status, _) = send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(second.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        ctx.services.event_service.set_event_lock(10, true).await.unwrap();
        let (status, _) = send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(second)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn fight_lock_time_closes_picks() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "user-1", "Fan One", false).await;
        seed_event(&ctx, 10, upcoming()).await;
        seed_fight(&ctx, 101, 10, 3).await;

        ctx.services
            .event_service
            .update_fight_timing(101, None, Some(Utc::now() - Duration::minutes(1)))
            .await
            .unwrap();

        let pick = json!({ "event_id": 10, "fight_id": 101, "picked_corner": "red", "picked_method": "DEC" });
        let (status, body) = send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(pick)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Picks closed for this fight");

        ctx.teardown().await;
    }

    #[tokio::test]
    async fn all_picks_are_newest_first() {
        let Some(ctx) = setup().await else { return };
        let user = create_test_user(&ctx, "user-1", "Fan One", false).await;
        seed_event(&ctx, 10, upcoming()).await;
        seed_fight(&ctx, 101, 10, 3).await;
        seed_fight(&ctx, 102, 10, 3).await;

        for fight_id in [101, 102] {
            let pick = json!({ "event_id": 10, "fight_id": fight_id, "picked_corner": "red", "picked_method": "DEC" });
            send(&ctx.app, Method::POST, "/picks", Some(&user.token), Some(pick)).await;
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }

        let (status, body) = send(&ctx.app, Method::GET, "/picks/me/all?limit=1", Some(&user.token), None).await;
        assert_eq!(status, StatusCode::OK);
        let picks = body.as_array().unwrap();
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0]["fight_id"], 102);

        let (status, _) = send(&ctx.app, Method::GET, "/picks/me/all?limit=0", Some(&user.token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        ctx.teardown().await;
    }
}
