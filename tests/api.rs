//! End-to-end scenarios against a real Postgres.
//!
//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use lifetrack::{
    app::build_app,
    auth::jwt::JwtKeys,
    config::{AppConfig, DbConfig, JwtConfig},
    state::AppState,
};
use serde_json::{json, Value};
use sqlx::PgPool;
use tower::ServiceExt;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-secret".into(),
        issuer: "lifetrack".into(),
        audience: "lifetrack-users".into(),
        ttl_minutes: 60,
    }
}

/// Token for a user id that never signed up.
fn token_for(user_id: i64) -> String {
    JwtKeys::from_config(&jwt_config()).sign(user_id).unwrap()
}

fn app(pool: PgPool) -> Router {
    let config = Arc::new(AppConfig {
        database_url: String::new(),
        jwt: jwt_config(),
        db: DbConfig {
            max_connections: 5,
            acquire_timeout_secs: 5,
        },
        trust_user_id_param: false,
    });
    build_app(AppState::from_parts(pool, config))
}

async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        req = req.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(b.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn signup(app: &Router, email: &str) -> (i64, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({"email": email, "password": "hunter22", "display_name": "Ann"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    (
        body["user_id"].as_i64().unwrap(),
        body["token"].as_str().unwrap().to_string(),
    )
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn signup_then_me(pool: PgPool) {
    let app = app(pool);
    let (uid, token) = signup(&app, "Ann@Example.com").await;
    assert_eq!(uid, 1);

    let (status, me) = call(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user_id"], uid);
    assert_eq!(me["email"], "ann@example.com");
    assert_eq!(me["display_name"], "Ann");

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/signup",
        None,
        Some(json!({"email": "ann@example.com", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email already in use");

    let (second, _) = signup(&app, "bob@example.com").await;
    assert_eq!(second, 2);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn login_failures_look_the_same(pool: PgPool) {
    let app = app(pool);
    signup(&app, "ann@example.com").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "ann@example.com", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (s1, wrong_pw) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "ann@example.com", "password": "nope"})),
    )
    .await;
    let (s2, unknown) = call(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({"email": "zed@example.com", "password": "nope"})),
    )
    .await;
    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_pw, unknown);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn tasks_are_owner_scoped(pool: PgPool) {
    let app = app(pool);
    let (_, ann) = signup(&app, "ann@example.com").await;
    let (_, bob) = signup(&app, "bob@example.com").await;

    let (status, created) = call(
        &app,
        Method::POST,
        "/tasks",
        Some(&ann),
        Some(json!({"title": "walk", "due_date": "2024-03-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_i64().unwrap();

    let uri = format!("/tasks/{id}");
    let (status, _) = call(&app, Method::PUT, &uri, Some(&bob), Some(json!({"done": true}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::DELETE, &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::PUT, &uri, Some(&ann), Some(json!({"done": 1}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["updated"], 1);

    let (_, list) = call(&app, Method::GET, "/tasks", Some(&ann), None).await;
    assert_eq!(list[0]["title"], "walk");
    assert_eq!(list[0]["done"], true);
    assert_eq!(list[0]["due_date"], "2024-03-01");

    let (_, list) = call(&app, Method::GET, "/tasks", Some(&bob), None).await;
    assert_eq!(list, json!([]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn nutrient_shares_come_from_history(pool: PgPool) {
    let app = app(pool);
    let (_, token) = signup(&app, "ann@example.com").await;

    let (_, body) = call(&app, Method::GET, "/nutrients?date=2024-05-01", Some(&token), None).await;
    assert_eq!(body["current"]["veg"], 0.0);
    assert_eq!(body["goal"]["veg"], 0.48);
    assert!(body["goal"]["updated_at"].is_null());

    for (veg, carb, protein) in [(40.0, 20.0, 10.0), (8.0, 10.0, 12.0)] {
        let (status, _) = call(
            &app,
            Method::POST,
            "/nutrients/history",
            Some(&token),
            Some(json!({
                "veg_g": veg, "carb_g": carb, "protein_g": protein,
                "eaten_at": "2024-05-01 12:00:00"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, body) = call(&app, Method::GET, "/nutrients?date=2024-05-01", Some(&token), None).await;
    assert_eq!(body["current"]["veg"], 0.48);
    assert_eq!(body["current"]["carb"], 0.3);
    assert_eq!(body["current"]["protein"], 0.22);
    assert_eq!(body["current"]["grams"]["total_g"], 100.0);
    assert_eq!(body["current"]["date"], "2024-05-01");

    let (_, list) = call(
        &app,
        Method::GET,
        "/nutrients/history?date=2024-05-02",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(list, json!([]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn food_based_history_is_scaled(pool: PgPool) {
    let app = app(pool);
    let (_, token) = signup(&app, "ann@example.com").await;

    let (_, food) = call(
        &app,
        Method::POST,
        "/foods",
        Some(&token),
        Some(json!({"name": "Oats", "carb_g": 10, "protein_g": 4, "per_unit_g": 50})),
    )
    .await;
    let food_id = food["id"].as_i64().unwrap();

    let (status, _) = call(
        &app,
        Method::POST,
        "/nutrients/history",
        Some(&token),
        Some(json!({"food_id": food_id, "amount_g": 100, "eaten_at": "2024-05-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = call(
        &app,
        Method::GET,
        "/nutrients/history?date=2024-05-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(list[0]["name"], "Oats");
    assert_eq!(list[0]["carb_g"], 20.0);
    assert_eq!(list[0]["protein_g"], 8.0);
    assert_eq!(list[0]["amount_g"], 100.0);

    let (status, body) = call(
        &app,
        Method::POST,
        "/nutrients/history",
        Some(&token),
        Some(json!({"food_id": 9999})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "food not found");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn goal_round_trip(pool: PgPool) {
    let app = app(pool);
    let (_, token) = signup(&app, "ann@example.com").await;

    let (_, body) = call(&app, Method::GET, "/goal", Some(&token), None).await;
    assert_eq!(body["progress"], 0.0);

    let (status, body) = call(&app, Method::PUT, "/goal", Some(&token), Some(json!({"progress": 0.4}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["progress"], 0.4);

    let (_, body) = call(&app, Method::GET, "/goal", Some(&token), None).await;
    assert_eq!(body["progress"], 0.4);

    let (status, _) = call(
        &app,
        Method::PUT,
        "/nutrients/goal",
        Some(&token),
        Some(json!({"veg": 0.5, "carb": 0.3, "protein": 0.2})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, "/nutrients", Some(&token), None).await;
    assert_eq!(body["goal"]["veg"], 0.5);
    assert!(body["goal"]["updated_at"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn deleting_missing_rows_is_404(pool: PgPool) {
    let app = app(pool);
    let (_, token) = signup(&app, "ann@example.com").await;
    for uri in [
        "/tasks/42",
        "/diary/42",
        "/calendar/events/42",
        "/foods/42",
        "/nutrients/history/42",
    ] {
        let (status, body) = call(&app, Method::DELETE, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body["error"], "not found");
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn signup_takes_any_non_empty_email(pool: PgPool) {
    let app = app(pool);
    let (_, token) = signup(&app, "user@localhost").await;
    let (_, me) = call(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(me["email"], "user@localhost");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn other_users_rows_are_untouchable(pool: PgPool) {
    let app = app(pool);
    let (_, ann) = signup(&app, "ann@example.com").await;
    let (_, bob) = signup(&app, "bob@example.com").await;

    let id_of = |body: Value| body["id"].as_i64().unwrap();
    let (_, diary) = call(
        &app,
        Method::POST,
        "/diary",
        Some(&ann),
        Some(json!({"title": "day one", "date": "2024-01-02"})),
    )
    .await;
    let (_, event) = call(
        &app,
        Method::POST,
        "/calendar/events",
        Some(&ann),
        Some(json!({"title": "dentist", "starts_at": "2024-01-02 09:00:00"})),
    )
    .await;
    let (_, food) = call(
        &app,
        Method::POST,
        "/foods",
        Some(&ann),
        Some(json!({"name": "Rice", "carb_g": 28})),
    )
    .await;
    let (_, history) = call(
        &app,
        Method::POST,
        "/nutrients/history",
        Some(&ann),
        Some(json!({"name": "snack", "veg_g": 5, "note": "mine"})),
    )
    .await;
    let (diary, event, food, history) = (id_of(diary), id_of(event), id_of(food), id_of(history));

    let attempts = [
        (Method::DELETE, format!("/diary/{diary}"), None),
        (Method::DELETE, format!("/calendar/events/{event}"), None),
        (Method::PUT, format!("/foods/{food}"), Some(json!({"name": "Stolen"}))),
        (Method::DELETE, format!("/foods/{food}"), None),
        (
            Method::PUT,
            format!("/nutrients/history/{history}"),
            Some(json!({"note": "bob was here"})),
        ),
        (Method::DELETE, format!("/nutrients/history/{history}"), None),
    ];
    for (method, uri, body) in attempts {
        let (status, _) = call(&app, method.clone(), &uri, Some(&bob), body).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
    }

    let (_, list) = call(&app, Method::GET, "/diary", Some(&ann), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["title"], "day one");

    let (_, list) = call(
        &app,
        Method::GET,
        "/calendar/events?start=2024-01-02&end=2024-01-02",
        Some(&ann),
        None,
    )
    .await;
    assert_eq!(list[0]["title"], "dentist");

    let (_, list) = call(&app, Method::GET, "/foods", Some(&ann), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Rice");

    let (_, list) = call(&app, Method::GET, "/nutrients/history", Some(&ann), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["note"], "mine");

    let (_, list) = call(&app, Method::GET, "/diary", Some(&bob), None).await;
    assert_eq!(list, json!([]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn profile_put_inserts_then_updates(pool: PgPool) {
    let app = app(pool);
    let token = token_for(99);

    let (_, body) = call(&app, Method::GET, "/profile", Some(&token), None).await;
    assert_eq!(body["user_id"], 99);
    assert_eq!(body["display_name"], "Your Name");
    assert!(body["updated_at"].is_null());

    let (status, body) = call(&app, Method::PUT, "/profile", Some(&token), Some(json!({"bio": "hi"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (_, body) = call(&app, Method::GET, "/profile", Some(&token), None).await;
    assert_eq!(body["display_name"], "User");
    assert_eq!(body["bio"], "hi");
    assert!(body["email"].is_null());
    assert!(body["updated_at"].is_string());

    let (status, _) = call(
        &app,
        Method::PUT,
        "/profile",
        Some(&token),
        Some(json!({"display_name": "Zed", "email": " Zed@Example.com "})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&app, Method::GET, "/profile", Some(&token), None).await;
    assert_eq!(body["display_name"], "Zed");
    assert_eq!(body["email"], "zed@example.com");
    assert_eq!(body["bio"], "hi");

    let (status, body) = call(&app, Method::PUT, "/profile", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "no fields");

    signup(&app, "ann@example.com").await;
    let (status, body) = call(
        &app,
        Method::PUT,
        "/profile",
        Some(&token),
        Some(json!({"email": "ANN@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "email already in use");

    let fresh = token_for(500);
    let (status, _) = call(
        &app,
        Method::PUT,
        "/profile",
        Some(&fresh),
        Some(json!({"email": "ann@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn calendar_range_uses_end_of_event(pool: PgPool) {
    let app = app(pool);
    let (_, token) = signup(&app, "ann@example.com").await;

    for (title, starts_at, ends_at) in [
        ("point", "2024-01-31 10:00:00", None),
        ("overnight", "2024-01-31 23:00:00", Some("2024-02-01 01:00:00")),
        ("before", "2024-01-30 12:00:00", None),
    ] {
        let (status, _) = call(
            &app,
            Method::POST,
            "/calendar/events",
            Some(&token),
            Some(json!({"title": title, "starts_at": starts_at, "ends_at": ends_at})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{title}");
    }

    let titles = |list: Value| -> Vec<String> {
        list.as_array()
            .unwrap()
            .iter()
            .map(|e| e["title"].as_str().unwrap().to_string())
            .collect()
    };

    let (_, list) = call(
        &app,
        Method::GET,
        "/calendar/events?start=2024-01-31&end=2024-01-31",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(titles(list), ["point"]);

    let (_, list) = call(
        &app,
        Method::GET,
        "/calendar/events?start=2024-01-31&end=2024-02-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(titles(list), ["point", "overnight"]);

    let (status, _) = call(
        &app,
        Method::POST,
        "/calendar/events",
        Some(&token),
        Some(json!({"title": "bad", "starts_at": "2024-01-31 10:00", "ends_at": "2024-01-31 09:00"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore]
async fn diary_lists_by_day_or_latest(pool: PgPool) {
    let app = app(pool);
    let (_, token) = signup(&app, "ann@example.com").await;

    let (status, _) = call(
        &app,
        Method::POST,
        "/diary",
        Some(&token),
        Some(json!({"date": "2024-01-02", "content": "cold", "mood": "meh"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&app, Method::POST, "/diary", Some(&token), Some(json!({"title": "today"}))).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = call(&app, Method::POST, "/diary", Some(&token), Some(json!({"title": "  "}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, list) = call(&app, Method::GET, "/diary?date=2024-01-02", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["content"], "cold");
    assert_eq!(list[0]["mood"], "meh");
    assert_eq!(list[0]["entry_date"], "2024-01-02");

    let (_, list) = call(&app, Method::GET, "/diary", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert_eq!(list[0]["title"], "today");

    for i in 0..55 {
        call(
            &app,
            Method::POST,
            "/diary",
            Some(&token),
            Some(json!({"title": format!("entry {i}"), "date": "2023-06-01"})),
        )
        .await;
    }
    let (_, list) = call(&app, Method::GET, "/diary", Some(&token), None).await;
    assert_eq!(list.as_array().unwrap().len(), 50);
    assert_eq!(list[0]["title"], "today");
}
