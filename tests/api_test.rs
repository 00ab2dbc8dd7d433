//! HTTP-level tests for the REST surface.
//!
//! These drive the router in-process with `tower::ServiceExt::oneshot`,
//! covering routing, the bearer extractor, per-endpoint status codes, and
//! the `{ "error", "details" }` body. The final test serves the app on a
//! real socket and exercises it with `reqwest`.

use axum::body::{to_bytes, Body};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{Duration, NaiveDateTime, Utc};
use serde_json::{json, Value};
use sportly_backend::auth;
use sportly_backend::config::AuthConfig;
use sportly_backend::rest_api::build_router;
use sportly_backend::AppState;
use sqlx::PgPool;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "api-test-secret".to_string(),
        token_expiry_hours: 24,
    }
}

fn build_app(pool: PgPool) -> Router {
    build_router(Arc::new(AppState::new(pool, test_auth_config())))
}

fn starts_in(minutes: i64) -> NaiveDateTime {
    Utc::now().naive_utc() + Duration::minutes(minutes)
}

/// Drive one request through the router and decode the JSON body
async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to drive router");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse response body")
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("Failed to build request")
}

fn get_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("Failed to build request")
}

fn delete_authed(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .expect("Failed to build request")
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    builder
        .body(Body::from(
            serde_json::to_vec(body).expect("Failed to encode request body"),
        ))
        .expect("Failed to build request")
}

/// Sign up through the API, returning the token and the profile body
async fn signup_user(app: &Router, email: &str, username: &str) -> (String, Value) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": email, "username": username, "password": "hunter2hunter2" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    let token = body["token"]
        .as_str()
        .expect("Signup should return a token")
        .to_string();
    (token, body["user"].clone())
}

/// Look up a seeded sport's id through the API
async fn seeded_sport_id(app: &Router, name: &str) -> String {
    let (status, sports) = send(app, get("/api/sports")).await;
    assert_eq!(status, StatusCode::OK);

    sports
        .as_array()
        .expect("Sports response should be an array")
        .iter()
        .find(|s| s["name"] == name)
        .and_then(|s| s["id"].as_str())
        .expect("Seeded sport should be present")
        .to_string()
}

/// Create a session through the API, returning the detail body
async fn create_session_via_api(
    app: &Router,
    token: &str,
    sport_id: &str,
    minutes_ahead: i64,
) -> Value {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/api/sessions",
            Some(token),
            &json!({
                "sport_id": sport_id,
                "title": "Friday Futsal",
                "description": "Weekly pickup game",
                "location": "Main Court",
                "date_time": starts_in(minutes_ahead),
                "duration_minutes": 90,
                "max_players": 10,
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    body
}

// ============================================================================
// Health and Authentication
// ============================================================================

#[sqlx::test]
async fn test_health_endpoint(pool: PgPool) {
    let app = build_app(pool);

    let (status, body) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[sqlx::test]
async fn test_rejects_missing_and_malformed_bearer_tokens(pool: PgPool) {
    let app = build_app(pool);

    // No Authorization header at all
    let (status, body) = send(&app, get("/api/auth/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["details"], "Unauthorized: Missing authorization header");

    // Wrong scheme
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(AUTHORIZATION, "Token abc123")
        .body(Body::empty())
        .expect("Failed to build request");
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"], "Unauthorized: Expected bearer token");

    // Garbled token
    let (status, body) = send(&app, get_authed("/api/auth/me", "not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["details"], "Unauthorized: Invalid or expired token");

    // Writes are gated too
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/sports",
            None,
            &json!({ "name": "Padel", "players_per_team": 2 }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test]
async fn test_signup_creates_account_and_token(pool: PgPool) {
    let app = build_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({
                "email": "  Player@Example.com ",
                "username": "player_one",
                "password": "hunter2hunter2",
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["email"], "player@example.com");
    assert_eq!(body["user"]["username"], "player_one");
    // The profile never carries the stored hash
    assert!(body["user"].get("password_hash").is_none());

    // The token verifies against the same secret
    let token = body["token"].as_str().expect("Signup should return a token");
    let claims = auth::verify_token(token, &test_auth_config()).expect("Token should verify");
    assert_eq!(claims.email, "player@example.com");

    let (status, me) = send(&app, get_authed("/api/auth/me", token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "player_one");
}

#[sqlx::test]
async fn test_signup_validation_over_http(pool: PgPool) {
    let app = build_app(pool);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": "no-at-sign", "username": "player_one", "password": "hunter2hunter2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    // Duplicate email
    signup_user(&app, "dupe@example.com", "first_user").await;
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            None,
            &json!({ "email": "dupe@example.com", "username": "second_user", "password": "hunter2hunter2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
}

#[sqlx::test]
async fn test_login_over_http(pool: PgPool) {
    let app = build_app(pool);
    signup_user(&app, "casey@example.com", "casey_j").await;

    // Email casing does not matter
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "CASEY@Example.COM", "password": "hunter2hunter2" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().expect("Login should return a token");
    assert!(!token.is_empty());
    assert_eq!(body["user"]["username"], "casey_j");

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "casey@example.com", "password": "wrong-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

// ============================================================================
// Sports
// ============================================================================

#[sqlx::test]
async fn test_sports_endpoints(pool: PgPool) {
    let app = build_app(pool);

    // Seeded catalogue is public
    let (status, sports) = send(&app, get("/api/sports")).await;
    assert_eq!(status, StatusCode::OK);
    let sports = sports
        .as_array()
        .expect("Sports response should be an array");
    assert!(sports.len() >= 6);
    let futsal = sports
        .iter()
        .find(|s| s["name"] == "Futsal")
        .expect("Futsal should be seeded");
    assert_eq!(futsal["players_per_team"], 5);

    // Creating needs a token
    let body = json!({ "name": "Handball", "players_per_team": 7 });
    let (status, _) = send(&app, json_request("POST", "/api/sports", None, &body)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (token, _) = signup_user(&app, "maker@example.com", "sport_maker").await;
    let (status, created) =
        send(&app, json_request("POST", "/api/sports", Some(&token), &body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Handball");
    assert_eq!(created["players_per_team"], 7);
}

// ============================================================================
// Sessions
// ============================================================================

#[sqlx::test]
async fn test_create_and_fetch_session(pool: PgPool) {
    let app = build_app(pool);
    let (token, user) = signup_user(&app, "host@example.com", "the_host").await;
    let futsal_id = seeded_sport_id(&app, "Futsal").await;

    let detail = create_session_via_api(&app, &token, &futsal_id, 120).await;
    assert_eq!(detail["title"], "Friday Futsal");
    assert_eq!(detail["status"], "upcoming");
    assert_eq!(detail["participant_count"], 1);
    assert_eq!(detail["host"]["id"], user["id"]);
    let teams = detail["teams"].as_array().expect("Detail should list teams");
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0]["name"], "A");
    assert_eq!(teams[1]["name"], "B");
    // The host joins without a team
    assert_eq!(detail["unassigned"][0]["username"], "the_host");

    let session_id = detail["id"].as_str().expect("Detail should carry an id");
    let (status, fetched) = send(&app, get(&format!("/api/sessions/{}", session_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], detail["id"]);
    assert_eq!(fetched["sport"]["name"], "Futsal");

    let (status, listing) = send(&app, get("/api/sessions")).await;
    assert_eq!(status, StatusCode::OK);
    let listing = listing.as_array().expect("Listing should be an array");
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0]["title"], "Friday Futsal");
    assert_eq!(listing[0]["participant_count"], 1);
}

#[sqlx::test]
async fn test_unknown_session_returns_404(pool: PgPool) {
    let app = build_app(pool);

    let (status, body) = send(&app, get(&format!("/api/sessions/{}", Uuid::new_v4()))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["details"], "Resource not found: Session not found");
}

#[sqlx::test]
async fn test_invalid_status_filter_rejected(pool: PgPool) {
    let app = build_app(pool);

    let (status, body) = send(&app, get("/api/sessions?status=paused")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
    assert_eq!(body["details"], "Validation error: Invalid status: paused");

    // Known statuses filter instead of failing
    let (status, body) = send(&app, get("/api/sessions?status=completed")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().expect("Listing should be an array").len(), 0);
}

#[sqlx::test]
async fn test_join_team_switch_and_leave(pool: PgPool) {
    let app = build_app(pool);
    let (host_token, _) = signup_user(&app, "host@example.com", "the_host").await;
    let futsal_id = seeded_sport_id(&app, "Futsal").await;
    let detail = create_session_via_api(&app, &host_token, &futsal_id, 120).await;
    let session_id = detail["id"]
        .as_str()
        .expect("Detail should carry an id")
        .to_string();
    let team_a = detail["teams"][0]["id"]
        .as_str()
        .expect("Team A should carry an id")
        .to_string();
    let team_b = detail["teams"][1]["id"]
        .as_str()
        .expect("Team B should carry an id")
        .to_string();

    let (player_token, _) = signup_user(&app, "player@example.com", "player_two").await;

    // Join straight onto team A
    let (status, joined) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/sessions/{}/join", session_id),
            Some(&player_token),
            &json!({ "team_id": team_a }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["participant_count"], 2);
    assert_eq!(joined["teams"][0]["members"][0]["username"], "player_two");

    // Joining twice is rejected
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/sessions/{}/join", session_id),
            Some(&player_token),
            &json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");

    // Switch to team B
    let (status, switched) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/sessions/{}/team", session_id),
            Some(&player_token),
            &json!({ "team_id": team_b }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let team_a_members = switched["teams"][0]["members"]
        .as_array()
        .expect("Team A should list members");
    assert_eq!(team_a_members.len(), 0);
    assert_eq!(switched["teams"][1]["members"][0]["username"], "player_two");

    // Unknown team
    let (status, _) = send(
        &app,
        json_request(
            "POST",
            &format!("/api/sessions/{}/team", session_id),
            Some(&player_token),
            &json!({ "team_id": Uuid::new_v4() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, left) = send(
        &app,
        delete_authed(&format!("/api/sessions/{}/leave", session_id), &player_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(left["participant_count"], 1);
}

#[sqlx::test]
async fn test_status_patch_permissions_and_clock(pool: PgPool) {
    let app = build_app(pool);
    let (host_token, _) = signup_user(&app, "host@example.com", "the_host").await;
    let (other_token, _) = signup_user(&app, "other@example.com", "not_the_host").await;
    let futsal_id = seeded_sport_id(&app, "Futsal").await;
    let detail = create_session_via_api(&app, &host_token, &futsal_id, 120).await;
    let uri = format!(
        "/api/sessions/{}/status",
        detail["id"].as_str().expect("Detail should carry an id")
    );

    // Unknown status strings are rejected before any lookup
    let (status, body) = send(
        &app,
        json_request("PATCH", &uri, Some(&host_token), &json!({ "status": "paused" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");

    // The server clock gates the start transition
    let (status, body) = send(
        &app,
        json_request("PATCH", &uri, Some(&host_token), &json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["details"],
        "Validation error: Session has not reached its start time"
    );

    // Only the host may cancel
    let (status, body) = send(
        &app,
        json_request("PATCH", &uri, Some(&other_token), &json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, cancelled) = send(
        &app,
        json_request("PATCH", &uri, Some(&host_token), &json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cancelled["status"], "cancelled");

    // Terminal states are absorbing
    let (status, body) = send(
        &app,
        json_request("PATCH", &uri, Some(&host_token), &json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");
}

// ============================================================================
// Live Server
// ============================================================================

/// End-to-end over a real socket: serve the router and drive it with reqwest
#[sqlx::test]
async fn test_live_server_roundtrip(pool: PgPool) {
    let app = build_app(pool);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let address = listener
        .local_addr()
        .expect("Failed to read listener address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server error");
    });

    let base = format!("http://{}", address);
    let client = reqwest::Client::new();

    // Step 1: the service is up
    let res = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to reach health endpoint");
    assert_eq!(res.status().as_u16(), 200);

    // Step 2: sign up over the wire
    let res = client
        .post(format!("{}/api/auth/signup", base))
        .json(&json!({ "email": "live@example.com", "username": "live_user", "password": "hunter2hunter2" }))
        .send()
        .await
        .expect("Failed to call signup");
    assert_eq!(res.status().as_u16(), 201);
    let body: Value = res.json().await.expect("Failed to parse signup response");
    let token = body["token"]
        .as_str()
        .expect("Signup should return a token")
        .to_string();

    // Step 3: authenticated profile lookup
    let res = client
        .get(format!("{}/api/auth/me", base))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to call me");
    assert_eq!(res.status().as_u16(), 200);
    let me: Value = res.json().await.expect("Failed to parse profile");
    assert_eq!(me["username"], "live_user");

    // Step 4: unauthenticated lookup is rejected with the JSON error body
    let res = client
        .get(format!("{}/api/auth/me", base))
        .send()
        .await
        .expect("Failed to call me");
    assert_eq!(res.status().as_u16(), 401);
    let err: Value = res.json().await.expect("Failed to parse error body");
    assert_eq!(err["error"], "unauthorized");

    // Step 5: the seeded catalogue is served
    let res = client
        .get(format!("{}/api/sports", base))
        .send()
        .await
        .expect("Failed to list sports");
    assert_eq!(res.status().as_u16(), 200);
    let sports: Value = res.json().await.expect("Failed to parse sports");
    assert!(
        sports
            .as_array()
            .expect("Sports response should be an array")
            .len()
            >= 6
    );
}
