//! Backend API Integration Tests
//!
//! Tests for the Axum HTTP endpoints using Router::oneshot pattern.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use backend::{api, config::ServerConfig, relay::Relay};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Helper to create test router over a shared relay
fn test_router() -> (Router, Arc<Relay>) {
    let relay = Arc::new(Relay::new(&ServerConfig::default()));
    (api::router(relay.clone()), relay)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, body)
}

/// Creates alice (red) vs bob (white) and returns the session id
async fn start_game(app: &Router) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/sessions",
        Some(json!({ "red": "alice", "white": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

fn opening_move(participant: &str) -> Value {
    json!({
        "participant": participant,
        "move": { "origin": [6, 1], "destination": [5, 0], "captures": [] }
    })
}

// ============================================================================
// Sessions
// ============================================================================

#[tokio::test]
async fn test_create_session_returns_initial_position() {
    let (app, _) = test_router();

    let (status, body) = send(
        &app,
        "POST",
        "/sessions",
        Some(json!({ "red": "alice", "white": "bob" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["red"], "alice");
    assert_eq!(body["white"], "bob");
    assert_eq!(body["to_move"], "red");
    assert_eq!(body["status"], "active");
    assert_eq!(body["moves"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_session_against_self_rejected() {
    let (app, _) = test_router();

    let (status, body) = send(
        &app,
        "POST",
        "/sessions",
        Some(json!({ "red": "alice", "white": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "self_pairing");
}

#[tokio::test]
async fn test_get_session_lists_legal_moves() {
    let (app, _) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(&app, "GET", &format!("/sessions/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session"]["id"], id.as_str());
    assert_eq!(body["legal_moves"].as_array().unwrap().len(), 9);
    assert!(body["stake"].is_null());
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (app, _) = test_router();
    let id = uuid::Uuid::new_v4();

    let (status, body) = send(&app, "GET", &format!("/sessions/{id}"), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");
}

// ============================================================================
// Moves
// ============================================================================

#[tokio::test]
async fn test_submit_move_flips_turn() {
    let (app, _) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/moves"),
        Some(opening_move("alice")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["continued"]["to_move"], "white");
    assert_eq!(body["continued"]["move"]["destination"], json!([5, 0]));

    let (_, body) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(body["session"]["moves"].as_array().unwrap().len(), 1);
    assert_eq!(body["session"]["moves"][0]["side"], "red");
}

#[tokio::test]
async fn test_wrong_turn_is_conflict() {
    let (app, _) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/moves"),
        Some(json!({
            "participant": "bob",
            "move": { "origin": [3, 0], "destination": [4, 1] }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "wrong_turn");
}

#[tokio::test]
async fn test_illegal_move_is_unprocessable() {
    let (app, _) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/moves"),
        Some(json!({
            "participant": "alice",
            "move": { "origin": [6, 1], "destination": [4, 3], "captures": [] }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "illegal_move");
}

#[tokio::test]
async fn test_light_square_is_invalid_coordinate() {
    let (app, _) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/moves"),
        Some(json!({
            "participant": "alice",
            "move": { "origin": [6, 1], "destination": [5, 1] }
        })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "invalid_coordinate");
}

#[tokio::test]
async fn test_outsider_is_forbidden() {
    let (app, _) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/moves"),
        Some(opening_move("mallory")),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "not_a_participant");
}

// ============================================================================
// Resignation, draws and disconnects
// ============================================================================

#[tokio::test]
async fn test_resign_ends_and_removes_session() {
    let (app, relay) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/resign"),
        Some(json!({ "participant": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["winner"], "white");
    assert_eq!(body["reason"], "resignation");
    assert!(relay.directory().is_empty());

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/moves"),
        Some(opening_move("alice")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "session_not_found");
}

#[tokio::test]
async fn test_draw_offer_and_accept() {
    let (app, _) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/draw/accept"),
        Some(json!({ "participant": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "no_draw_offer");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/draw/offer"),
        Some(json!({ "participant": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["by"], "red");

    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/draw/accept"),
        Some(json!({ "participant": "bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["winner"].is_null());
    assert_eq!(body["reason"], "draw_agreed");
}

#[tokio::test]
async fn test_crossed_draw_offers_end_game() {
    let (app, relay) = test_router();
    let id = start_game(&app).await;

    send(
        &app,
        "POST",
        &format!("/sessions/{id}/draw/offer"),
        Some(json!({ "participant": "bob" })),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/sessions/{id}/draw/offer"),
        Some(json!({ "participant": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "agreed");
    assert_eq!(body["outcome"]["reason"], "draw_agreed");
    assert!(relay.directory().is_empty());
}

#[tokio::test]
async fn test_disconnect_forfeits_active_session() {
    let (app, relay) = test_router();
    start_game(&app).await;

    let (status, body) = send(&app, "POST", "/participants/bob/disconnect", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["winner"], "red");
    assert_eq!(body["outcome"]["reason"], "disconnect");
    assert!(!relay.directory().is_playing(&"alice".into()));

    let (_, body) = send(&app, "POST", "/participants/bob/disconnect", None).await;
    assert!(body["outcome"].is_null());
}

// ============================================================================
// Lobby
// ============================================================================

#[tokio::test]
async fn test_search_pairs_two_participants() {
    let (app, _) = test_router();
    let stake = json!({ "amount": 100, "currency": "TON" });

    let (status, body) = send(
        &app,
        "POST",
        "/lobby/search",
        Some(json!({ "participant": "alice", "stake": stake })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "queued");

    let (_, body) = send(
        &app,
        "POST",
        "/lobby/search",
        Some(json!({ "participant": "bob", "stake": stake })),
    )
    .await;
    assert_eq!(body["status"], "matched");

    let mut players = vec![
        body["session"]["red"].as_str().unwrap().to_string(),
        body["session"]["white"].as_str().unwrap().to_string(),
    ];
    players.sort();
    assert_eq!(players, vec!["alice", "bob"]);

    let id = body["session"]["id"].as_str().unwrap();
    let (_, body) = send(&app, "GET", &format!("/sessions/{id}"), None).await;
    assert_eq!(body["stake"]["amount"], 100);
}

#[tokio::test]
async fn test_cancel_search() {
    let (app, _) = test_router();

    send(
        &app,
        "POST",
        "/lobby/search",
        Some(json!({ "participant": "alice" })),
    )
    .await;
    let (_, body) = send(
        &app,
        "POST",
        "/lobby/cancel",
        Some(json!({ "participant": "alice" })),
    )
    .await;
    assert_eq!(body["cancelled"], true);

    let (_, body) = send(
        &app,
        "POST",
        "/lobby/search",
        Some(json!({ "participant": "bob" })),
    )
    .await;
    assert_eq!(body["status"], "queued", "alice should no longer be waiting");
}

#[tokio::test]
async fn test_room_code_flow() {
    let (app, _) = test_router();

    let (status, body) = send(
        &app,
        "POST",
        "/lobby/rooms",
        Some(json!({ "participant": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let room_code = body["room_code"].as_str().unwrap().to_string();
    assert_eq!(room_code.len(), 6);

    let (status, body) = send(
        &app,
        "POST",
        "/lobby/rooms/join",
        Some(json!({ "participant": "alice", "code": room_code })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "own_room");

    let (status, body) = send(
        &app,
        "POST",
        "/lobby/rooms/join",
        Some(json!({ "participant": "bob", "code": room_code.to_lowercase() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, body) = send(
        &app,
        "POST",
        "/lobby/rooms/join",
        Some(json!({ "participant": "carol", "code": room_code })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "room_not_found");
}

#[tokio::test]
async fn test_busy_player_cannot_search() {
    let (app, _) = test_router();
    start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/lobby/search",
        Some(json!({ "participant": "alice" })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_in_session");
}

#[tokio::test]
async fn test_online_players_lists_connections() {
    let (app, relay) = test_router();
    let (_, _bob_inbox) = relay.connect(&"bob".into());
    let (_, _alice_inbox) = relay.connect(&"alice".into());

    let (status, body) = send(&app, "GET", "/participants/online", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["players"], json!(["alice", "bob"]));
}

#[tokio::test]
async fn test_spectatable_games_by_friend() {
    let (app, _) = test_router();
    let id = start_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/lobby/spectatable",
        Some(json!({ "friends": ["BOB"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["games"].as_array().unwrap().len(), 1);
    assert_eq!(body["games"][0]["session_id"], id.as_str());
    assert_eq!(body["games"][0]["moves_played"], 0);

    let (_, body) = send(
        &app,
        "POST",
        "/lobby/spectatable",
        Some(json!({ "friends": ["carol"] })),
    )
    .await;
    assert!(body["games"].as_array().unwrap().is_empty());
}
