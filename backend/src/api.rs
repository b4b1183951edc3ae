use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use shared::protocol::{SpectatableGame, Stake, WireMove};
use std::sync::Arc;

use draughts_engine::{
    DrawOffer, GameOutcome, Move, ParticipantId, SessionEvent, SessionId, SessionSnapshot,
};

use crate::error::{RelayError, RelayResult};
use crate::relay::{Relay, SessionView};
use crate::ws;

pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", get(get_session))
        .route("/sessions/{id}/moves", post(submit_move))
        .route("/sessions/{id}/resign", post(resign))
        .route("/sessions/{id}/draw/offer", post(offer_draw))
        .route("/sessions/{id}/draw/accept", post(accept_draw))
        .route("/participants/online", get(online_players))
        .route("/participants/{id}/disconnect", post(disconnect))
        .route("/lobby/search", post(search))
        .route("/lobby/cancel", post(cancel_search))
        .route("/lobby/rooms", post(create_room))
        .route("/lobby/rooms/join", post(join_room))
        .route("/lobby/spectatable", post(spectatable_games))
        .route("/ws/{participant}", get(ws::ws_handler))
        .with_state(relay)
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), Json(body)).into_response()
    }
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub red: ParticipantId,
    pub white: ParticipantId,
    #[serde(default)]
    pub stake: Option<Stake>,
}

#[derive(Deserialize)]
pub struct SubmitMoveRequest {
    pub participant: ParticipantId,
    #[serde(rename = "move")]
    pub mv: WireMove,
}

#[derive(Deserialize)]
pub struct ParticipantRequest {
    pub participant: ParticipantId,
}

#[derive(Deserialize)]
pub struct LobbyRequest {
    pub participant: ParticipantId,
    #[serde(default)]
    pub stake: Option<Stake>,
}

#[derive(Deserialize)]
pub struct JoinRoomRequest {
    pub participant: ParticipantId,
    pub code: String,
}

#[derive(Deserialize)]
pub struct SpectatableRequest {
    pub friends: Vec<ParticipantId>,
}

#[derive(Serialize)]
pub struct OnlinePlayersResponse {
    pub players: Vec<ParticipantId>,
}

#[derive(Serialize)]
pub struct SpectatableResponse {
    pub games: Vec<SpectatableGame>,
}

#[derive(Serialize)]
pub struct DisconnectResponse {
    pub outcome: Option<GameOutcome>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SearchResponse {
    Queued,
    Matched { session: SessionSnapshot },
}

#[derive(Serialize)]
pub struct CancelSearchResponse {
    pub cancelled: bool,
}

#[derive(Serialize)]
pub struct CreateRoomResponse {
    pub room_code: String,
}

async fn create_session(
    State(relay): State<Arc<Relay>>,
    Json(payload): Json<CreateSessionRequest>,
) -> RelayResult<(StatusCode, Json<SessionSnapshot>)> {
    let snapshot = relay.create_session(&payload.red, &payload.white, payload.stake)?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn get_session(
    State(relay): State<Arc<Relay>>,
    Path(id): Path<SessionId>,
) -> RelayResult<Json<SessionView>> {
    relay.session_view(id).map(Json)
}

async fn submit_move(
    State(relay): State<Arc<Relay>>,
    Path(id): Path<SessionId>,
    Json(payload): Json<SubmitMoveRequest>,
) -> RelayResult<Json<SessionEvent>> {
    let mv = Move::try_from(payload.mv)?;
    relay.submit_move(id, &payload.participant, &mv).map(Json)
}

async fn resign(
    State(relay): State<Arc<Relay>>,
    Path(id): Path<SessionId>,
    Json(payload): Json<ParticipantRequest>,
) -> RelayResult<Json<GameOutcome>> {
    relay.resign(id, &payload.participant).map(Json)
}

async fn offer_draw(
    State(relay): State<Arc<Relay>>,
    Path(id): Path<SessionId>,
    Json(payload): Json<ParticipantRequest>,
) -> RelayResult<Json<DrawOffer>> {
    relay.offer_draw(id, &payload.participant).map(Json)
}

async fn accept_draw(
    State(relay): State<Arc<Relay>>,
    Path(id): Path<SessionId>,
    Json(payload): Json<ParticipantRequest>,
) -> RelayResult<Json<GameOutcome>> {
    relay.accept_draw(id, &payload.participant).map(Json)
}

async fn disconnect(
    State(relay): State<Arc<Relay>>,
    Path(participant): Path<String>,
) -> Json<DisconnectResponse> {
    let outcome = relay.disconnect(&ParticipantId::from(participant));
    Json(DisconnectResponse { outcome })
}

async fn search(
    State(relay): State<Arc<Relay>>,
    Json(payload): Json<LobbyRequest>,
) -> RelayResult<Json<SearchResponse>> {
    let response = match relay.search(&payload.participant, payload.stake)? {
        Some(session) => SearchResponse::Matched { session },
        None => SearchResponse::Queued,
    };
    Ok(Json(response))
}

async fn cancel_search(
    State(relay): State<Arc<Relay>>,
    Json(payload): Json<LobbyRequest>,
) -> Json<CancelSearchResponse> {
    let cancelled = relay.cancel_search(&payload.participant, payload.stake);
    Json(CancelSearchResponse { cancelled })
}

async fn create_room(
    State(relay): State<Arc<Relay>>,
    Json(payload): Json<LobbyRequest>,
) -> RelayResult<Json<CreateRoomResponse>> {
    let room_code = relay.create_room(&payload.participant, payload.stake)?;
    Ok(Json(CreateRoomResponse { room_code }))
}

async fn join_room(
    State(relay): State<Arc<Relay>>,
    Json(payload): Json<JoinRoomRequest>,
) -> RelayResult<Json<SessionSnapshot>> {
    relay
        .join_room(&payload.participant, &payload.code)
        .map(Json)
}

async fn online_players(State(relay): State<Arc<Relay>>) -> Json<OnlinePlayersResponse> {
    Json(OnlinePlayersResponse {
        players: relay.online_players(None),
    })
}

async fn spectatable_games(
    State(relay): State<Arc<Relay>>,
    Json(payload): Json<SpectatableRequest>,
) -> Json<SpectatableResponse> {
    Json(SpectatableResponse {
        games: relay.spectatable_games(&payload.friends),
    })
}
