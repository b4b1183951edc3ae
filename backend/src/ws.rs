//! WebSocket transport
//!
//! One socket per participant. Outgoing packets come from the participant's
//! outbox in the relay; incoming text frames are JSON `Packet`s handed to
//! [`dispatch`]. Closing the socket is a disconnection notice.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use shared::protocol::{GameMessage, LobbyMessage, Packet};
use std::sync::Arc;
use tracing::{debug, warn};

use draughts_engine::{Move, ParticipantId};

use crate::error::{RelayError, RelayResult};
use crate::relay::Relay;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(participant): Path<String>,
    State(relay): State<Arc<Relay>>,
) -> impl IntoResponse {
    let participant = ParticipantId::from(participant);
    ws.on_upgrade(move |socket| handle_socket(socket, relay, participant))
}

async fn handle_socket(socket: WebSocket, relay: Arc<Relay>, participant: ParticipantId) {
    let (connection_id, mut outbox) = relay.connect(&participant);
    let (mut sender, mut receiver) = socket.split();

    let mut send_task = tokio::spawn(async move {
        while let Some(packet) = outbox.recv().await {
            let text = match serde_json::to_string(&packet) {
                Ok(text) => text,
                Err(err) => {
                    warn!("[RELAY] Failed to encode packet: {}", err);
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    let recv_relay = relay.clone();
    let recv_participant = participant.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(message)) = receiver.next().await {
            let text = match message {
                Message::Text(text) => text,
                Message::Close(_) => break,
                _ => continue,
            };

            let reply = match serde_json::from_str::<Packet>(text.as_str()) {
                Ok(packet) => dispatch(&recv_relay, &recv_participant, packet)
                    .unwrap_or_else(|err| Some(error_packet(&err))),
                Err(err) => {
                    debug!("[RELAY] Malformed packet from {}: {}", recv_participant, err);
                    Some(Packet::Error {
                        kind: "malformed_packet".to_string(),
                        message: format!("Invalid message: {}", err),
                    })
                }
            };
            if let Some(reply) = reply {
                recv_relay.send(&recv_participant, reply);
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    relay.release(&participant, connection_id);
}

pub fn error_packet(err: &RelayError) -> Packet {
    Packet::Error {
        kind: err.kind().to_string(),
        message: err.to_string(),
    }
}

/// Apply one client packet on behalf of `participant`
///
/// Broadcasts (game started, move made, ...) are sent by the relay itself.
/// The returned packet, if any, is a direct reply for the requester only.
pub fn dispatch(
    relay: &Relay,
    participant: &ParticipantId,
    packet: Packet,
) -> RelayResult<Option<Packet>> {
    match packet {
        Packet::Lobby(msg) => dispatch_lobby(relay, participant, msg),
        Packet::Game(msg) => dispatch_game(relay, participant, msg),
        Packet::Error { .. } => Err(RelayError::UnexpectedPacket("Error")),
    }
}

fn dispatch_lobby(
    relay: &Relay,
    participant: &ParticipantId,
    msg: LobbyMessage,
) -> RelayResult<Option<Packet>> {
    let reply = match msg {
        LobbyMessage::Search { stake } => relay
            .search(participant, stake)?
            .is_none()
            .then(|| LobbyMessage::Queued { stake }),
        LobbyMessage::CancelSearch { stake } => {
            relay.cancel_search(participant, stake);
            None
        }
        LobbyMessage::CreateRoom { stake } => Some(LobbyMessage::RoomCreated {
            code: relay.create_room(participant, stake)?,
        }),
        LobbyMessage::JoinRoom { code } => {
            relay.join_room(participant, &code)?;
            None
        }
        LobbyMessage::Invite { friend, stake } => Some(LobbyMessage::InvitationSent {
            invitation_id: relay.invite(participant, &friend, stake)?.id,
        }),
        LobbyMessage::AcceptInvitation { invitation_id } => {
            relay.accept_invitation(invitation_id, participant)?;
            None
        }
        LobbyMessage::DeclineInvitation { invitation_id } => {
            relay.decline_invitation(invitation_id, participant)?;
            None
        }
        LobbyMessage::Queued { .. }
        | LobbyMessage::RoomCreated { .. }
        | LobbyMessage::InvitationSent { .. }
        | LobbyMessage::InvitationReceived { .. }
        | LobbyMessage::InvitationDeclined { .. }
        | LobbyMessage::GameStarted { .. }
        | LobbyMessage::OnlinePlayers { .. } => return Err(RelayError::UnexpectedPacket("Lobby")),
    };
    Ok(reply.map(Packet::from))
}

fn dispatch_game(
    relay: &Relay,
    participant: &ParticipantId,
    msg: GameMessage,
) -> RelayResult<Option<Packet>> {
    match msg {
        GameMessage::SubmitMove { session_id, mv } => {
            let mv = Move::try_from(mv)?;
            relay.submit_move(session_id, participant, &mv)?;
        }
        GameMessage::Resign { session_id } => {
            relay.resign(session_id, participant)?;
        }
        GameMessage::OfferDraw { session_id } => {
            relay.offer_draw(session_id, participant)?;
        }
        GameMessage::AcceptDraw { session_id } => {
            relay.accept_draw(session_id, participant)?;
        }
        GameMessage::RequestSpectatable { friends } => {
            let games = relay.spectatable_games(&friends);
            return Ok(Some(GameMessage::SpectatableGames { games }.into()));
        }
        // SpectatorState is queued by the relay before any later broadcast
        GameMessage::Spectate { session_id } => {
            relay.spectate(session_id, participant)?;
        }
        GameMessage::MoveMade { .. }
        | GameMessage::GameEnded { .. }
        | GameMessage::DrawOffered { .. }
        | GameMessage::SpectatableGames { .. }
        | GameMessage::SpectatorState { .. } => return Err(RelayError::UnexpectedPacket("Game")),
    }
    Ok(None)
}
