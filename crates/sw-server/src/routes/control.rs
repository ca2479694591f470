//! Real-time playback control over WebSocket.
//!
//! Frames are JSON envelopes `{"event": ..., "data": {...}}`. Clients send
//! `control` and `join_room`; the server pushes `control` (relayed from other
//! participants) and `joined` (acknowledging a room join).

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use sw_core::control::{ClientEvent, ControlHub};
use sw_core::ParticipantId;

use crate::context::AppContext;

/// GET /ws
pub async fn control_ws(ws: WebSocketUpgrade, State(ctx): State<AppContext>) -> impl IntoResponse {
    let hub = Arc::clone(&ctx.control);
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: Arc<ControlHub>) {
    let (mut sender, mut receiver) = socket.split();
    let (id, mut events) = hub.connect();

    loop {
        tokio::select! {
            msg = receiver.next() => match msg {
                Some(Ok(Message::Text(text))) => handle_frame(&hub, id, text.as_str()),
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                _ => {}
            },
            Some(event) = events.recv() => {
                let json = match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        tracing::warn!("Failed to encode control event: {e}");
                        continue;
                    }
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    hub.disconnect(id);
}

fn handle_frame(hub: &ControlHub, id: ParticipantId, text: &str) {
    match serde_json::from_str::<ClientEvent>(text) {
        Ok(ClientEvent::Control(message)) => {
            tracing::info!("Received control action: {}", message.action);
            let room = message.room().to_string();
            let delivered = hub.broadcast(id, message);
            tracing::debug!(participant = %id, room = %room, delivered, "Control relayed");
        }
        Ok(ClientEvent::JoinRoom(join)) => {
            hub.join(id, join.room.as_deref());
        }
        Err(e) => {
            tracing::warn!(participant = %id, "Ignoring malformed control frame: {e}");
        }
    }
}
