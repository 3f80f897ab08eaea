//! WebSocket endpoint for live trace streaming and control messages.

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use serde::Serialize;

use pv_protocol::Welcome;

use crate::control;
use crate::hub::Subscription;
use crate::state::AppState;

/// GET / and GET /ws: upgrade to a subscriber connection.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let Subscription { id, mut rx } = state.hub.register().await;
    tracing::info!(subscriber = %id, "subscriber connected");

    if send_json(&mut socket, &Welcome::connected()).await.is_ok() {
        loop {
            tokio::select! {
                // Forward hub broadcasts to this client.
                outbound = rx.recv() => {
                    match outbound {
                        Some(text) => {
                            if socket.send(Message::Text(text)).await.is_err() {
                                break; // Client disconnected
                            }
                        }
                        None => break, // Unregistered
                    }
                }
                // Handle control messages from the client.
                msg = socket.recv() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            if !reply(&mut socket, &state, text.as_str()).await {
                                break;
                            }
                        }
                        Some(Ok(Message::Binary(bytes))) => match std::str::from_utf8(&bytes) {
                            Ok(text) => {
                                if !reply(&mut socket, &state, text).await {
                                    break;
                                }
                            }
                            Err(_) => {
                                tracing::warn!(subscriber = %id, "non-UTF-8 control frame, discarding");
                            }
                        },
                        Some(Ok(Message::Ping(data))) => {
                            if socket.send(Message::Pong(data)).await.is_err() {
                                break;
                            }
                        }
                        Some(Ok(Message::Pong(_))) => {}
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Err(e)) => {
                            tracing::debug!(subscriber = %id, error = %e, "WebSocket receive error");
                            break;
                        }
                    }
                }
            }
        }
    }

    state.hub.unregister(id).await;
    tracing::info!(subscriber = %id, "subscriber disconnected");
}

/// Handle one control frame. Returns false if the reply could not be sent.
async fn reply(socket: &mut WebSocket, state: &AppState, raw: &str) -> bool {
    match control::handle_message(state, raw).await {
        Some(response) => send_json(socket, &response).await.is_ok(),
        None => true,
    }
}

async fn send_json<T: Serialize>(socket: &mut WebSocket, message: &T) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            tracing::error!("failed to serialize reply: {e}");
            return Ok(());
        }
    };
    socket.send(Message::Text(json.into())).await
}
