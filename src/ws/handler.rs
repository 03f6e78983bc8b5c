//! WebSocket upgrade handler

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::util::rate_limit::PlayerRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let conn_id = Uuid::new_v4();
    info!(%conn_id, "New WebSocket connection");

    let (mut ws_sink, mut ws_stream) = socket.split();

    // Register with matchmaking to get the outbound channel
    let mut outbox = state.matchmaking.register(conn_id);

    // Spawn writer task: service messages -> WebSocket
    let writer_conn_id = conn_id;
    let writer_handle = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            if let Err(e) = send_msg(&mut ws_sink, &msg).await {
                debug!(conn_id = %writer_conn_id, error = %e, "WebSocket send failed");
                break;
            }
        }
    });

    // Reader loop: WebSocket -> matchmaking service
    let rate_limiter = PlayerRateLimiter::new();
    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => {
                if !rate_limiter.check_input() {
                    warn!(%conn_id, "Rate limited input message");
                    continue;
                }

                match serde_json::from_str::<ClientMsg>(&text) {
                    Ok(ClientMsg::FindMatch) => {
                        state.matchmaking.find_match(conn_id).await;
                    }
                    Ok(ClientMsg::UpdateDirection {
                        direction,
                        match_id,
                        player_num,
                    }) => {
                        state
                            .matchmaking
                            .update_direction(conn_id, match_id, player_num, direction)
                            .await;
                    }
                    Err(e) => {
                        warn!(%conn_id, error = %e, "Failed to parse client message");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                warn!(%conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) => {
                debug!(%conn_id, "Received ping");
            }
            Ok(Message::Pong(_)) => {
                debug!(%conn_id, "Received pong");
            }
            Ok(Message::Close(_)) => {
                info!(%conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(%conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }

    // Session lifecycle: notify the peer and tear down bookkeeping
    state.matchmaking.disconnect(conn_id).await;

    // Abort writer task
    writer_handle.abort();

    info!(%conn_id, "WebSocket connection closed");
}

/// Send a message over WebSocket
async fn send_msg(
    sink: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMsg,
) -> Result<(), String> {
    let json = serde_json::to_string(msg).map_err(|e| e.to_string())?;
    sink.send(Message::Text(json))
        .await
        .map_err(|e| e.to_string())
}
