// SPDX-FileCopyrightText: 2026 Turnstile Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Receive-only WebSocket channels bound to notification hub topics.
//!
//! Server -> Client (JSON, tagged by `type`):
//! ```json
//! {"type": "ahead", "ticket_number": "A-4", "service_name": "...", "customer_name": "..."}
//! {"type": "ticket_served", "ticket_id": "...", "ticket_number": "A-4", "display_number": "A-4", "counter_number": 2}
//! {"type": "board", "revision": 7, "entries": [{"ticket_number": "A-4", "counter_number": 2, "status": "in_progress"}]}
//! ```
//!
//! Client frames are ignored apart from close.

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse, Response},
};
use futures::{SinkExt, StreamExt};
use turnstile_core::{TicketId, TurnstileError};
use turnstile_hub::{Subscription, Topic};

use crate::error::ApiError;
use crate::server::GatewayState;

/// GET /ws/ahead
pub async fn ahead(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    let subscription = state.queue.hub().subscribe(Topic::Ahead);
    ws.on_upgrade(move |socket| forward(socket, subscription))
}

/// GET /ws/tickets/{id}
pub async fn ticket(
    ws: WebSocketUpgrade,
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = id.parse::<TicketId>() else {
        return ApiError::from(TurnstileError::not_found("ticket", id)).into_response();
    };
    let subscription = state.queue.hub().subscribe(Topic::Ticket(id));
    ws.on_upgrade(move |socket| forward(socket, subscription))
}

/// GET /ws/in-progress
///
/// The first frame is the current board.
pub async fn in_progress(ws: WebSocketUpgrade, State(state): State<GatewayState>) -> Response {
    let seed = match state.queue.board().await {
        Ok(board) => Some(board),
        Err(e) => {
            tracing::warn!(error = %e, "could not read board for new subscriber");
            None
        }
    };
    let subscription = state.queue.hub().subscribe_board(seed);
    ws.on_upgrade(move |socket| forward(socket, subscription))
}

/// Pump hub payloads into the socket until either side goes away.
///
/// Dropping the subscription on return leaves the topic.
async fn forward(socket: WebSocket, mut subscription: Subscription) {
    let (mut sink, mut stream) = socket.split();
    let topic = *subscription.topic();
    tracing::debug!(%topic, "websocket subscriber connected");

    loop {
        tokio::select! {
            payload = subscription.recv() => {
                let Some(payload) = payload else { break };
                if sink.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
            }
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    let _ = sink.close().await;
    tracing::debug!(%topic, "websocket subscriber disconnected");
}
