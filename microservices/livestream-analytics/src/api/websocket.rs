//! WebSocket push channel for live stream stats
//!
//! One loop per subscriber: every tick it fetches the current snapshot
//! (local cache first) and pushes it as a JSON frame. There is no
//! backpressure beyond the transport itself - a failed send ends the loop.

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::{Path, State},
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

use super::rest::AppState;
use crate::stats::StreamSnapshot;

pub const PUSH_INTERVAL: Duration = Duration::from_secs(1);

/// Server-to-client push frames
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsMessage {
    Connected { connection_id: String },
    Stats { stats: StreamSnapshot },
}

/// WebSocket upgrade handler
pub async fn ws_handler(
    State(state): State<AppState>,
    Path(stream_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| push_stats(socket, state, stream_id))
}

/// Push the latest snapshot to one subscriber until it disconnects.
async fn push_stats(socket: WebSocket, state: AppState, stream_id: String) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = Uuid::new_v4().to_string();

    info!(stream_id = %stream_id, connection_id = %connection_id, "Stats subscriber connected");

    let welcome = WsMessage::Connected {
        connection_id: connection_id.clone(),
    };
    if let Ok(json) = serde_json::to_string(&welcome) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            return;
        }
    }

    let mut ticker = tokio::time::interval(PUSH_INTERVAL);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let snapshot = match state.stats.get_stats(&stream_id).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        warn!(stream_id = %stream_id, error = %e, "Snapshot fetch failed, skipping tick");
                        continue;
                    }
                };
                let Ok(json) = serde_json::to_string(&WsMessage::Stats { stats: snapshot }) else {
                    continue;
                };
                if sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    info!(stream_id = %stream_id, connection_id = %connection_id, "Stats subscriber disconnected");
}
