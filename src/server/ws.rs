//! The `/ws/va-y-ven` publish/subscribe socket.
//!
//! Every connection is both a subscriber and a publisher: text frames of the
//! form `{"route_id": .., "status": ..}` are broadcast to all subscribers,
//! the sender included.

use anyhow::anyhow;
use async_trait::async_trait;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::broadcast::{Connection, ConnectionId, RouteUpdate, StatusReport};
use crate::models::RouteId;
use crate::server::AppContext;

const OUTBOX_CAPACITY: usize = 32;

/// Hands updates to the socket's writer task.
struct SocketConnection {
    outbox: mpsc::Sender<String>,
}

#[async_trait]
impl Connection for SocketConnection {
    async fn send(&self, update: &RouteUpdate) -> anyhow::Result<()> {
        let text = serde_json::to_string(update)?;
        self.outbox
            .send(text)
            .await
            .map_err(|_| anyhow!("connection closed"))
    }
}

pub async fn websocket(ws: WebSocketUpgrade, State(ctx): State<AppContext>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, ctx))
}

async fn handle_socket(socket: WebSocket, ctx: AppContext) {
    let (mut sink, mut stream) = socket.split();
    let (outbox, mut inbox) = mpsc::channel::<String>(OUTBOX_CAPACITY);
    let id = ctx
        .broadcaster
        .subscribe(Arc::new(SocketConnection { outbox }))
        .await;

    let writer = tokio::spawn(async move {
        while let Some(text) = inbox.recv().await {
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_report(&ctx, id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection = id, error = %e, "WebSocket read failed");
                break;
            }
        }
    }

    ctx.broadcaster.unsubscribe(id).await;
    writer.abort();
}

async fn handle_report(ctx: &AppContext, id: ConnectionId, text: &str) {
    match serde_json::from_str::<StatusReport>(text) {
        Ok(report) => {
            ctx.broadcaster
                .publish(RouteId::new(report.route_id), report.status)
                .await;
        }
        Err(e) => warn!(connection = id, error = %e, "Ignoring malformed status report"),
    }
}
