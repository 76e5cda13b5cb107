//! WebSocket upgrade handlers for the device and listener endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use voxrelay_realtime::connection::authenticator::AuthenticatedConnection;
use voxrelay_realtime::connection::handle::{CloseReason, ConnectionHandle, Outbound};
use voxrelay_realtime::message::InboundMessage;
use voxrelay_realtime::{FrameRouter, Role};

use crate::dto::request::ConnectQuery;
use crate::error::ApiError;
use crate::state::AppState;

/// How long the writer gets to flush its close frame after the reader ends.
const WRITER_GRACE: Duration = Duration::from_secs(2);

/// GET /ws/device?key={key}&token={token} (producer upgrade)
pub async fn device_upgrade(
    State(state): State<AppState>,
    Query(query): Query<ConnectQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    upgrade(state, query, ws, Role::Producer)
}

/// GET /ws/listen?key={key}&token={token} (subscriber upgrade)
pub async fn listen_upgrade(
    State(state): State<AppState>,
    Query(query): Query<ConnectQuery>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    upgrade(state, query, ws, Role::Subscriber)
}

/// Authenticates before upgrading; a failure never reaches the registry.
fn upgrade(
    state: AppState,
    query: ConnectQuery,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    role: Role,
) -> Result<Response, ApiError> {
    let auth = state
        .realtime
        .authenticator
        .authenticate(query.key.as_deref(), query.token.as_deref(), role)
        .inspect_err(|e| warn!(role = %role, error = %e, "Rejected WebSocket connection"))?;

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let max_message_size = state.realtime.config.max_message_size;
    Ok(ws
        .max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_ws_connection(state, auth, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, auth: AuthenticatedConnection, socket: WebSocket) {
    let (ws_tx, ws_rx) = socket.split();
    let connections = state.realtime.connections.clone();

    let (handle, outbound_rx) = connections.open(auth);
    info!(
        conn_id = %handle.id,
        device_key = %handle.device_key,
        role = %handle.role,
        "WebSocket connection established"
    );

    let mut writer = tokio::spawn(write_loop(handle.clone(), ws_tx, outbound_rx));

    read_loop(&state.realtime.router, &handle, ws_rx).await;

    // Registry references go first so no fan-out targets this connection again.
    connections.close(&handle);

    if tokio::time::timeout(WRITER_GRACE, &mut writer).await.is_err() {
        writer.abort();
    }

    info!(
        conn_id = %handle.id,
        device_key = %handle.device_key,
        role = %handle.role,
        "WebSocket connection closed"
    );
}

/// Feeds inbound messages to the router until the peer leaves or the
/// server closes the connection.
async fn read_loop(router: &FrameRouter, handle: &ConnectionHandle, mut ws_rx: SplitStream<WebSocket>) {
    loop {
        let next = tokio::select! {
            _ = handle.closed() => break,
            next = ws_rx.next() => next,
        };

        match next {
            Some(Ok(Message::Binary(data))) => {
                router.route(handle, InboundMessage::Binary(data));
            }
            Some(Ok(Message::Text(text))) => {
                router.route(handle, InboundMessage::Text(text.as_str().to_owned()));
            }
            Some(Ok(Message::Close(frame))) => {
                debug!(conn_id = %handle.id, ?frame, "Peer closed connection");
                break;
            }
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => {}
            Some(Err(e)) => {
                debug!(conn_id = %handle.id, error = %e, "WebSocket read error");
                break;
            }
            None => break,
        }
    }
}

/// Drains the outbound queue into the socket, then sends a close frame.
async fn write_loop(
    handle: Arc<ConnectionHandle>,
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut outbound_rx: mpsc::Receiver<Outbound>,
) {
    loop {
        let msg = tokio::select! {
            biased;
            _ = handle.closed() => break,
            msg = outbound_rx.recv() => msg,
        };
        let Some(msg) = msg else { break };

        if let Err(e) = ws_tx.send(to_ws_message(msg)).await {
            debug!(conn_id = %handle.id, error = %e, "WebSocket write error");
            handle.close(CloseReason::normal());
            return;
        }
    }

    let reason = handle
        .close_reason()
        .cloned()
        .unwrap_or_else(CloseReason::normal);
    let _ = ws_tx
        .send(Message::Close(Some(CloseFrame {
            code: reason.code,
            reason: reason.reason.into(),
        })))
        .await;
}

fn to_ws_message(msg: Outbound) -> Message {
    match msg {
        Outbound::Frame(frame) => Message::Binary(frame),
        Outbound::Text(text) => Message::Text(text.into()),
        Outbound::Ping => Message::Ping(Bytes::new()),
    }
}
