use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use futures::{Sink, SinkExt, Stream, StreamExt};
use log::{error, info, warn};
use tokio::time::{self, MissedTickBehavior};
use tower_http::cors::CorsLayer;

use crate::aggregator::Aggregator;
use crate::error::{DashError, Result};
use crate::models::{DashResponse, ErrorBody};

/// State shared by every connection. Nothing in it is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    aggregator: Arc<Aggregator>,
    interval: Duration,
}

impl AppState {
    pub fn new(aggregator: Aggregator, interval: Duration) -> Self {
        Self {
            aggregator: Arc::new(aggregator),
            interval,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/dash", get(dash))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}/dash", listener.local_addr()?);

    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Upgrade requests get the push stream, plain requests a single snapshot.
async fn dash(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: std::result::Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if !headers.contains_key(header::UPGRADE) {
        return poll_builds(&state).await;
    }

    match ws {
        Ok(ws) => ws
            .on_failed_upgrade(|e: axum::Error| warn!("WebSocket upgrade failed: {e}"))
            .on_upgrade(move |socket| stream_builds(socket, state)),
        Err(rejection) => {
            warn!("WebSocket upgrade rejected: {rejection}");
            rejection.into_response()
        }
    }
}

async fn poll_builds(state: &AppState) -> Response {
    if !state.aggregator.has_token() {
        warn!("Rejecting request: {}", DashError::Auth);
        return (StatusCode::UNAUTHORIZED, DashError::Auth.to_string()).into_response();
    }

    let builds = match state.aggregator.aggregate().await {
        Ok(builds) => builds,
        Err(e) => {
            error!("Aggregation failed: {e}");
            return (status_for(&e), Json(ErrorBody::new(&e))).into_response();
        }
    };

    match serde_json::to_string_pretty(&DashResponse { builds }) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(e)),
        )
            .into_response(),
    }
}

fn status_for(err: &DashError) -> StatusCode {
    match err {
        DashError::Auth => StatusCode::UNAUTHORIZED,
        DashError::NotFound(_) => StatusCode::NOT_FOUND,
        DashError::Api(_) | DashError::Transport(_) | DashError::Decode(_) => {
            StatusCode::BAD_GATEWAY
        }
        DashError::Config(_) | DashError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn stream_builds(socket: WebSocket, state: AppState) {
    let (tx, rx) = socket.split();
    push_builds(&state.aggregator, state.interval, tx, rx).await;
}

/// Pushes one frame per cycle until the client goes away.
///
/// The inbound half is only watched for Close, end of stream, or errors, so
/// the loop ends at the next suspension point after a disconnect.
pub(crate) async fn push_builds<Tx, Rx>(
    aggregator: &Aggregator,
    period: Duration,
    mut tx: Tx,
    mut rx: Rx,
) where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = std::result::Result<Message, axum::Error>> + Unpin,
{
    if !aggregator.has_token() {
        let reason = DashError::Auth.to_string();
        warn!("Refusing stream: {reason}");

        if let Err(e) = tx.send(Message::Text(reason.clone())).await {
            warn!("Write: {e}");
            return;
        }
        let close = CloseFrame {
            code: close_code::POLICY,
            reason: reason.into(),
        };
        if let Err(e) = tx.send(Message::Close(Some(close))).await {
            warn!("Write: {e}");
        }
        return;
    }

    let mut ticker = time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                info!("Sending current builds. . .");
                let frame = cycle_frame(aggregator).await;
                if let Err(e) = tx.send(Message::Text(frame)).await {
                    warn!("Write failed, closing stream: {e}");
                    break;
                }
            }
            msg = rx.next() => match msg {
                Some(Ok(Message::Close(_))) | None => {
                    info!("Dashboard client disconnected");
                    break;
                }
                Some(Err(e)) => {
                    warn!("WebSocket error: {e}");
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }
}

/// One cycle rendered as a text frame; a failed cycle becomes an error frame.
async fn cycle_frame(aggregator: &Aggregator) -> String {
    let frame = match aggregator.aggregate().await {
        Ok(builds) => serde_json::to_string(&DashResponse { builds }),
        Err(e) => {
            error!("Aggregation failed: {e}");
            serde_json::to_string(&ErrorBody::new(e))
        }
    };

    frame.unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}
