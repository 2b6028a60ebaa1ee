//! Admin server streams over WebSocket.
//!
//! - `GET /main.Admin/Logging`: one JSON `LogFrame` per audited call.
//! - `GET /main.Admin/Statistics?interval_seconds=N`: one JSON `StatSnapshot`
//!   every N seconds.
//!
//! The bus subscription is taken before the upgrade completes so no event
//! published after the call was admitted is missed. It is released when the
//! session ends, whichever side closes first.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{
        rejection::QueryRejection, ws::Message, ws::WebSocket, ws::WebSocketUpgrade, Query,
        State,
    },
    response::Response,
    Extension,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::Instrument;

use gatekeeper_core::error::{GatekeeperError, Result};
use gatekeeper_core::protocol::StatSnapshot;

use crate::app_state::AppState;
use crate::context::CallContext;
use crate::realtime::{Feed, Subscription, WindowAggregator};

use super::error_response;

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub interval_seconds: u64,
}

/// Something that produces encoded frames for one stream session.
#[async_trait]
trait FrameSource: Send {
    /// `None` ends the session.
    async fn next_frame(&mut self) -> Option<Result<String>>;
}

struct LogFrames {
    sub: Subscription,
    host: Arc<str>,
}

#[async_trait]
impl FrameSource for LogFrames {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        let ev = self.sub.recv().await?;
        Some(encode(&ev.to_log_frame(&self.host)))
    }
}

struct StatFrames {
    rx: mpsc::Receiver<StatSnapshot>,
}

#[async_trait]
impl FrameSource for StatFrames {
    async fn next_frame(&mut self) -> Option<Result<String>> {
        let snap = self.rx.recv().await?;
        Some(encode(&snap))
    }
}

fn encode<T: serde::Serialize>(v: &T) -> Result<String> {
    serde_json::to_string(v)
        .map_err(|e| GatekeeperError::Internal(format!("json encode failed: {e}")))
}

// --------------------
// Entry
// --------------------
pub async fn logging(
    State(app): State<AppState>,
    Extension(call): Extension<CallContext>,
    ws: WebSocketUpgrade,
) -> Response {
    let source = LogFrames {
        sub: app.log_bus().subscribe(),
        host: app.reported_host(),
    };
    ws.on_upgrade(move |socket| run_session(app, call, Feed::Log, source, socket))
}

pub async fn statistics(
    State(app): State<AppState>,
    Extension(call): Extension<CallContext>,
    query: std::result::Result<Query<StatsQuery>, QueryRejection>,
    ws: WebSocketUpgrade,
) -> Response {
    let Query(q) = match query {
        Ok(q) => q,
        Err(e) => {
            return error_response(&GatekeeperError::BadRequest(format!(
                "interval_seconds: {}",
                e.body_text()
            )))
        }
    };
    let agg = match WindowAggregator::new(q.interval_seconds) {
        Ok(agg) => agg,
        Err(e) => return error_response(&e),
    };
    let source = StatFrames {
        rx: agg.spawn(app.stat_bus().subscribe()),
    };
    ws.on_upgrade(move |socket| run_session(app, call, Feed::Stat, source, socket))
}

// --------------------
// Core session loop
// --------------------
async fn run_session<S: FrameSource>(
    app: AppState,
    call: CallContext,
    feed: Feed,
    mut source: S,
    socket: WebSocket,
) {
    let span = tracing::info_span!("admin_stream", feed = %feed, consumer = %call.consumer());

    async move {
        let labels = [("feed", feed.as_str())];
        app.metrics().stream_sessions.inc(&labels);
        tracing::info!("stream opened");

        let (mut ws_tx, mut ws_rx) = socket.split();

        let ping_every = Duration::from_millis(app.cfg().gateway.ping_interval_ms);
        let mut ping_tick = tokio::time::interval_at(
            tokio::time::Instant::now() + ping_every,
            ping_every,
        );
        ping_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // outbound frames
                frame = source.next_frame() => {
                    match frame {
                        Some(Ok(text)) => {
                            if ws_tx.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "dropping stream");
                            break;
                        }
                        // feed closed (server shutdown or eviction)
                        None => break,
                    }
                }

                // inbound: only close/disconnect matters on a server stream
                incoming = ws_rx.next() => {
                    match incoming {
                        Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                        Some(Ok(_)) => {}
                    }
                }

                _ = ping_tick.tick() => {
                    if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }

        let _ = ws_tx.send(Message::Close(None)).await;
        drop(source);
        app.metrics().stream_sessions.dec(&labels);
        tracing::info!("stream closed");
    }
    .instrument(span)
    .await
}
