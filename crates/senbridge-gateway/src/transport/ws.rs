//! WebSocket bridge endpoint.
//!
//! Responsibilities:
//! - Upgrade HTTP -> WS with `?target=<widget id>`
//! - Attach the socket to the frame directory under that id, so the gateway
//!   can answer requests coming from it
//! - Post inbound text frames to the host frame (size and target checks first)
//! - Lifecycle: ping/pong + idle timeout, detach on exit

use std::sync::Arc;

use axum::{
    extract::{ws::Message, ws::WebSocket, ws::WebSocketUpgrade, Query, State},
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};

use senbridge_core::error::{BridgeError, Result};

use crate::app_state::AppState;
use crate::channel::MessageTarget;
use crate::transport::codec::{decode, frame_len, spoofs_target, Inbound};

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    pub target: String,
}

/// A remote widget, reachable through its socket's outbound queue.
struct SocketTarget {
    target: Arc<str>,
    tx: mpsc::Sender<Message>,
}

impl MessageTarget for SocketTarget {
    fn post_message(&self, msg: &Value) {
        // Best-effort: a full or closed queue drops the message.
        if self.tx.try_send(Message::Text(msg.to_string())).is_err() {
            debug!(target = %self.target, "outbound queue unavailable; message dropped");
        }
    }
}

/// Detaches the socket from the directory however the session ends.
struct Attachment {
    app: AppState,
    target: Arc<str>,
}

impl Drop for Attachment {
    fn drop(&mut self) {
        self.app.directory().detach(&self.target);
        info!(target = %self.target, "widget detached");
    }
}

fn sys_error_json(code: &str, msg: &str) -> String {
    json!({
        "type": "sys",
        "payload": {
            "code": code,
            "msg": msg
        }
    })
    .to_string()
}

/// The select loop is the queue's only reader, so it must never wait on it.
fn queue_control(out_tx: &mpsc::Sender<Message>, msg: Message, target: &str) {
    if out_tx.try_send(msg).is_err() {
        debug!(target = %target, "outbound queue full; control frame skipped");
    }
}

pub async fn ws_upgrade(
    State(app): State<AppState>,
    ws: WebSocketUpgrade,
    Query(q): Query<WsQuery>,
) -> Response {
    let max = app.cfg().gateway.max_frame_bytes;
    ws.max_message_size(max).on_upgrade(move |socket| {
        let span = tracing::info_span!("bridge_session", target = %q.target);
        async move {
            if let Err(e) = run_session(app, q, socket).await {
                warn!(error = %e, code = e.code().as_str(), "session ended with error");
            }
        }
        .instrument(span)
    })
}

async fn run_session(app: AppState, q: WsQuery, socket: WebSocket) -> Result<()> {
    let target: Arc<str> = Arc::from(q.target.as_str());
    if target.is_empty() || target.contains(char::is_whitespace) {
        return Err(BridgeError::BadRequest("target must be non-empty without whitespace".into()));
    }

    let gw = &app.cfg().gateway;
    let (out_tx, mut out_rx) = mpsc::channel::<Message>(gw.outbound_queue);
    let (mut ws_tx, mut ws_rx) = socket.split();

    if let Err(e) = app.directory().attach(
        target.to_string(),
        Arc::new(SocketTarget {
            target: Arc::clone(&target),
            tx: out_tx.clone(),
        }),
    ) {
        let _ = ws_tx
            .send(Message::Text(sys_error_json(e.code().as_str(), &e.to_string())))
            .await;
        return Err(e);
    }
    let _attachment = Attachment {
        app: app.clone(),
        target: Arc::clone(&target),
    };
    info!(target = %target, "widget attached");

    let max_frame_bytes = gw.max_frame_bytes;
    let mut ping_tick = tokio::time::interval(Duration::from_millis(gw.ping_interval_ms));
    ping_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    let idle_timeout = Duration::from_millis(gw.idle_timeout_ms);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            // outbound writer
            maybe_out = out_rx.recv() => {
                match maybe_out {
                    Some(m) => {
                        if ws_tx.send(m).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else { break; };
                let Ok(msg) = incoming else { break; };
                last_activity = Instant::now();

                if frame_len(&msg) > max_frame_bytes {
                    warn!(target = %target, "oversized frame dropped");
                    continue;
                }

                match decode(msg) {
                    Ok(Inbound::Text { value, .. }) => {
                        if spoofs_target(&value, &target) {
                            warn!(target = %target, "request for another widget dropped");
                            continue;
                        }
                        app.host().post_message(&value);
                    }
                    Ok(Inbound::Binary { bytes_len }) => {
                        debug!(target = %target, bytes_len, "binary frame ignored");
                    }
                    Ok(Inbound::Ping(payload)) => {
                        queue_control(&out_tx, Message::Pong(payload), &target);
                    }
                    Ok(Inbound::Pong) => {}
                    Ok(Inbound::Close) => break,
                    Err(e) => {
                        // Unrelated or broken traffic is not fatal.
                        debug!(target = %target, error = %e, "undecodable frame ignored");
                    }
                }
            }

            // ping
            _ = ping_tick.tick() => {
                queue_control(&out_tx, Message::Ping(Vec::new()), &target);
            }

            // idle timeout
            _ = tokio::time::sleep(Duration::from_millis(250)) => {
                if last_activity.elapsed() >= idle_timeout {
                    let _ = ws_tx.send(Message::Text(sys_error_json("TIMEOUT", "idle timeout"))).await;
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn control_frames_never_wait_on_a_full_queue() {
        let (tx, mut rx) = mpsc::channel::<Message>(1);
        tx.try_send(Message::Text("response".into())).unwrap();

        queue_control(&tx, Message::Ping(Vec::new()), "w");
        queue_control(&tx, Message::Pong(vec![1]), "w");

        assert!(matches!(rx.try_recv(), Ok(Message::Text(_))));
        assert!(rx.try_recv().is_err());
    }
}
