//! WebSocket upgrade and connection handling
//!
//! The Origin header of the upgrade request is the trust anchor for
//! everything downstream: requests with no Origin are refused before the
//! upgrade, and message content can never override it. Frames on one
//! connection are dispatched sequentially, so a page's own message stream
//! is processed in order.

use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use hyper_tungstenite::tungstenite::Message;
use hyper_tungstenite::HyperWebsocket;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::router::Router;
use crate::server::http::AppState;
use crate::types::Result;

/// Handle a WebSocket upgrade for the wallet API endpoint
pub fn handle_upgrade(state: Arc<AppState>, req: &mut Request<Incoming>) -> Response<Full<Bytes>> {
    let origin = req
        .headers()
        .get("origin")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    let Some(origin) = origin else {
        warn!("WebSocket upgrade refused: no Origin header");
        return Response::builder()
            .status(StatusCode::FORBIDDEN)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(
                r#"{"error":"Origin header required"}"#,
            )))
            .unwrap_or_else(|_| {
                let mut r = Response::new(Full::new(Bytes::new()));
                *r.status_mut() = StatusCode::FORBIDDEN;
                r
            });
    };

    match hyper_tungstenite::upgrade(req, None) {
        Ok((response, websocket)) => {
            info!(origin = %origin, "WebSocket upgrade accepted");
            let router = state.router.clone();

            tokio::spawn(async move {
                if let Err(e) = serve_connection(websocket, router, origin).await {
                    debug!("WebSocket connection closed with error: {}", e);
                }
            });

            let (parts, _) = response.into_parts();
            Response::from_parts(parts, Full::new(Bytes::new()))
        }
        Err(e) => {
            error!("WebSocket upgrade error: {:?}", e);
            Response::builder()
                .status(StatusCode::BAD_REQUEST)
                .body(Full::new(Bytes::from(format!(
                    "WebSocket upgrade failed: {e}"
                ))))
                .unwrap_or_else(|_| {
                    let mut r = Response::new(Full::new(Bytes::new()));
                    *r.status_mut() = StatusCode::BAD_REQUEST;
                    r
                })
        }
    }
}

/// Sequential read → dispatch → write loop for one connection.
///
/// Transport errors terminate the task; they never reach the router.
async fn serve_connection(
    websocket: HyperWebsocket,
    router: Arc<Router>,
    origin: String,
) -> Result<()> {
    let ws = websocket.await?;
    let (mut sink, mut stream) = ws.split();

    while let Some(message) = stream.next().await {
        match message? {
            Message::Text(text) => {
                let response = router.dispatch_text(&origin, &text).await;
                let json = serde_json::to_string(&response)?;
                sink.send(Message::text(json)).await?;
            }
            Message::Close(_) => break,
            // Binary, ping and pong frames are not part of the protocol
            _ => {}
        }
    }

    debug!(origin = %origin, "WebSocket connection closed");
    Ok(())
}
