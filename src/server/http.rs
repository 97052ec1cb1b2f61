//! HTTP server implementation
//!
//! hyper http1 with TokioIo, one spawned task per connection. The wallet
//! API itself is the WebSocket endpoint at `/`; the plain HTTP routes are
//! operational (`/health`, `/version`) plus the audit snapshot (`/events`)
//! consumed by the UI layer.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::config::Args;
use crate::events::EventLog;
use crate::router::Router;
use crate::server::websocket;
use crate::types::Result;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub router: Arc<Router>,
    pub events: Arc<EventLog>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(args: Args, router: Arc<Router>, events: Arc<EventLog>) -> Self {
        Self {
            args,
            router,
            events,
            started_at: Instant::now(),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    healthy: bool,
    status: &'static str,
    version: &'static str,
    uptime: u64,
    node_id: String,
    open_sessions: usize,
    timestamp: String,
}

#[derive(Serialize)]
struct VersionResponse {
    version: &'static str,
    commit: &'static str,
    commit_full: &'static str,
    built_at: &'static str,
}

/// Run the server until the listener fails
pub async fn run(state: Arc<AppState>) -> Result<()> {
    let addr: SocketAddr = state.args.listen;
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| handle_request(state.clone(), req));
            let conn = http1::Builder::new()
                .serve_connection(io, service)
                .with_upgrades();

            if let Err(e) = conn.await {
                debug!("Connection error ({}): {:?}", peer, e);
            }
        });
    }
}

async fn handle_request(
    state: Arc<AppState>,
    mut req: Request<Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    if hyper_tungstenite::is_upgrade_request(&req) {
        return Ok(websocket::handle_upgrade(state, &mut req));
    }

    let response = match (method, path.as_str()) {
        (Method::GET, "/health") | (Method::GET, "/healthz") => health(&state),
        (Method::GET, "/version") => version(),
        (Method::GET, "/events") => events(&state),
        (Method::GET, "/") => text_response(
            StatusCode::UPGRADE_REQUIRED,
            "Wicket wallet API: connect via WebSocket",
        ),
        _ => text_response(StatusCode::NOT_FOUND, "Not found"),
    };

    Ok(response)
}

fn health(state: &AppState) -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            healthy: true,
            status: "online",
            version: env!("CARGO_PKG_VERSION"),
            uptime: state.started_at.elapsed().as_secs(),
            node_id: state.args.node_id.to_string(),
            open_sessions: state.router.sessions.len(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        },
    )
}

fn version() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            commit: env!("GIT_COMMIT_SHORT"),
            commit_full: env!("GIT_COMMIT_FULL"),
            built_at: env!("BUILD_TIMESTAMP"),
        },
    )
}

fn events(state: &AppState) -> Response<Full<Bytes>> {
    json_response(StatusCode::OK, &state.events.recent())
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(bytes) => Response::builder()
            .status(status)
            .header("Content-Type", "application/json")
            .body(Full::new(Bytes::from(bytes)))
            .unwrap_or_else(|_| fallback_500()),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            fallback_500()
        }
    }
}

fn text_response(status: StatusCode, body: &str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| fallback_500())
}

fn fallback_500() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(b"internal error")));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
