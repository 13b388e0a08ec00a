//! HTTP server exposing the dashboard to a browser.
//!
//! - `GET /` - embedded page that polls `/api/dashboard` and draws it
//! - `GET /api/health` - health check
//! - `GET /api/dashboard` - snapshot of every field and panel
//! - `GET /api/server` - current metrics server address
//! - `POST /api/server` - switch to another metrics server

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::dashboard::{self, SharedDashboard};
use crate::page::PageSnapshot;
use crate::poller::ServerAddress;

/// Application state shared across handlers.
pub struct AppState {
    pub dashboard: SharedDashboard,
    pub address: ServerAddress,
}

const EMBEDDED_INDEX_HTML: &str = include_str!("static/index.html");

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/health", get(health_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/server", get(get_server_handler).post(set_server_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the dashboard on all interfaces until the process exits.
pub async fn run_server(state: Arc<AppState>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard port {}", port))?;

    info!(url = %format!("http://127.0.0.1:{}", port), "Dashboard running");

    axum::serve(listener, router(state))
        .await
        .context("Dashboard server failed")?;

    Ok(())
}

// --- Handlers ---

async fn index_handler() -> Html<&'static str> {
    Html(EMBEDDED_INDEX_HTML)
}

/// GET /api/health
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
}

/// GET /api/dashboard
async fn dashboard_handler(State(state): State<Arc<AppState>>) -> Json<DashboardResponse> {
    let page = dashboard::lock(&state.dashboard).view().snapshot();
    Json(DashboardResponse {
        server_address: state.address.get(),
        page,
    })
}

#[derive(Serialize)]
struct DashboardResponse {
    server_address: String,
    #[serde(flatten)]
    page: PageSnapshot,
}

#[derive(Serialize, Deserialize)]
struct ServerAddressBody {
    address: String,
}

/// GET /api/server
async fn get_server_handler(State(state): State<Arc<AppState>>) -> Json<ServerAddressBody> {
    Json(ServerAddressBody {
        address: state.address.get(),
    })
}

/// POST /api/server - all pollers restart against the new address.
async fn set_server_handler(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ServerAddressBody>,
) -> Response {
    let address = body.address.trim();
    if address.is_empty() {
        return (StatusCode::BAD_REQUEST, "address must not be empty").into_response();
    }

    state.address.set(address);
    Json(ServerAddressBody {
        address: address.to_string(),
    })
    .into_response()
}
