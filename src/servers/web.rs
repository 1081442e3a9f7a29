//! HTTP transport: the move API plus static frontend hosting.

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::services::{ModelSlot, MoveRequest};
use crate::{GomokuError, Result};

#[derive(Serialize, Debug, Clone)]
pub struct ApiStatus {
    pub status: String,
    pub message: String,
}

#[derive(Serialize, Debug, Clone)]
struct ApiError {
    error: String,
}

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub port: u16,
    pub host: String,
    pub static_dir: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            static_dir: "static".to_string(),
        }
    }
}

#[derive(Clone)]
struct AppState {
    slot: Arc<ModelSlot>,
    static_dir: String,
}

pub struct WebServer {
    config: WebConfig,
    slot: Arc<ModelSlot>,
}

impl WebServer {
    pub fn new(config: WebConfig, slot: Arc<ModelSlot>) -> WebServer {
        WebServer { config, slot }
    }

    pub async fn start(&self) -> Result<()> {
        let app = self.create_router();
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port)
            .parse()
            .map_err(|e| GomokuError::Server(format!("bad listen address: {e}")))?;
        let listener = TcpListener::bind(addr).await?;

        log::info!(
            "move server listening on http://localhost:{}",
            self.config.port
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| GomokuError::Server(e.to_string()))
    }

    fn create_router(&self) -> Router {
        let state = AppState {
            slot: self.slot.clone(),
            static_dir: self.config.static_dir.clone(),
        };
        Router::new()
            .route("/", get(serve_index))
            .route("/api/status", get(api_status))
            .route("/api/move", post(api_move))
            .nest_service("/static", ServeDir::new(&self.config.static_dir))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(state)
    }
}

impl IntoResponse for GomokuError {
    fn into_response(self) -> Response {
        let status = match self {
            GomokuError::InvalidMove(_) => StatusCode::BAD_REQUEST,
            GomokuError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(ApiError {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

async fn serve_index(State(state): State<AppState>) -> Html<String> {
    let index_path = format!("{}/index.html", state.static_dir);
    let content = tokio::fs::read_to_string(&index_path)
        .await
        .unwrap_or_else(|_| {
            r#"<!DOCTYPE html>
<html><head><title>Gomoku Zero</title></head>
<body>
<h1>Gomoku Zero</h1>
<p>Move API at POST /api/move; frontend assets belong in ./static/</p>
</body></html>"#
                .to_string()
        });
    Html(content)
}

async fn api_status(State(state): State<AppState>) -> axum::response::Json<ApiStatus> {
    if state.slot.is_ready() {
        axum::response::Json(ApiStatus {
            status: "ready".to_string(),
            message: "Gomoku Zero server is running".to_string(),
        })
    } else {
        axum::response::Json(ApiStatus {
            status: "degraded".to_string(),
            message: "serving without an AI model".to_string(),
        })
    }
}

/// The move endpoint. Replay and search happen on the blocking pool; the
/// handler maps every failure onto the legacy error body and keeps the
/// process alive no matter what the request contained.
async fn api_move(State(state): State<AppState>, Json(request): Json<MoveRequest>) -> Response {
    let Some(orchestrator) = state.slot.get() else {
        log::warn!("move requested while the AI never initialized");
        return GomokuError::ServiceUnavailable.into_response();
    };

    let outcome =
        tokio::task::spawn_blocking(move || orchestrator.play_turn(&request)).await;

    match outcome {
        Ok(Ok(response)) => Json(response).into_response(),
        Ok(Err(err @ GomokuError::InvalidMove(_))) => err.into_response(),
        Ok(Err(err)) => {
            log::error!("move handling failed: {err}");
            err.into_response()
        }
        Err(join_err) => {
            log::error!("move task panicked: {join_err}");
            GomokuError::Server("internal error while selecting a move".to_string())
                .into_response()
        }
    }
}
