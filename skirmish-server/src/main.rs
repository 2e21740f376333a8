//! Skirmish sync server.
//!
//! Hosts the authoritative game engine behind a WebSocket endpoint plus a
//! couple of read-only HTTP routes. The engine itself lives in
//! `skirmish-core`; this binary owns the session registry, the per-session
//! serialization of move submissions, and the fan-out of authoritative state
//! to both participants.
//!
//! Run with: `cargo run --package skirmish-server`

mod protocol;
mod registry;
mod ws;

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use skirmish_core::{Cell, GameSnapshot};

use registry::{RegistryError, SessionRegistry};

pub struct AppStateInner {
    pub registry: SessionRegistry,
}

pub type AppState = Arc<AppStateInner>;

#[derive(Serialize)]
struct HealthModel {
    status: String,
}

#[derive(Serialize)]
struct ErrorModel {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorModel>);

fn api_error(err: RegistryError) -> ApiError {
    let status = match err {
        RegistryError::SessionNotFound => StatusCode::NOT_FOUND,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        Json(ErrorModel {
            detail: err.to_string(),
        }),
    )
}

async fn health() -> Json<HealthModel> {
    Json(HealthModel {
        status: "ok".to_owned(),
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<GameSnapshot>, ApiError> {
    state.registry.snapshot(&id).map(Json).map_err(api_error)
}

async fn get_moves(
    State(state): State<AppState>,
    Path((id, row, col)): Path<(String, u8, u8)>,
) -> Result<Json<Vec<Cell>>, ApiError> {
    state
        .registry
        .legal_destinations(&id, Cell::new(row, col))
        .map(Json)
        .map_err(api_error)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skirmish_server=info")),
        )
        .init();

    let state: AppState = Arc::new(AppStateInner {
        registry: SessionRegistry::new(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(health))
        .route("/session/{id}", get(get_session))
        .route("/session/{id}/moves/{row}/{col}", get(get_moves))
        .layer(cors)
        .with_state(state);

    let addr = std::env::var("SKIRMISH_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_owned());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "skirmish server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
