//! HTTP API serving the persisted composite snapshot.
//!
//! The store is read on every request, so the served value always reflects
//! the latest completed update run.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::core::types::ClockResponse;
use crate::store::files::CompositeStore;

pub fn router(store: Arc<CompositeStore>) -> Router {
    Router::new()
        .route("/api/current", get(get_current))
        .with_state(store)
}

async fn get_current(
    State(store): State<Arc<CompositeStore>>,
) -> Result<Json<ClockResponse>, (StatusCode, Json<serde_json::Value>)> {
    match store.read_current() {
        Ok(Some(state)) => Ok(Json(ClockResponse::from(&state))),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "no composite snapshot recorded yet" })),
        )),
        Err(e) => {
            error!("Failed to read current state: {:#}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "store read failed" })),
            ))
        }
    }
}

pub async fn serve(
    store: Arc<CompositeStore>,
    bind_addr: &str,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!("API listening on {}", bind_addr);

    axum::serve(listener, router(store))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("serving api")?;

    info!("API server stopped cleanly");
    Ok(())
}
