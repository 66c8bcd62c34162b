//! HTTP surface of the addon
//!
//! Every request goes through one dispatcher: the path is parsed into an
//! [`Endpoint`], static payloads come from the catalog and stream requests
//! are handed to the [`StreamResolver`].

pub mod endpoint;

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::catalog::StaticCatalog;
use crate::error::AddonError;
use crate::models::{CatalogResponse, MetaResponse, StreamsResponse};
use crate::stream::StreamResolver;

pub use endpoint::Endpoint;

/// Shared handler state
pub struct AppState {
    pub catalog: Arc<StaticCatalog>,
    pub resolver: Arc<StreamResolver>,
}

impl AppState {
    pub fn new(catalog: Arc<StaticCatalog>, resolver: Arc<StreamResolver>) -> Self {
        Self { catalog, resolver }
    }
}

/// Build the addon router with CORS, tracing and panic recovery
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Serve the addon on `addr` until the process is stopped
pub async fn serve(state: Arc<AppState>, addr: SocketAddr) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Serving addon on http://{}/manifest.json", listener.local_addr()?);
    axum::serve(listener, router(state).into_make_service()).await?;
    Ok(())
}

async fn dispatch(State(state): State<Arc<AppState>>, method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let path = uri.path();
    let result = match Endpoint::parse(path) {
        Endpoint::Manifest => Ok(Json(state.catalog.manifest()).into_response()),
        Endpoint::Catalog { id } => state
            .catalog
            .catalog(&id)
            .map(|metas| Json(CatalogResponse { metas }).into_response()),
        Endpoint::Meta { id } => state
            .catalog
            .meta(&id)
            .map(|meta| Json(MetaResponse { meta }).into_response()),
        Endpoint::Stream { id } => stream(&state, &id).await,
        Endpoint::Health => Ok(health()),
        Endpoint::NotFound => return not_found(path, "Endpoint not found"),
    };

    result.unwrap_or_else(|err| match err {
        AddonError::NotFound(_) => not_found(path, &err.to_string()),
        other => other.into_response(),
    })
}

/// Stream lookups: unknown ids are 404, everything remote degrades to `[]`
async fn stream(state: &AppState, id: &str) -> Result<Response, AddonError> {
    let streams = match state.resolver.streams_for(id).await {
        Ok(streams) => streams,
        Err(err @ AddonError::NotFound(_)) => return Err(err),
        Err(err) => {
            tracing::warn!(stream_id = id, error = %err, "stream resolution failed");
            Vec::new()
        }
    };
    Ok(Json(StreamsResponse { streams }).into_response())
}

fn health() -> Response {
    Json(json!({
        "status": "OK",
        "path": "health",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
    .into_response()
}

fn not_found(path: &str, message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": message, "path": path })),
    )
        .into_response()
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AddonError::Internal(detail.to_string()).into_response()
}
