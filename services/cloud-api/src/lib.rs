//! Cloud Texture Service Library
//!
//! HTTP service that fetches GFS cloud cover from NOMADS, decodes the GRIB2
//! payload and returns the samples as run-length encoded JSON.

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod pipeline;
pub mod state;
pub mod upstream;

use std::any::Any;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Extension, Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, cors::CorsLayer,
    trace::TraceLayer,
};

use crate::error::ErrorBody;
use crate::state::AppState;

/// Build the service router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/api/cloud-texture",
            get(handlers::cloud_texture::cloud_texture_handler),
        )
        .route(
            "/api/flattened-cloud-texture",
            get(handlers::flattened::flattened_handler),
        )
        // Health and metrics
        .route("/health", get(handlers::health::health_handler))
        .route("/ready", get(handlers::health::ready_handler))
        .route("/metrics", get(handlers::health::metrics_handler))
        // Middleware
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(panic_response))
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %details, "Recovered from panic while handling request");

    let body = ErrorBody {
        error: "Server error".to_string(),
        status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
