//! `GET /api/flattened-cloud-texture`: total cloud cover at a pressure level.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};
use cloud_common::{CloudError, CloudResult, PressureLevel};
use rle_codec::GridBoundary;
use serde::Deserialize;
use tracing::{info, instrument};

use super::present;
use crate::error::ApiError;
use crate::metrics;
use crate::pipeline::{self, OutputFormat};
use crate::state::AppState;

const ENDPOINT: &str = "flattened-cloud-texture";

#[derive(Debug, Default, Deserialize)]
pub struct FlattenedParams {
    /// Pressure level, `500_mb` or `500`
    pub level_mb: Option<String>,
    pub date: Option<String>,
    pub modelrunhour: Option<String>,
    pub forecasthour: Option<String>,
    /// `flat` (default), `pairs` or `named`
    pub format: Option<String>,
    /// `merge` or `split`
    pub boundary: Option<String>,
}

#[instrument(skip(state))]
pub async fn flattened_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<FlattenedParams>,
) -> Result<Response, ApiError> {
    metrics::record_request(ENDPOINT);

    handle(&state, &params).await.map_err(|e| {
        metrics::record_error(ENDPOINT, e.http_status_code());
        ApiError(e)
    })
}

async fn handle(state: &AppState, params: &FlattenedParams) -> CloudResult<Response> {
    let level: PressureLevel = present(&params.level_mb)
        .ok_or_else(|| CloudError::MissingParameter("level_mb".to_string()))?
        .parse()?;

    let run = state.resolve_run(
        present(&params.date),
        present(&params.modelrunhour),
        present(&params.forecasthour),
    )?;

    let format = match present(&params.format) {
        Some(f) => f.parse()?,
        None => OutputFormat::Flat,
    };

    let boundary = match present(&params.boundary) {
        Some(b) => b
            .parse::<GridBoundary>()
            .map_err(|message| CloudError::invalid("boundary", message))?,
        None => state.config.encoding.grid_boundary,
    };

    info!(
        level = %level,
        file = %run.file_name(),
        format = %format,
        boundary = ?boundary,
        "Flattened cloud texture request"
    );

    let payload = pipeline::flattened(state, run, level, format, boundary).await?;
    Ok(Json(payload).into_response())
}
