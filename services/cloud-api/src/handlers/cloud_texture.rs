//! `GET /api/cloud-texture`: run-length encoded cloud cover for a named layer.

use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    response::{IntoResponse, Response},
    Json,
};
use cloud_common::{CloudError, CloudResult, LayerSelection};
use serde::Deserialize;
use tracing::{info, instrument};

use super::present;
use crate::error::ApiError;
use crate::metrics;
use crate::pipeline::{self, OutputFormat};
use crate::state::AppState;

const ENDPOINT: &str = "cloud-texture";

#[derive(Debug, Default, Deserialize)]
pub struct CloudTextureParams {
    /// `high`, `middle`, `low` or `all`
    pub level: Option<String>,
    /// Run date, `YYYYMMDD`
    pub date: Option<String>,
    pub modelrunhour: Option<String>,
    pub forecasthour: Option<String>,
    /// `pairs`, `named` or `flat`
    pub format: Option<String>,
}

#[instrument(skip(state))]
pub async fn cloud_texture_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<CloudTextureParams>,
) -> Result<Response, ApiError> {
    metrics::record_request(ENDPOINT);

    handle(&state, &params).await.map_err(|e| {
        metrics::record_error(ENDPOINT, e.http_status_code());
        ApiError(e)
    })
}

async fn handle(state: &AppState, params: &CloudTextureParams) -> CloudResult<Response> {
    let selection: LayerSelection = present(&params.level)
        .ok_or_else(|| CloudError::MissingParameter("level".to_string()))?
        .parse()?;

    let run = state.resolve_run(
        present(&params.date),
        present(&params.modelrunhour),
        present(&params.forecasthour),
    )?;

    let format = match present(&params.format) {
        Some(f) => f.parse()?,
        None => OutputFormat::from(state.config.encoding.default_shape),
    };

    info!(
        selection = ?selection,
        file = %run.file_name(),
        date = %run.date_string(),
        format = %format,
        "Cloud texture request"
    );

    let response = match selection {
        LayerSelection::Single(layer) => {
            Json(pipeline::cloud_texture(state, run, layer, format).await?).into_response()
        }
        LayerSelection::All => Json(pipeline::all_layers(state, run, format).await?).into_response(),
    };

    Ok(response)
}
