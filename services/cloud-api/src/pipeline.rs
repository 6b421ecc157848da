//! Fetch, decode and encode steps behind the HTTP handlers.

use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use bytes::Bytes;
use cloud_common::{CloudError, CloudLayer, CloudResult, Grid, ModelRun, PressureLevel};
use rle_codec::{encode_grids, quantize, quantize_all, GridBoundary, RunShape, ShapedRuns};
use serde::Serialize;
use tokio::task::JoinError;
use tracing::{debug, info, instrument};

use crate::metrics;
use crate::state::AppState;
use crate::upstream::FetchRequest;

/// Response body layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Run-length pairs in the given shape
    Runs(RunShape),
    /// Every quantized sample, grids concatenated
    Flat,
}

impl From<RunShape> for OutputFormat {
    fn from(shape: RunShape) -> Self {
        OutputFormat::Runs(shape)
    }
}

impl FromStr for OutputFormat {
    type Err = CloudError;

    fn from_str(s: &str) -> CloudResult<Self> {
        match s {
            "pairs" => Ok(OutputFormat::Runs(RunShape::Pairs)),
            "named" => Ok(OutputFormat::Runs(RunShape::Named)),
            "flat" => Ok(OutputFormat::Flat),
            other => Err(CloudError::invalid(
                "format",
                format!("'{}' is not one of pairs, named, flat", other),
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Runs(RunShape::Pairs) => f.write_str("pairs"),
            OutputFormat::Runs(RunShape::Named) => f.write_str("named"),
            OutputFormat::Flat => f.write_str("flat"),
        }
    }
}

/// Encoded data for one request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Runs(ShapedRuns),
    Flat(Vec<i32>),
}

/// The three cloud layers of one model run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRecord {
    pub low_cloud: Payload,
    pub middle_cloud: Payload,
    pub high_cloud: Payload,
}

/// Fetch and decode every grid for a request.
///
/// Fails with [`CloudError::NoGrids`] when the payload holds no grids.
#[instrument(skip(state), fields(file = %request.run.file_name(), variable = %request.field.variable))]
pub async fn fetch_grids(state: &AppState, request: FetchRequest) -> CloudResult<Vec<Grid>> {
    let payload = state.source.fetch(&request).await?;
    let grids = decode_payload(payload).await?;

    if grids.is_empty() {
        return Err(CloudError::NoGrids);
    }

    for (index, grid) in grids.iter().enumerate() {
        info!(grid = index, samples = grid.len(), "{}", grid.summary());
    }

    Ok(grids)
}

async fn decode_payload(payload: Bytes) -> CloudResult<Vec<Grid>> {
    let start = Instant::now();

    let grids = tokio::task::spawn_blocking(move || grib2_parser::decode_grids(&payload))
        .await
        .map_err(join_error)?
        .map_err(|e| CloudError::Grib2Decode(e.to_string()))?;

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    metrics::record_decode(elapsed_ms, grids.len());
    debug!(grids = grids.len(), elapsed_ms = elapsed_ms, "Decoded GRIB2 payload");

    Ok(grids)
}

/// Quantize and encode grids in file order.
///
/// `Flat` concatenates the quantized samples; `Runs` encodes them as one
/// stream with `boundary` deciding whether runs may span grids.
pub fn encode_payload(grids: &[Grid], format: OutputFormat, boundary: GridBoundary) -> Payload {
    match format {
        OutputFormat::Flat => Payload::Flat(
            grids
                .iter()
                .flat_map(|grid| grid.values.iter().copied().map(quantize))
                .collect(),
        ),
        OutputFormat::Runs(shape) => {
            let quantized: Vec<Vec<i32>> = grids.iter().map(|g| quantize_all(&g.values)).collect();
            let samples = quantized.iter().map(Vec::len).sum();
            let stream = encode_grids(quantized.iter().map(Vec::as_slice), boundary);

            metrics::record_encoding(stream.len(), samples);
            debug!(runs = stream.len(), samples = samples, "Encoded grids");

            Payload::Runs(ShapedRuns::new(stream, shape))
        }
    }
}

async fn encode_blocking(
    grids: Vec<Grid>,
    format: OutputFormat,
    boundary: GridBoundary,
) -> CloudResult<Payload> {
    tokio::task::spawn_blocking(move || encode_payload(&grids, format, boundary))
        .await
        .map_err(join_error)
}

/// Encode the first grid of one cloud layer.
pub async fn cloud_texture(
    state: &AppState,
    run: ModelRun,
    layer: CloudLayer,
    format: OutputFormat,
) -> CloudResult<Payload> {
    let mut grids = fetch_grids(state, FetchRequest::new(run, layer.upstream_field())).await?;
    grids.truncate(1);
    encode_blocking(grids, format, GridBoundary::Split).await
}

/// Encode all three cloud layers, fetched concurrently.
pub async fn all_layers(
    state: &AppState,
    run: ModelRun,
    format: OutputFormat,
) -> CloudResult<LayerRecord> {
    let (low_cloud, middle_cloud, high_cloud) = futures::try_join!(
        cloud_texture(state, run, CloudLayer::Low, format),
        cloud_texture(state, run, CloudLayer::Middle, format),
        cloud_texture(state, run, CloudLayer::High, format),
    )?;

    Ok(LayerRecord {
        low_cloud,
        middle_cloud,
        high_cloud,
    })
}

/// Encode every grid of total cloud cover at a pressure level.
pub async fn flattened(
    state: &AppState,
    run: ModelRun,
    level: PressureLevel,
    format: OutputFormat,
    boundary: GridBoundary,
) -> CloudResult<Payload> {
    let grids = fetch_grids(state, FetchRequest::new(run, level.upstream_field())).await?;
    encode_blocking(grids, format, boundary).await
}

// A panic inside a blocking task is re-raised on the request task.
fn join_error(err: JoinError) -> CloudError {
    if err.is_panic() {
        std::panic::resume_unwind(err.into_panic());
    }
    CloudError::Internal(format!("Blocking task failed: {}", err))
}
