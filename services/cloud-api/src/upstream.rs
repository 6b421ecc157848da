//! GRIB2 retrieval from the NOMADS GFS filter service.

use std::time::Instant;

use async_trait::async_trait;
use bytes::Bytes;
use cloud_common::{CloudError, CloudResult, ModelRun, UpstreamField};
use reqwest::{Client, Url};
use tracing::{debug, info, instrument, warn};

use crate::config::UpstreamConfig;
use crate::metrics;

/// Number of leading payload bytes written to the log.
const PREVIEW_BYTES: usize = 10;

/// One GRIB2 subset to retrieve: a model run plus a variable at a level.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub run: ModelRun,
    pub field: UpstreamField,
}

impl FetchRequest {
    pub fn new(run: ModelRun, field: UpstreamField) -> Self {
        Self { run, field }
    }
}

/// Source of raw GRIB2 bytes.
#[async_trait]
pub trait GridSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> CloudResult<Bytes>;

    /// Short name used in logs and readiness output.
    fn name(&self) -> &str;
}

/// Fetches subsets through the NOMADS `filter_gfs_0p25_1hr.pl` script.
pub struct NomadsSource {
    client: Client,
    config: UpstreamConfig,
}

impl NomadsSource {
    pub fn new(config: UpstreamConfig) -> CloudResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(4)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CloudError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Build the filter URL for a request.
    pub fn filter_url(&self, request: &FetchRequest) -> CloudResult<Url> {
        let mut url = Url::parse(&self.config.base_url).map_err(|e| {
            CloudError::Internal(format!("Invalid upstream URL {}: {}", self.config.base_url, e))
        })?;

        let region = &self.config.subregion;
        url.query_pairs_mut()
            .append_pair("dir", &request.run.directory())
            .append_pair("file", &request.run.file_name())
            .append_pair(&request.field.variable_key(), "on")
            .append_pair(&request.field.level_key(), "on")
            .append_pair("subregion", "")
            .append_pair("toplat", &format_degrees(region.toplat))
            .append_pair("leftlon", &format_degrees(region.leftlon))
            .append_pair("rightlon", &format_degrees(region.rightlon))
            .append_pair("bottomlat", &format_degrees(region.bottomlat));

        Ok(url)
    }
}

#[async_trait]
impl GridSource for NomadsSource {
    #[instrument(skip(self), fields(file = %request.run.file_name(), field = %request.field.variable))]
    async fn fetch(&self, request: &FetchRequest) -> CloudResult<Bytes> {
        let url = self.filter_url(request)?;
        info!(url = %url, "Fetching GRIB2 subset");

        let start = Instant::now();
        let response = self.client.get(url).send().await.map_err(request_error)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Server returned non-OK status");
            return Err(CloudError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let payload = response.bytes().await.map_err(request_error)?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        metrics::record_upstream_fetch(elapsed_ms);

        info!(
            status = status.as_u16(),
            bytes = payload.len(),
            elapsed_ms = elapsed_ms,
            "Fetched GRIB2 subset"
        );
        debug!(
            first_bytes = ?&payload[..payload.len().min(PREVIEW_BYTES)],
            "Payload preview"
        );

        Ok(payload)
    }

    fn name(&self) -> &str {
        "nomads"
    }
}

fn request_error(err: reqwest::Error) -> CloudError {
    if err.is_timeout() {
        CloudError::Timeout
    } else {
        CloudError::UpstreamRequest(err.to_string())
    }
}

fn format_degrees(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
