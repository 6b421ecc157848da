//! Service configuration loaded from YAML.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use cloud_common::{ForecastHour, ModelCycle};
use rle_codec::{GridBoundary, RunShape};
use serde::{Deserialize, Serialize};

pub const DEFAULT_UPSTREAM_URL: &str = "https://nomads.ncep.noaa.gov/cgi-bin/filter_gfs_0p25_1hr.pl";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub encoding: EncodingConfig,

    #[serde(default)]
    pub defaults: RunDefaults,
}

/// NOMADS filter endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    #[serde(default)]
    pub subregion: Subregion,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            subregion: Subregion::default(),
        }
    }
}

/// Bounding box passed to the filter script, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Subregion {
    #[serde(default = "default_toplat")]
    pub toplat: f64,
    #[serde(default)]
    pub leftlon: f64,
    #[serde(default = "default_rightlon")]
    pub rightlon: f64,
    #[serde(default = "default_bottomlat")]
    pub bottomlat: f64,
}

impl Default for Subregion {
    fn default() -> Self {
        Self {
            toplat: default_toplat(),
            leftlon: 0.0,
            rightlon: default_rightlon(),
            bottomlat: default_bottomlat(),
        }
    }
}

/// Output defaults for encoded responses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncodingConfig {
    #[serde(default)]
    pub default_shape: RunShape,

    /// How runs behave where one grid ends and the next begins.
    #[serde(default)]
    pub grid_boundary: GridBoundary,
}

/// Model run used when a request omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunDefaults {
    #[serde(default = "default_model_run_hour")]
    pub model_run_hour: String,

    #[serde(default = "default_forecast_hour")]
    pub forecast_hour: String,
}

impl RunDefaults {
    pub fn cycle(&self) -> cloud_common::CloudResult<ModelCycle> {
        self.model_run_hour.parse()
    }

    pub fn forecast_hour(&self) -> cloud_common::CloudResult<ForecastHour> {
        self.forecast_hour.parse()
    }
}

impl Default for RunDefaults {
    fn default() -> Self {
        Self {
            model_run_hour: default_model_run_hour(),
            forecast_hour: default_forecast_hour(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_UPSTREAM_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_connect_timeout_secs() -> u64 {
    30
}

fn default_toplat() -> f64 {
    90.0
}

fn default_rightlon() -> f64 {
    360.0
}

fn default_bottomlat() -> f64 {
    -90.0
}

fn default_model_run_hour() -> String {
    "00".to_string()
}

fn default_forecast_hour() -> String {
    "000".to_string()
}

impl ServiceConfig {
    /// Load configuration from a YAML file.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(
                "Config file {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;

        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> Result<()> {
        self.defaults
            .cycle()
            .context("Invalid defaults.model_run_hour")?;
        self.defaults
            .forecast_hour()
            .context("Invalid defaults.forecast_hour")?;

        let region = &self.upstream.subregion;
        if region.bottomlat > region.toplat {
            anyhow::bail!(
                "Invalid subregion: bottomlat {} is above toplat {}",
                region.bottomlat,
                region.toplat
            );
        }

        reqwest::Url::parse(&self.upstream.base_url)
            .with_context(|| format!("Invalid upstream.base_url: {}", self.upstream.base_url))?;

        Ok(())
    }
}
