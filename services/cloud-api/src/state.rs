//! Application state shared by all handlers.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use cloud_common::{CloudResult, ModelRun};
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ServiceConfig;
use crate::upstream::{GridSource, NomadsSource};

/// Shared application state.
pub struct AppState {
    pub config: ServiceConfig,

    /// Where GRIB2 payloads come from.
    pub source: Arc<dyn GridSource>,

    /// Renders `/metrics` when a Prometheus recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(config: ServiceConfig, source: Arc<dyn GridSource>) -> Self {
        Self {
            config,
            source,
            prometheus: None,
        }
    }

    /// State backed by the NOMADS filter service.
    pub fn from_config(config: ServiceConfig) -> CloudResult<Self> {
        let source = NomadsSource::new(config.upstream.clone())?;
        Ok(Self::new(config, Arc::new(source)))
    }

    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }

    /// Resolve the model run named by a request, filling omitted parts
    /// from today's date and the configured defaults.
    pub fn resolve_run(
        &self,
        date: Option<&str>,
        model_run_hour: Option<&str>,
        forecast_hour: Option<&str>,
    ) -> CloudResult<ModelRun> {
        ModelRun::resolve(
            date,
            model_run_hour,
            forecast_hour,
            today(),
            self.config.defaults.cycle()?,
            self.config.defaults.forecast_hour()?,
        )
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
