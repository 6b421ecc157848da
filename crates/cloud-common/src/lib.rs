//! Common types and utilities shared across the cloud texture crates.

pub mod error;
pub mod grid;
pub mod layer;
pub mod time;

pub use error::{CloudError, CloudResult};
pub use grid::{Grid, GridMetadata};
pub use layer::{CloudLayer, LayerSelection, PressureLevel, UpstreamField};
pub use time::{ForecastHour, ModelCycle, ModelRun};
