//! Decoded forecast grids.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Descriptive metadata attached to a decoded grid.
///
/// None of these fields influence encoding; they exist for logging and for
/// clients that want to label a texture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridMetadata {
    /// Model run/reference time
    pub reference_time: Option<DateTime<Utc>>,
    /// Valid time (reference time plus forecast offset)
    pub forecast_time: Option<DateTime<Utc>>,
    /// Parameter short name (e.g. "HCDC")
    pub parameter: String,
    /// Parameter unit (e.g. "%")
    pub unit: String,
    /// Human-readable parameter description
    pub description: String,
    /// Level description (e.g. "high cloud layer", "500 mb")
    pub level: String,
    /// GRIB2 discipline, parameter category and number
    pub discipline: u8,
    pub category: u8,
    pub number: u8,
    /// Points along a parallel (Ni)
    pub width: u32,
    /// Points along a meridian (Nj)
    pub height: u32,
}

/// One decoded grid: an ordered sequence of samples plus metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub values: Vec<f32>,
    pub metadata: GridMetadata,
}

impl Grid {
    pub fn new(values: Vec<f32>, metadata: GridMetadata) -> Self {
        Self { values, metadata }
    }

    /// Create a grid with no metadata.
    pub fn from_values(values: Vec<f32>) -> Self {
        Self {
            values,
            metadata: GridMetadata::default(),
        }
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if grid has no samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Width x height as declared by the grid definition, if known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match (self.metadata.width, self.metadata.height) {
            (0, _) | (_, 0) => None,
            (w, h) => Some((w, h)),
        }
    }

    /// One-line summary used in request logs.
    pub fn summary(&self) -> String {
        let fmt_time = |t: Option<DateTime<Utc>>| {
            t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "unknown".to_string())
        };
        format!(
            "Published='{}', Forecast='{}', Parameter='{}', Unit='{}', Description='{}'",
            fmt_time(self.metadata.reference_time),
            fmt_time(self.metadata.forecast_time),
            self.metadata.parameter,
            self.metadata.unit,
            self.metadata.description
        )
    }
}
