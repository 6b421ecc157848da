//! Cloud layer and pressure level selection.
//!
//! Each selection maps onto one GRIB2 variable/level pair understood by the
//! NOMADS filter (`var_HCDC=on&lev_high_cloud_layer=on`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CloudError, CloudResult};

/// A variable/level pair requested from the upstream filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UpstreamField {
    /// GRIB2 short name (e.g. "HCDC", "TCDC")
    pub variable: String,
    /// Filter level token (e.g. "high_cloud_layer", "500_mb")
    pub level: String,
}

impl UpstreamField {
    pub fn new(variable: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            variable: variable.into(),
            level: level.into(),
        }
    }

    /// Query key enabling the variable, e.g. `var_HCDC`.
    pub fn variable_key(&self) -> String {
        format!("var_{}", self.variable)
    }

    /// Query key enabling the level, e.g. `lev_high_cloud_layer`.
    pub fn level_key(&self) -> String {
        format!("lev_{}", self.level)
    }
}

/// A named cloud layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloudLayer {
    Low,
    Middle,
    High,
}

impl CloudLayer {
    /// All layers in record order.
    pub const ALL: [CloudLayer; 3] = [CloudLayer::Low, CloudLayer::Middle, CloudLayer::High];

    /// GRIB2 short name of the cloud cover parameter for this layer.
    pub fn variable(&self) -> &'static str {
        match self {
            CloudLayer::Low => "LCDC",
            CloudLayer::Middle => "MCDC",
            CloudLayer::High => "HCDC",
        }
    }

    /// Filter level token for this layer.
    pub fn level_name(&self) -> &'static str {
        match self {
            CloudLayer::Low => "low_cloud_layer",
            CloudLayer::Middle => "middle_cloud_layer",
            CloudLayer::High => "high_cloud_layer",
        }
    }

    /// Field name used in the combined `{lowCloud, middleCloud, highCloud}` record.
    pub fn record_key(&self) -> &'static str {
        match self {
            CloudLayer::Low => "lowCloud",
            CloudLayer::Middle => "middleCloud",
            CloudLayer::High => "highCloud",
        }
    }

    pub fn upstream_field(&self) -> UpstreamField {
        UpstreamField::new(self.variable(), self.level_name())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CloudLayer::Low => "low",
            CloudLayer::Middle => "middle",
            CloudLayer::High => "high",
        }
    }
}

impl fmt::Display for CloudLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CloudLayer {
    type Err = CloudError;

    fn from_str(s: &str) -> CloudResult<Self> {
        match s {
            "low" => Ok(CloudLayer::Low),
            "middle" => Ok(CloudLayer::Middle),
            "high" => Ok(CloudLayer::High),
            other => Err(CloudError::invalid(
                "level",
                format!("'{}' is not one of high, middle, low, all", other),
            )),
        }
    }
}

/// Layer selection for the cloud texture endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerSelection {
    Single(CloudLayer),
    /// All three layers as a combined record
    All,
}

impl LayerSelection {
    /// Layers covered by this selection, in record order.
    pub fn layers(&self) -> Vec<CloudLayer> {
        match self {
            LayerSelection::Single(layer) => vec![*layer],
            LayerSelection::All => CloudLayer::ALL.to_vec(),
        }
    }
}

impl FromStr for LayerSelection {
    type Err = CloudError;

    fn from_str(s: &str) -> CloudResult<Self> {
        if s == "all" {
            return Ok(LayerSelection::All);
        }
        s.parse().map(LayerSelection::Single)
    }
}

/// An isobaric level in millibars (hPa).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PressureLevel(pub u32);

impl PressureLevel {
    /// GRIB2 short name requested at pressure levels (total cloud cover).
    pub const VARIABLE: &'static str = "TCDC";

    pub fn millibars(&self) -> u32 {
        self.0
    }

    pub fn upstream_field(&self) -> UpstreamField {
        UpstreamField::new(Self::VARIABLE, self.to_string())
    }
}

impl fmt::Display for PressureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_mb", self.0)
    }
}

impl FromStr for PressureLevel {
    type Err = CloudError;

    /// Accepts `500_mb` or a bare `500`.
    fn from_str(s: &str) -> CloudResult<Self> {
        let digits = s.strip_suffix("_mb").unwrap_or(s);
        let mb: u32 = digits
            .parse()
            .map_err(|_| CloudError::invalid("level_mb", format!("'{}' is not a pressure level", s)))?;

        if !(1..=1000).contains(&mb) {
            return Err(CloudError::invalid(
                "level_mb",
                format!("{} mb is outside 1..=1000", mb),
            ));
        }

        Ok(PressureLevel(mb))
    }
}
