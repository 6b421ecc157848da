//! GRIB2 parameter and level lookup tables.
//!
//! Translates the numeric codes of Sections 0 and 4 into readable names.
//! [`Grib2Tables::gfs`] carries the cloud cover entries served by GFS.

use std::collections::HashMap;

/// Lookup key for parameter: (discipline, category, number)
pub type ParamKey = (u8, u8, u8);

/// Readable description of a GRIB2 parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub short_name: String,
    pub unit: String,
    pub description: String,
}

impl ParameterInfo {
    pub fn new(short_name: &str, unit: &str, description: &str) -> Self {
        Self {
            short_name: short_name.to_string(),
            unit: unit.to_string(),
            description: description.to_string(),
        }
    }
}

/// Level description, either static text or a template.
#[derive(Debug, Clone)]
pub enum LevelDescription {
    /// Static description (e.g. "low cloud layer")
    Static(String),
    /// Template with a `{value}` or `{value_mb}` placeholder (e.g. "{value_mb} mb")
    Template(String),
}

impl LevelDescription {
    /// Format the description for a level value.
    ///
    /// `{value_mb}` converts from Pa to mb. A missing value leaves templates
    /// with the placeholder replaced by `?`.
    pub fn format(&self, value: Option<f64>) -> String {
        match self {
            LevelDescription::Static(s) => s.clone(),
            LevelDescription::Template(t) => {
                let raw = value.map(format_number).unwrap_or_else(|| "?".to_string());
                let mb = value
                    .map(|v| format_number(v / 100.0))
                    .unwrap_or_else(|| "?".to_string());
                t.replace("{value_mb}", &mb).replace("{value}", &raw)
            }
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// GRIB2 parameter and level lookup tables.
#[derive(Debug, Clone, Default)]
pub struct Grib2Tables {
    parameters: HashMap<ParamKey, ParameterInfo>,
    levels: HashMap<u8, LevelDescription>,
}

impl Grib2Tables {
    /// Create empty tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables naming the GFS cloud cover products and their levels.
    pub fn gfs() -> Self {
        let mut tables = Self::new();

        tables.add_parameter(0, 6, 1, ParameterInfo::new("TCDC", "%", "Total cloud cover"));
        tables.add_parameter(0, 6, 3, ParameterInfo::new("LCDC", "%", "Low cloud cover"));
        tables.add_parameter(0, 6, 4, ParameterInfo::new("MCDC", "%", "Medium cloud cover"));
        tables.add_parameter(0, 6, 5, ParameterInfo::new("HCDC", "%", "High cloud cover"));
        tables.add_parameter(0, 6, 6, ParameterInfo::new("CDCON", "%", "Convective cloud cover"));

        tables.add_level(1, LevelDescription::Static("surface".to_string()));
        tables.add_level(10, LevelDescription::Static("entire atmosphere".to_string()));
        tables.add_level(100, LevelDescription::Template("{value_mb} mb".to_string()));
        tables.add_level(200, LevelDescription::Static("entire atmosphere (considered as a single layer)".to_string()));
        tables.add_level(211, LevelDescription::Static("boundary layer cloud layer".to_string()));
        tables.add_level(214, LevelDescription::Static("low cloud layer".to_string()));
        tables.add_level(224, LevelDescription::Static("middle cloud layer".to_string()));
        tables.add_level(234, LevelDescription::Static("high cloud layer".to_string()));
        tables.add_level(244, LevelDescription::Static("convective cloud layer".to_string()));

        tables
    }

    pub fn add_parameter(&mut self, discipline: u8, category: u8, number: u8, info: ParameterInfo) {
        self.parameters.insert((discipline, category, number), info);
    }

    pub fn add_level(&mut self, level_type: u8, description: LevelDescription) {
        self.levels.insert(level_type, description);
    }

    pub fn parameter(&self, discipline: u8, category: u8, number: u8) -> Option<&ParameterInfo> {
        self.parameters.get(&(discipline, category, number))
    }

    /// Look up level description by type code and value.
    ///
    /// Returns "Level type {type}" if not found.
    pub fn level_description(&self, level_type: u8, level_value: Option<f64>) -> String {
        match self.levels.get(&level_type) {
            Some(desc) => desc.format(level_value),
            None => format!("Level type {}", level_type),
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty() && self.levels.is_empty()
    }
}
