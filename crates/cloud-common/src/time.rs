//! Model run identification for GFS requests.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CloudError, CloudResult};

/// Longest forecast horizon published on the hourly 0.25° grid.
pub const MAX_FORECAST_HOUR: u16 = 384;

/// Model run cycles (GFS runs 4x daily).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelCycle {
    /// 00Z run
    Z00,
    /// 06Z run
    Z06,
    /// 12Z run
    Z12,
    /// 18Z run
    Z18,
}

impl ModelCycle {
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0 => Some(ModelCycle::Z00),
            6 => Some(ModelCycle::Z06),
            12 => Some(ModelCycle::Z12),
            18 => Some(ModelCycle::Z18),
            _ => None,
        }
    }

    pub fn hour(&self) -> u32 {
        match self {
            ModelCycle::Z00 => 0,
            ModelCycle::Z06 => 6,
            ModelCycle::Z12 => 12,
            ModelCycle::Z18 => 18,
        }
    }
}

impl fmt::Display for ModelCycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.hour())
    }
}

impl FromStr for ModelCycle {
    type Err = CloudError;

    fn from_str(s: &str) -> CloudResult<Self> {
        s.parse::<u32>()
            .ok()
            .and_then(ModelCycle::from_hour)
            .ok_or_else(|| {
                CloudError::invalid("modelrunhour", format!("'{}' is not one of 00, 06, 12, 18", s))
            })
    }
}

/// Forecast offset in hours from the model run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ForecastHour(pub u16);

impl ForecastHour {
    pub const ANALYSIS: ForecastHour = ForecastHour(0);

    pub fn hours(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for ForecastHour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

impl FromStr for ForecastHour {
    type Err = CloudError;

    fn from_str(s: &str) -> CloudResult<Self> {
        let hours: u16 = s
            .parse()
            .map_err(|_| CloudError::invalid("forecasthour", format!("'{}' is not a number", s)))?;

        if hours > MAX_FORECAST_HOUR {
            return Err(CloudError::invalid(
                "forecasthour",
                format!("{} exceeds {}", hours, MAX_FORECAST_HOUR),
            ));
        }

        Ok(ForecastHour(hours))
    }
}

/// Parse a `YYYYMMDD` run date.
pub fn parse_run_date(s: &str) -> CloudResult<NaiveDate> {
    if s.len() != 8 {
        return Err(CloudError::invalid("date", format!("'{}' is not YYYYMMDD", s)));
    }
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|e| CloudError::invalid("date", format!("'{}': {}", s, e)))
}

/// One GFS output file: run date, cycle and forecast offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelRun {
    pub date: NaiveDate,
    pub cycle: ModelCycle,
    pub forecast_hour: ForecastHour,
}

impl ModelRun {
    pub fn new(date: NaiveDate, cycle: ModelCycle, forecast_hour: ForecastHour) -> Self {
        Self {
            date,
            cycle,
            forecast_hour,
        }
    }

    /// Resolve optional query values, falling back to `today` and the given defaults.
    ///
    /// Empty strings count as absent.
    pub fn resolve(
        date: Option<&str>,
        cycle: Option<&str>,
        forecast_hour: Option<&str>,
        today: NaiveDate,
        default_cycle: ModelCycle,
        default_forecast_hour: ForecastHour,
    ) -> CloudResult<Self> {
        fn present(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        let date = match present(date) {
            Some(s) => parse_run_date(s)?,
            None => today,
        };
        let cycle = match present(cycle) {
            Some(s) => s.parse()?,
            None => default_cycle,
        };
        let forecast_hour = match present(forecast_hour) {
            Some(s) => s.parse()?,
            None => default_forecast_hour,
        };

        Ok(Self::new(date, cycle, forecast_hour))
    }

    /// Run date as `YYYYMMDD`.
    pub fn date_string(&self) -> String {
        self.date.format("%Y%m%d").to_string()
    }

    /// Model run/reference time.
    pub fn reference_time(&self) -> DateTime<Utc> {
        let midnight = self.date.and_hms_opt(0, 0, 0).unwrap_or_default();
        Utc.from_utc_datetime(&midnight) + Duration::hours(self.cycle.hour() as i64)
    }

    /// Actual valid time (reference + forecast offset).
    pub fn valid_time(&self) -> DateTime<Utc> {
        self.reference_time() + Duration::hours(self.forecast_hour.hours() as i64)
    }

    /// Archive directory, e.g. `/gfs.20240115/00/atmos`.
    pub fn directory(&self) -> String {
        format!("/gfs.{}/{}/atmos", self.date_string(), self.cycle)
    }

    /// File name, e.g. `gfs.t00z.pgrb2.0p25.f000`.
    pub fn file_name(&self) -> String {
        format!("gfs.t{}z.pgrb2.0p25.f{}", self.cycle, self.forecast_hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    }

    #[test]
    fn test_cycle_parse() {
        assert_eq!("00".parse::<ModelCycle>().unwrap(), ModelCycle::Z00);
        assert_eq!("6".parse::<ModelCycle>().unwrap(), ModelCycle::Z06);
        assert_eq!("18".parse::<ModelCycle>().unwrap(), ModelCycle::Z18);
        assert!("03".parse::<ModelCycle>().is_err());
        assert!("xx".parse::<ModelCycle>().is_err());
        assert_eq!(ModelCycle::Z06.to_string(), "06");
    }

    #[test]
    fn test_forecast_hour() {
        assert_eq!("000".parse::<ForecastHour>().unwrap(), ForecastHour(0));
        assert_eq!("6".parse::<ForecastHour>().unwrap(), ForecastHour(6));
        assert!("385".parse::<ForecastHour>().is_err());
        assert!("-1".parse::<ForecastHour>().is_err());
        assert_eq!(ForecastHour(6).to_string(), "006");
    }

    #[test]
    fn test_parse_run_date() {
        assert_eq!(parse_run_date("20240115").unwrap(), today());
        assert!(parse_run_date("2024-01-15").is_err());
        assert!(parse_run_date("20241315").is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let run = ModelRun::resolve(
            None,
            Some(""),
            None,
            today(),
            ModelCycle::Z00,
            ForecastHour::ANALYSIS,
        )
        .unwrap();

        assert_eq!(run.date_string(), "20240115");
        assert_eq!(run.cycle, ModelCycle::Z00);
        assert_eq!(run.forecast_hour, ForecastHour(0));
    }

    #[test]
    fn test_resolve_blank_values_use_defaults() {
        let run = ModelRun::resolve(
            Some("   "),
            Some(" "),
            Some("\t"),
            today(),
            ModelCycle::Z12,
            ForecastHour(6),
        )
        .unwrap();

        assert_eq!(run.date_string(), "20240115");
        assert_eq!(run.cycle, ModelCycle::Z12);
        assert_eq!(run.forecast_hour, ForecastHour(6));

        let run = ModelRun::resolve(
            Some(" 20231231 "),
            Some(" 18"),
            Some("012 "),
            today(),
            ModelCycle::Z00,
            ForecastHour::ANALYSIS,
        )
        .unwrap();
        assert_eq!(run.file_name(), "gfs.t18z.pgrb2.0p25.f012");
    }

    #[test]
    fn test_resolve_explicit() {
        let run = ModelRun::resolve(
            Some("20231231"),
            Some("12"),
            Some("024"),
            today(),
            ModelCycle::Z00,
            ForecastHour::ANALYSIS,
        )
        .unwrap();

        assert_eq!(run.directory(), "/gfs.20231231/12/atmos");
        assert_eq!(run.file_name(), "gfs.t12z.pgrb2.0p25.f024");

        let valid = run.valid_time();
        assert_eq!(valid.year(), 2024);
        assert_eq!(valid.day(), 1);
        assert_eq!(valid.hour(), 12);
    }

    #[test]
    fn test_resolve_rejects_bad_values() {
        let err = ModelRun::resolve(
            Some("tomorrow"),
            None,
            None,
            today(),
            ModelCycle::Z00,
            ForecastHour::ANALYSIS,
        )
        .unwrap_err();
        assert!(err.is_client_error());
    }
}
