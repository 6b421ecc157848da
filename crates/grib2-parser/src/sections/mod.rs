//! GRIB2 section parsing.
//!
//! Only the sections that carry descriptive metadata are read here:
//! Section 0 (indicator), Section 1 (identification), Section 3 (grid
//! definition) and Section 4 (product definition). Data sections are left
//! to the value decoder.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use cloud_common::GridMetadata;

use crate::tables::Grib2Tables;
use crate::Grib2Error;

const INDICATOR_LEN: usize = 16;
const END_MARKER: &[u8; 4] = b"7777";

/// Section 0: Indicator Section (16 bytes)
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub discipline: u8,
    pub edition: u8,
    pub total_length: u64,
}

/// Section 1: Identification Section
#[derive(Debug, Clone, PartialEq)]
pub struct Identification {
    pub center: u16,
    pub sub_center: u16,
    pub reference_time: DateTime<Utc>,
}

/// Section 3: Grid Definition Section
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    pub num_data_points: u32,
    pub template: u16,
    /// Points along a parallel (Ni), zero when the template is not understood.
    pub ni: u32,
    /// Points along a meridian (Nj), zero when the template is not understood.
    pub nj: u32,
}

/// Section 4: Product Definition Section
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDefinition {
    pub template: u16,
    pub parameter_category: u8,
    pub parameter_number: u8,
    pub time_unit: u8,
    pub forecast_time: i32,
    pub level_type: u8,
    /// Value of the first fixed surface, `None` when marked missing.
    pub level_value: Option<f64>,
}

/// Metadata of one GRIB2 message.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageHeader {
    pub indicator: Indicator,
    pub identification: Identification,
    pub grid: GridDefinition,
    pub product: ProductDefinition,
}

impl MessageHeader {
    /// Parse the header sections of a single message.
    pub fn parse(message: &[u8]) -> Result<Self, Grib2Error> {
        let indicator = parse_indicator(message)?;
        let identification = parse_identification(find_section(message, 1)?)?;
        let grid = parse_grid_definition(find_section(message, 3)?)?;
        let product = parse_product_definition(find_section(message, 4)?)?;

        Ok(Self {
            indicator,
            identification,
            grid,
            product,
        })
    }

    /// Forecast offset from the reference time, if the time unit is known.
    pub fn forecast_offset(&self) -> Option<Duration> {
        let amount = i64::from(self.product.forecast_time);
        let minutes = match self.product.time_unit {
            0 => amount,
            1 => amount * 60,
            2 => amount * 60 * 24,
            10 => amount * 60 * 3,
            11 => amount * 60 * 6,
            12 => amount * 60 * 12,
            13 => return Some(Duration::seconds(amount)),
            _ => return None,
        };
        Some(Duration::minutes(minutes))
    }

    /// Reference time plus the forecast offset, `None` when either is unknown
    /// or the sum leaves the representable range.
    pub fn valid_time(&self) -> Option<DateTime<Utc>> {
        self.forecast_offset()
            .and_then(|offset| self.identification.reference_time.checked_add_signed(offset))
    }

    /// Build grid metadata, naming the parameter and level through `tables`.
    pub fn metadata(&self, tables: &Grib2Tables) -> GridMetadata {
        let discipline = self.indicator.discipline;
        let category = self.product.parameter_category;
        let number = self.product.parameter_number;

        let (parameter, unit, description) = match tables.parameter(discipline, category, number) {
            Some(info) => (
                info.short_name.clone(),
                info.unit.clone(),
                info.description.clone(),
            ),
            None => (
                format!("P{}_{}_{}", discipline, category, number),
                String::new(),
                String::from("Unknown parameter"),
            ),
        };

        GridMetadata {
            reference_time: Some(self.identification.reference_time),
            forecast_time: self.valid_time(),
            parameter,
            unit,
            description,
            level: tables.level_description(self.product.level_type, self.product.level_value),
            discipline,
            category,
            number,
            width: self.grid.ni,
            height: self.grid.nj,
        }
    }
}

/// Split a buffer into complete GRIB2 messages using the Section 0 length.
pub fn scan_messages(data: &[u8]) -> Result<Vec<&[u8]>, Grib2Error> {
    let mut messages = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        let rest = &data[offset..];
        let indicator = parse_indicator(rest)?;

        let length = usize::try_from(indicator.total_length).map_err(|_| {
            Grib2Error::InvalidFormat(format!(
                "message length {} does not fit in memory",
                indicator.total_length
            ))
        })?;

        if length < INDICATOR_LEN + END_MARKER.len() || length > rest.len() {
            return Err(Grib2Error::InvalidFormat(format!(
                "message at offset {} declares length {} but {} bytes remain",
                offset,
                length,
                rest.len()
            )));
        }

        let message = &rest[..length];
        if &message[length - END_MARKER.len()..] != END_MARKER {
            return Err(Grib2Error::InvalidFormat(format!(
                "message at offset {} is missing the 7777 end marker",
                offset
            )));
        }

        messages.push(message);
        offset += length;
    }

    Ok(messages)
}

/// Parse Section 0 (Indicator) from the start of a message.
pub fn parse_indicator(data: &[u8]) -> Result<Indicator, Grib2Error> {
    if data.len() < INDICATOR_LEN {
        return Err(Grib2Error::InvalidFormat(
            "Not enough data for indicator section".to_string(),
        ));
    }

    if &data[0..4] != b"GRIB" {
        return Err(Grib2Error::InvalidFormat(
            "Invalid GRIB magic bytes".to_string(),
        ));
    }

    let edition = data[7];
    if edition != 2 {
        return Err(Grib2Error::InvalidFormat(format!(
            "Expected GRIB edition 2, got {}",
            edition
        )));
    }

    Ok(Indicator {
        discipline: data[6],
        edition,
        total_length: read_u64(&data[8..16]),
    })
}

/// Locate section `number` within a message and return its bytes.
///
/// Sections are walked by their declared lengths starting after Section 0.
/// Only the first occurrence is returned.
pub fn find_section(message: &[u8], number: u8) -> Result<&[u8], Grib2Error> {
    let mut offset = INDICATOR_LEN;

    while offset + 5 <= message.len() {
        if &message[offset..offset + 4] == END_MARKER {
            break;
        }

        let length = read_u32(&message[offset..offset + 4]) as usize;
        if length < 5 || offset + length > message.len() {
            return Err(Grib2Error::InvalidSection {
                section: message[offset + 4],
                reason: format!("declared length {} at offset {} overruns message", length, offset),
            });
        }

        if message[offset + 4] == number {
            return Ok(&message[offset..offset + length]);
        }

        offset += length;
    }

    Err(Grib2Error::InvalidSection {
        section: number,
        reason: "section not found".to_string(),
    })
}

/// Parse Section 1 (Identification).
pub fn parse_identification(section: &[u8]) -> Result<Identification, Grib2Error> {
    require_len(section, 1, 21)?;

    let year = u16::from_be_bytes([section[12], section[13]]);
    let (month, day) = (section[14], section[15]);
    let (hour, minute, second) = (section[16], section[17], section[18]);

    let reference_time = NaiveDate::from_ymd_opt(i32::from(year), u32::from(month), u32::from(day))
        .and_then(|date| date.and_hms_opt(u32::from(hour), u32::from(minute), u32::from(second)))
        .ok_or_else(|| Grib2Error::InvalidSection {
            section: 1,
            reason: format!(
                "Invalid date: {}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            ),
        })?;

    Ok(Identification {
        center: u16::from_be_bytes([section[5], section[6]]),
        sub_center: u16::from_be_bytes([section[7], section[8]]),
        reference_time: DateTime::<Utc>::from_naive_utc_and_offset(reference_time, Utc),
    })
}

/// Parse Section 3 (Grid Definition).
///
/// Dimensions are read for the latitude/longitude family of templates
/// (3.0 to 3.3), where Ni and Nj share the same offsets.
pub fn parse_grid_definition(section: &[u8]) -> Result<GridDefinition, Grib2Error> {
    require_len(section, 3, 14)?;

    let num_data_points = read_u32(&section[6..10]);
    let template = u16::from_be_bytes([section[12], section[13]]);
    let gd = &section[14..];

    let (ni, nj) = if template <= 3 && gd.len() >= 24 {
        (read_u32(&gd[16..20]), read_u32(&gd[20..24]))
    } else {
        (0, 0)
    };

    Ok(GridDefinition {
        num_data_points,
        template,
        ni,
        nj,
    })
}

/// Parse Section 4 (Product Definition).
///
/// Templates 4.0 through 4.15 share the layout of the leading fields used
/// here; other templates only yield the parameter identifiers.
pub fn parse_product_definition(section: &[u8]) -> Result<ProductDefinition, Grib2Error> {
    require_len(section, 4, 11)?;

    let template = u16::from_be_bytes([section[7], section[8]]);
    let parameter_category = section[9];
    let parameter_number = section[10];

    if template > 15 || section.len() < 28 {
        return Ok(ProductDefinition {
            template,
            parameter_category,
            parameter_number,
            time_unit: 255,
            forecast_time: 0,
            level_type: 255,
            level_value: None,
        });
    }

    let time_unit = section[17];
    let forecast_time = read_signed_u32(&section[18..22]);
    let level_type = section[22];
    let scale_factor = section[23];
    let scaled_value = read_u32(&section[24..28]);

    let level_value = if scale_factor == 0xFF || scaled_value == u32::MAX {
        None
    } else {
        let scale = signed_byte(scale_factor);
        Some(f64::from(scaled_value) * 10f64.powi(-i32::from(scale)))
    };

    Ok(ProductDefinition {
        template,
        parameter_category,
        parameter_number,
        time_unit,
        forecast_time,
        level_type,
        level_value,
    })
}

fn require_len(section: &[u8], number: u8, min: usize) -> Result<(), Grib2Error> {
    if section.len() < min {
        return Err(Grib2Error::InvalidSection {
            section: number,
            reason: format!("expected at least {} bytes, got {}", min, section.len()),
        });
    }
    Ok(())
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[..8]);
    u64::from_be_bytes(buf)
}

// GRIB2 signed integers use a sign bit followed by the magnitude.
fn read_signed_u32(bytes: &[u8]) -> i32 {
    let raw = read_u32(bytes);
    let magnitude = (raw & 0x7FFF_FFFF) as i32;
    if raw & 0x8000_0000 != 0 {
        -magnitude
    } else {
        magnitude
    }
}

fn signed_byte(raw: u8) -> i8 {
    let magnitude = (raw & 0x7F) as i8;
    if raw & 0x80 != 0 {
        -magnitude
    } else {
        magnitude
    }
}
