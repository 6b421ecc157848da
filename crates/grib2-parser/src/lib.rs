//! GRIB2 decoding (WMO FM 92 GRIB Edition 2) into [`Grid`]s.
//!
//! Sample values are unpacked by the `grib` crate, which handles the packing
//! templates NOMADS serves. Descriptive metadata (reference time, forecast
//! offset, parameter and level) is read directly from Sections 0, 1, 3 and 4
//! of each message and named through [`Grib2Tables`].

pub mod sections;
pub mod tables;

use std::io::Cursor;

use cloud_common::Grid;
use thiserror::Error;
use tracing::debug;

pub use sections::{scan_messages, MessageHeader};
pub use tables::{Grib2Tables, LevelDescription, ParameterInfo};

/// Errors raised while reading GRIB2 data.
#[derive(Debug, Error)]
pub enum Grib2Error {
    #[error("Invalid GRIB2 format: {0}")]
    InvalidFormat(String),

    #[error("Invalid section {section}: {reason}")]
    InvalidSection { section: u8, reason: String },

    #[error("Failed to decode values: {0}")]
    Decode(String),
}

/// Reads every grid contained in a GRIB2 byte buffer.
pub struct Grib2Reader<'a> {
    data: &'a [u8],
    tables: Grib2Tables,
}

impl<'a> Grib2Reader<'a> {
    /// Reader using the built-in GFS parameter and level names.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_tables(data, Grib2Tables::gfs())
    }

    pub fn with_tables(data: &'a [u8], tables: Grib2Tables) -> Self {
        Self { data, tables }
    }

    /// Parse the headers of every message without unpacking values.
    pub fn headers(&self) -> Result<Vec<MessageHeader>, Grib2Error> {
        scan_messages(self.data)?
            .into_iter()
            .map(MessageHeader::parse)
            .collect()
    }

    /// Decode all grids in file order.
    ///
    /// An empty buffer yields no grids.
    pub fn read_grids(&self) -> Result<Vec<Grid>, Grib2Error> {
        if self.data.is_empty() {
            return Ok(Vec::new());
        }

        let headers = self.headers()?;

        let grib_file = grib::from_reader(Cursor::new(self.data))
            .map_err(|e| Grib2Error::InvalidFormat(e.to_string()))?;

        let mut grids = Vec::with_capacity(headers.len());

        for ((message_index, submessage_index), submessage) in grib_file.iter() {
            let decoder = grib::Grib2SubmessageDecoder::from(submessage).map_err(|e| {
                Grib2Error::Decode(format!(
                    "message {}.{}: {}",
                    message_index, submessage_index, e
                ))
            })?;

            let values: Vec<f32> = decoder
                .dispatch()
                .map_err(|e| {
                    Grib2Error::Decode(format!(
                        "message {}.{}: {}",
                        message_index, submessage_index, e
                    ))
                })?
                .collect();

            let metadata = headers
                .get(message_index)
                .map(|header| header.metadata(&self.tables))
                .unwrap_or_default();

            debug!(
                message = message_index,
                submessage = submessage_index,
                parameter = %metadata.parameter,
                level = %metadata.level,
                values = values.len(),
                "Decoded GRIB2 grid"
            );

            grids.push(Grid::new(values, metadata));
        }

        Ok(grids)
    }
}

/// Decode every grid in `data` using the default tables.
pub fn decode_grids(data: &[u8]) -> Result<Vec<Grid>, Grib2Error> {
    Grib2Reader::new(data).read_grids()
}
