//! Synthetic GRIB2 messages.
//!
//! Messages use a regular latitude/longitude grid (template 3.0), an
//! analysis or forecast product (template 4.0) and simple packing
//! (template 5.0) with 8 bits per value and no scaling. Sample values must
//! therefore be whole numbers spanning at most 255.

/// Builds a single GRIB2 message.
#[derive(Debug, Clone)]
pub struct Grib2Builder {
    discipline: u8,
    center: u16,
    year: u16,
    month: u8,
    day: u8,
    hour: u8,
    ni: u32,
    nj: u32,
    param_category: u8,
    param_number: u8,
    level_type: u8,
    level_scale: u8,
    level_value: u32,
    time_unit: u8,
    forecast_hour: u32,
    values: Vec<f32>,
}

impl Grib2Builder {
    /// High cloud cover on a small grid, 2024-05-01 00Z analysis.
    pub fn new_cloud() -> Self {
        let (ni, nj) = (8, 4);
        Self {
            discipline: 0,
            center: 7, // NCEP
            year: 2024,
            month: 5,
            day: 1,
            hour: 0,
            ni,
            nj,
            param_category: 6,
            param_number: 5, // HCDC
            level_type: 234,
            level_scale: 0xFF,
            level_value: u32::MAX,
            time_unit: 1, // hours
            forecast_hour: 0,
            values: vec![0.0; (ni * nj) as usize],
        }
    }

    /// Total cloud cover at an isobaric level in millibars.
    pub fn new_isobaric(millibars: u32) -> Self {
        Self::new_cloud()
            .with_parameter(6, 1)
            .with_level(100, 0, millibars * 100)
    }

    pub fn with_reference_time(mut self, year: u16, month: u8, day: u8, hour: u8) -> Self {
        self.year = year;
        self.month = month;
        self.day = day;
        self.hour = hour;
        self
    }

    /// Resize the grid, resetting the values to clear sky.
    pub fn with_grid(mut self, ni: u32, nj: u32) -> Self {
        self.ni = ni;
        self.nj = nj;
        self.values = vec![0.0; (ni * nj) as usize];
        self
    }

    pub fn with_parameter(mut self, category: u8, number: u8) -> Self {
        self.param_category = category;
        self.param_number = number;
        self
    }

    /// Set the first fixed surface. `scale` and `value` are written as-is.
    pub fn with_level(mut self, level_type: u8, scale: u8, value: u32) -> Self {
        self.level_type = level_type;
        self.level_scale = scale;
        self.level_value = value;
        self
    }

    /// Cloud layer surface (214, 224 or 234) with a missing level value.
    pub fn with_cloud_layer(self, level_type: u8) -> Self {
        self.with_level(level_type, 0xFF, u32::MAX)
    }

    pub fn with_forecast_hour(mut self, hour: u32) -> Self {
        self.forecast_hour = hour;
        self
    }

    /// Code table 4.4 unit for the forecast time field.
    pub fn with_time_unit(mut self, unit: u8) -> Self {
        self.time_unit = unit;
        self
    }

    pub fn with_values(mut self, values: Vec<f32>) -> Self {
        self.values = values;
        self
    }

    /// Build the complete GRIB2 message bytes
    pub fn build(&self) -> Vec<u8> {
        let sections = [
            self.build_section1(),
            self.build_section3(),
            self.build_section4(),
            self.build_section5(),
            self.build_section6(),
            self.build_section7(),
        ];

        let total_length = 16 + sections.iter().map(Vec::len).sum::<usize>() + 4;

        let mut message = Vec::with_capacity(total_length);
        message.extend_from_slice(b"GRIB");
        message.extend_from_slice(&[0, 0]);
        message.push(self.discipline);
        message.push(2);
        message.extend_from_slice(&(total_length as u64).to_be_bytes());
        for section in &sections {
            message.extend_from_slice(section);
        }
        message.extend_from_slice(b"7777");
        message
    }

    fn num_points(&self) -> u32 {
        self.ni * self.nj
    }

    fn build_section1(&self) -> Vec<u8> {
        let mut section = Vec::with_capacity(21);
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(1);
        section.extend_from_slice(&self.center.to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // sub-center
        section.push(2); // master table version
        section.push(1); // local table version
        section.push(1); // start of forecast
        section.extend_from_slice(&self.year.to_be_bytes());
        section.extend_from_slice(&[self.month, self.day, self.hour, 0, 0]);
        section.push(0); // operational
        section.push(1); // forecast
        section
    }

    fn build_section3(&self) -> Vec<u8> {
        let mut section = Vec::with_capacity(72);
        section.extend_from_slice(&72u32.to_be_bytes());
        section.push(3);
        section.push(0);
        section.extend_from_slice(&self.num_points().to_be_bytes());
        section.push(0);
        section.push(0);
        section.extend_from_slice(&0u16.to_be_bytes()); // template 3.0

        section.push(6); // spherical earth, radius 6371229 m
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.push(0);
        section.extend_from_slice(&0u32.to_be_bytes());
        section.extend_from_slice(&self.ni.to_be_bytes());
        section.extend_from_slice(&self.nj.to_be_bytes());
        section.extend_from_slice(&0u32.to_be_bytes()); // basic angle
        section.extend_from_slice(&u32::MAX.to_be_bytes()); // subdivisions
        section.extend_from_slice(&90_000_000u32.to_be_bytes()); // La1
        section.extend_from_slice(&0u32.to_be_bytes()); // Lo1
        section.push(48);
        // La2 = -90 degrees, sign-magnitude
        section.extend_from_slice(&(0x8000_0000u32 | 90_000_000).to_be_bytes());
        section.extend_from_slice(&359_750_000u32.to_be_bytes()); // Lo2
        section.extend_from_slice(&250_000u32.to_be_bytes()); // Di
        section.extend_from_slice(&250_000u32.to_be_bytes()); // Dj
        section.push(0); // +i, -j, i consecutive
        section
    }

    fn build_section4(&self) -> Vec<u8> {
        let mut section = Vec::with_capacity(34);
        section.extend_from_slice(&34u32.to_be_bytes());
        section.push(4);
        section.extend_from_slice(&0u16.to_be_bytes()); // coordinate values
        section.extend_from_slice(&0u16.to_be_bytes()); // template 4.0
        section.push(self.param_category);
        section.push(self.param_number);
        section.push(2); // forecast
        section.push(0);
        section.push(96); // GFS
        section.extend_from_slice(&0u16.to_be_bytes());
        section.push(0);
        section.push(self.time_unit);
        section.extend_from_slice(&self.forecast_hour.to_be_bytes());
        section.push(self.level_type);
        section.push(self.level_scale);
        section.extend_from_slice(&self.level_value.to_be_bytes());
        section.push(255); // no second surface
        section.push(0xFF);
        section.extend_from_slice(&u32::MAX.to_be_bytes());
        section
    }

    fn reference_value(&self) -> f32 {
        self.values.iter().copied().fold(f32::INFINITY, f32::min)
    }

    fn build_section5(&self) -> Vec<u8> {
        let reference = if self.values.is_empty() {
            0.0
        } else {
            self.reference_value()
        };

        let mut section = Vec::with_capacity(21);
        section.extend_from_slice(&21u32.to_be_bytes());
        section.push(5);
        section.extend_from_slice(&self.num_points().to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // template 5.0
        section.extend_from_slice(&reference.to_be_bytes());
        section.extend_from_slice(&0u16.to_be_bytes()); // binary scale factor
        section.extend_from_slice(&0u16.to_be_bytes()); // decimal scale factor
        section.push(8);
        section.push(0); // floating point
        section
    }

    fn build_section6(&self) -> Vec<u8> {
        let mut section = Vec::with_capacity(6);
        section.extend_from_slice(&6u32.to_be_bytes());
        section.push(6);
        section.push(255); // no bitmap
        section
    }

    fn build_section7(&self) -> Vec<u8> {
        let reference = self.reference_value();
        let mut section = Vec::with_capacity(5 + self.values.len());
        section.extend_from_slice(&((5 + self.values.len()) as u32).to_be_bytes());
        section.push(7);
        section.extend(self.values.iter().map(|v| (v - reference) as u8));
        section
    }
}

/// Concatenate messages the way NOMADS returns multi-record files.
pub fn concat_messages(messages: &[Vec<u8>]) -> Vec<u8> {
    messages.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_cloud_message() {
        let data = Grib2Builder::new_cloud().build();

        assert_eq!(&data[0..4], b"GRIB");
        assert_eq!(data[7], 2);
        assert_eq!(data[6], 0);
        assert_eq!(&data[data.len() - 4..], b"7777");
    }

    #[test]
    fn test_declared_length_matches() {
        let data = Grib2Builder::new_isobaric(500)
            .with_grid(3, 2)
            .with_values(vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0])
            .build();

        let declared = u64::from_be_bytes(data[8..16].try_into().unwrap());
        assert_eq!(declared as usize, data.len());
    }

    #[test]
    fn test_packed_values_offset_from_minimum() {
        let data = Grib2Builder::new_cloud()
            .with_grid(3, 1)
            .with_values(vec![20.0, 25.0, 120.0])
            .build();

        let packed = &data[data.len() - 7..data.len() - 4];
        assert_eq!(packed, &[0, 5, 100]);
    }
}
