//! Cloud cover grid generators.
//!
//! Values are whole percentages so that simple 8-bit packing reproduces
//! them exactly and truncation leaves them unchanged.

/// A grid split into horizontal bands of constant cover.
///
/// Band `b` (of `bands`) holds `b * 100 / (bands - 1)` percent, so the
/// first band is clear sky and the last is overcast.
///
/// ```
/// use test_utils::banded_cloud_grid;
///
/// let grid = banded_cloud_grid(4, 3, 3);
/// assert_eq!(&grid[..4], &[0.0; 4]);
/// assert_eq!(&grid[8..], &[100.0; 4]);
/// ```
pub fn banded_cloud_grid(width: usize, height: usize, bands: usize) -> Vec<f32> {
    let bands = bands.max(2);
    let mut data = Vec::with_capacity(width * height);
    for row in 0..height {
        let band = row * bands / height.max(1);
        let cover = (band * 100 / (bands - 1)) as f32;
        data.extend(std::iter::repeat(cover).take(width));
    }
    data
}

/// A grid whose cover increases by one percent every `step` cells, wrapping at 100.
pub fn stepped_cloud_grid(width: usize, height: usize, step: usize) -> Vec<f32> {
    let step = step.max(1);
    (0..width * height)
        .map(|i| ((i / step) % 101) as f32)
        .collect()
}
